//! DisplaysPanel - commands for managing the display tree
//!
//! Tracks the selection, derives which commands are available from it, and
//! carries out add / duplicate / remove / rename / save-group / load-group
//! against a [`VisualizationManager`]. Duplication and group files both go
//! through the same save/load round trip over [`ConfigNode`].

use super::prompts::PanelPrompts;
use crate::config::AppConfig;
use display_panel_core::{
    CommandState, ConfigNode, ConfigReader, ConfigWriter, DisplayId, JsonConfigReader,
    JsonConfigWriter, PanelCommand, PanelError, PanelResult, SelectionModel,
    VisualizationManager, GROUP_FILE_EXTENSION,
};
use log::{error, info, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// What a command ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The tree or a file was changed
    Applied,
    /// The user dismissed a prompt
    Cancelled,
    /// The input changed nothing (e.g. rename to the same name)
    Unchanged,
    /// The command is not available for the current selection
    Unavailable,
    /// Reported to the user through an error prompt
    Failed,
}

/// Append `.ext` unless `path` already ends with it
pub fn with_group_extension(path: PathBuf, ext: &str) -> PathBuf {
    if path.extension() == Some(OsStr::new(ext)) {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

pub struct DisplaysPanel<P: PanelPrompts> {
    prompts: P,
    reader: Box<dyn ConfigReader>,
    writer: Box<dyn ConfigWriter>,
    selection: SelectionModel,
    commands: CommandState,
    group_extension: String,
    last_group_dir: Option<PathBuf>,
}

impl<P: PanelPrompts> DisplaysPanel<P> {
    pub fn new(prompts: P) -> Self {
        Self {
            prompts,
            reader: Box::new(JsonConfigReader),
            writer: Box::new(JsonConfigWriter),
            selection: SelectionModel::new(),
            commands: CommandState::initial(),
            group_extension: GROUP_FILE_EXTENSION.to_string(),
            last_group_dir: None,
        }
    }

    /// Panel configured from application settings
    pub fn with_settings(prompts: P, settings: &AppConfig) -> Self {
        let mut panel = Self::new(prompts);
        panel.group_extension = settings.group_extension.clone();
        panel.last_group_dir = settings.last_group_dir.clone();
        panel
    }

    /// Replace the group file reader and writer
    pub fn with_io(mut self, reader: Box<dyn ConfigReader>, writer: Box<dyn ConfigWriter>) -> Self {
        self.reader = reader;
        self.writer = writer;
        self
    }

    pub fn prompts(&self) -> &P {
        &self.prompts
    }

    pub fn prompts_mut(&mut self) -> &mut P {
        &mut self.prompts
    }

    pub fn selection(&self) -> &[DisplayId] {
        self.selection.selected()
    }

    pub fn command_state(&self) -> CommandState {
        self.commands
    }

    pub fn is_enabled(&self, command: PanelCommand) -> bool {
        self.commands.is_enabled(command)
    }

    /// Directory of the last group file saved or loaded
    pub fn last_group_dir(&self) -> Option<&Path> {
        self.last_group_dir.as_deref()
    }

    fn file_filter(&self) -> String {
        format!("Display group files (*.{})", self.group_extension)
    }

    // ---- selection ----

    /// Replace the selection, as the tree view does on a click
    pub fn select(&mut self, manager: &VisualizationManager, ids: impl IntoIterator<Item = DisplayId>) {
        let live = ids.into_iter().filter(|&id| manager.is_live(id));
        if self.selection.clear_and_select(live) {
            self.on_selection_changed(manager);
        }
    }

    /// Re-read the selection and recompute which commands are available
    pub fn on_selection_changed(&mut self, manager: &VisualizationManager) {
        self.selection.retain(|id| manager.is_live(id));
        let selected = self.selection.selected();
        let first_is_group = selected.first().is_some_and(|&id| manager.is_group(id));
        self.commands = CommandState::from_selection(selected.len(), first_is_group);
    }

    /// Run a command as if its button was clicked. Disabled commands do nothing.
    ///
    /// The selection is re-checked first: displays removed behind the panel's
    /// back (e.g. by reloading their group) drop out of it.
    pub fn execute(&mut self, manager: &mut VisualizationManager, command: PanelCommand) -> CommandOutcome {
        self.on_selection_changed(manager);
        if !self.commands.is_enabled(command) {
            return CommandOutcome::Unavailable;
        }
        match command {
            PanelCommand::Add => self.on_new_display(manager),
            PanelCommand::Duplicate => self.on_duplicate_display(manager),
            PanelCommand::Remove => self.on_delete_display(manager),
            PanelCommand::Rename => self.on_rename_display(manager),
            PanelCommand::SaveGroup => self.on_save_group_display(manager),
            PanelCommand::LoadGroup => self.on_load_group_display(manager),
        }
    }

    // ---- commands ----

    /// Add a display chosen in the add dialog as a new top-level display
    pub fn on_new_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        let _pause = manager.suspend_updates();
        let Some(choice) = self.prompts.choose_new_display(manager.factory()) else {
            return CommandOutcome::Cancelled;
        };

        let id = match manager.create_display(&choice.class_id, &choice.name, true) {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to add display: {}", e);
                self.prompts.show_error("Failed to add display", &e.to_string());
                return CommandOutcome::Failed;
            }
        };

        // Configure the source before the first update cycle sees the display
        if let Some(topic) = choice.topic.filter(|t| !t.topic.is_empty() && !t.datatype.is_empty()) {
            if let Err(e) = manager.set_display_topic(id, &topic.topic, &topic.datatype) {
                warn!("Display '{}' rejected topic {}: {}", choice.name, topic.topic, e);
            }
        }
        CommandOutcome::Applied
    }

    /// Duplicate every selected display through a save/load round trip.
    ///
    /// Best-effort: a failed duplicate is torn down and reported, the rest
    /// still go ahead. The new displays become the selection.
    pub fn on_duplicate_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        self.on_selection_changed(manager);
        let sources = self.selection.selected().to_vec();
        if sources.is_empty() {
            return CommandOutcome::Unavailable;
        }

        let mut created = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();
        for source in sources {
            match Self::duplicate_one(manager, source) {
                Ok(id) => created.push(id),
                Err(e) => {
                    warn!("Failed to duplicate {}: {}", source, e);
                    failures.push(e.to_string());
                }
            }
        }

        // New displays are appended contiguously, so the range from the
        // first to the last one selects exactly them.
        if let (Some(&first), Some(&last)) = (created.first(), created.last()) {
            let range = manager.tree().sibling_range(first, last);
            self.select(manager, range);
        }

        if !failures.is_empty() {
            self.prompts.show_error("Failed to duplicate", &failures.join("\n"));
        }
        if created.is_empty() {
            CommandOutcome::Failed
        } else {
            CommandOutcome::Applied
        }
    }

    fn duplicate_one(manager: &mut VisualizationManager, source: DisplayId) -> PanelResult<DisplayId> {
        let class_id = manager
            .class_id(source)
            .ok_or(PanelError::StaleHandle(source))?
            .to_string();
        let name = manager.display_name(source).unwrap_or_default().to_string();

        let mut config = ConfigNode::new();
        manager.save_display(source, &mut config)?;

        let copy = manager.create_display(&class_id, &name, true)?;
        if let Err(e) = manager.load_display(copy, &config) {
            manager.remove_display(copy);
            return Err(e);
        }
        Ok(copy)
    }

    /// Remove every selected display.
    ///
    /// Each display has its listeners detached before it is scheduled for
    /// destruction; storage is freed at the manager's next idle point. The
    /// display just before the first removed one becomes the selection.
    pub fn on_delete_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        self.on_selection_changed(manager);
        let doomed = self.selection.selected().to_vec();
        let Some(&first) = doomed.first() else {
            return CommandOutcome::Unavailable;
        };

        let next = manager.tree().preceding_sibling(first);
        // A later entry may sit under an earlier one and go with it
        let removed = doomed
            .into_iter()
            .filter(|&id| manager.remove_display(id))
            .count();

        let next: Vec<DisplayId> = next.filter(|&id| manager.is_live(id)).into_iter().collect();
        self.selection.clear_and_select(next);
        self.on_selection_changed(manager);

        if removed == 0 {
            return CommandOutcome::Unchanged;
        }
        manager.notify_config_changed();
        CommandOutcome::Applied
    }

    /// Rename the single selected display
    pub fn on_rename_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        self.on_selection_changed(manager);
        let &[id] = self.selection.selected() else {
            return CommandOutcome::Unavailable;
        };
        let Some(old_name) = manager.display_name(id).map(str::to_string) else {
            return CommandOutcome::Unavailable;
        };

        let Some(new_name) = self.prompts.prompt_rename(&old_name) else {
            return CommandOutcome::Cancelled;
        };
        if new_name.is_empty() || new_name == old_name {
            return CommandOutcome::Unchanged;
        }

        match manager.rename_display(id, &new_name) {
            Ok(_) => CommandOutcome::Applied,
            Err(e) => {
                warn!("Rename failed: {}", e);
                CommandOutcome::Unavailable
            }
        }
    }

    /// Save the single selected group, with all its children, to a file
    pub fn on_save_group_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        self.on_selection_changed(manager);
        let &[id] = self.selection.selected() else {
            return CommandOutcome::Unavailable;
        };
        if !manager.is_group(id) {
            return CommandOutcome::Unavailable;
        }

        let filter = self.file_filter();
        let path = {
            let _pause = manager.suspend_updates();
            self.prompts
                .prompt_save_path(self.last_group_dir.as_deref(), &filter)
        };
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            return CommandOutcome::Cancelled;
        };
        let path = with_group_extension(path, &self.group_extension);

        let mut config = ConfigNode::new();
        if let Err(e) = manager.save_display(id, &mut config) {
            error!("{}", e);
            self.prompts.show_error("Failed to save.", &e.to_string());
            return CommandOutcome::Failed;
        }

        match self.writer.write_file(&config, &path) {
            Ok(()) => {
                info!("Saved group to {}", path.display());
                self.remember_dir(&path);
                CommandOutcome::Applied
            }
            Err(e) => {
                error!("{}", e);
                self.prompts.show_error("Failed to save.", &e.to_string());
                CommandOutcome::Failed
            }
        }
    }

    /// Read a group file and hand it to the manager for insertion
    pub fn on_load_group_display(&mut self, manager: &mut VisualizationManager) -> CommandOutcome {
        let filter = self.file_filter();
        let path = {
            let _pause = manager.suspend_updates();
            self.prompts
                .prompt_open_path(self.last_group_dir.as_deref(), &filter)
        };
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            return CommandOutcome::Cancelled;
        };

        if !path.exists() {
            let message = PanelError::FileMissing(path).to_string();
            warn!("{}", message);
            self.prompts.show_error("Config file does not exist", &message);
            return CommandOutcome::Failed;
        }

        // The reader reports its own failures
        let Ok(config) = self.reader.read_file(&path) else {
            return CommandOutcome::Failed;
        };
        self.remember_dir(&path);

        match manager.load_group(&config) {
            Ok(_) => CommandOutcome::Applied,
            Err(e) => {
                self.prompts.show_error("Failed to load group", &e.to_string());
                CommandOutcome::Failed
            }
        }
    }

    fn remember_dir(&mut self, path: &Path) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.last_group_dir = Some(dir.to_path_buf());
        }
    }
}
