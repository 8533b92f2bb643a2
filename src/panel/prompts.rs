//! Interactive prompts used by the displays panel
//!
//! The panel never talks to a dialog toolkit directly; it asks a
//! [`PanelPrompts`] implementation. Returning `None` from any prompt means
//! the user cancelled.

use display_panel_core::{DisplayFactory, UpdateStatus};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Topic/datatype pair picked in the add dialog
#[derive(Debug, Clone, PartialEq)]
pub struct TopicChoice {
    pub topic: String,
    pub datatype: String,
}

/// Result of the add-display dialog
#[derive(Debug, Clone, PartialEq)]
pub struct NewDisplayChoice {
    pub class_id: String,
    pub name: String,
    pub topic: Option<TopicChoice>,
}

impl NewDisplayChoice {
    pub fn new(class_id: &str, name: &str) -> Self {
        Self {
            class_id: class_id.to_string(),
            name: name.to_string(),
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: &str, datatype: &str) -> Self {
        self.topic = Some(TopicChoice {
            topic: topic.to_string(),
            datatype: datatype.to_string(),
        });
        self
    }
}

pub trait PanelPrompts {
    /// Ask which display class to add and what to call it
    fn choose_new_display(&mut self, factory: &DisplayFactory) -> Option<NewDisplayChoice>;

    /// Ask for a new name, pre-filled with `current`
    fn prompt_rename(&mut self, current: &str) -> Option<String>;

    /// Ask where to save a group file
    fn prompt_save_path(&mut self, start_dir: Option<&Path>, filter: &str) -> Option<PathBuf>;

    /// Ask which group file to open
    fn prompt_open_path(&mut self, start_dir: Option<&Path>, filter: &str) -> Option<PathBuf>;

    /// Blocking error report
    fn show_error(&mut self, title: &str, message: &str);
}

/// Prompts answered from pre-loaded queues
///
/// An exhausted queue answers `None`, i.e. the user cancelled. Errors are
/// collected instead of shown. Used by the command line tool and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompts {
    new_displays: VecDeque<NewDisplayChoice>,
    renames: VecDeque<String>,
    save_paths: VecDeque<PathBuf>,
    open_paths: VecDeque<PathBuf>,
    errors: Vec<(String, String)>,
    update_status: Option<UpdateStatus>,
    running_during_prompt: Vec<bool>,
}

impl ScriptedPrompts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_new_display(mut self, choice: NewDisplayChoice) -> Self {
        self.new_displays.push_back(choice);
        self
    }

    pub fn with_rename(mut self, name: &str) -> Self {
        self.renames.push_back(name.to_string());
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_paths.push_back(path.into());
        self
    }

    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_paths.push_back(path.into());
        self
    }

    /// Record whether updates were running each time a prompt is shown
    pub fn watch_updates(mut self, status: UpdateStatus) -> Self {
        self.update_status = Some(status);
        self
    }

    pub fn push_save_path(&mut self, path: impl Into<PathBuf>) {
        self.save_paths.push_back(path.into());
    }

    /// (title, message) of every error reported so far
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.errors)
    }

    /// One entry per prompt shown while watching updates
    pub fn updates_running_during_prompts(&self) -> &[bool] {
        &self.running_during_prompt
    }

    fn observe(&mut self) {
        if let Some(status) = &self.update_status {
            self.running_during_prompt.push(status.is_running());
        }
    }
}

impl PanelPrompts for ScriptedPrompts {
    fn choose_new_display(&mut self, factory: &DisplayFactory) -> Option<NewDisplayChoice> {
        self.observe();
        let choice = self.new_displays.pop_front()?;
        if !factory.contains(&choice.class_id) {
            log::debug!("Scripted add of unregistered class {}", choice.class_id);
        }
        Some(choice)
    }

    fn prompt_rename(&mut self, _current: &str) -> Option<String> {
        self.observe();
        self.renames.pop_front()
    }

    fn prompt_save_path(&mut self, _start_dir: Option<&Path>, _filter: &str) -> Option<PathBuf> {
        self.observe();
        self.save_paths.pop_front()
    }

    fn prompt_open_path(&mut self, _start_dir: Option<&Path>, _filter: &str) -> Option<PathBuf> {
        self.observe();
        self.open_paths.pop_front()
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }
}
