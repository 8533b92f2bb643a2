//! Selection model and command enablement

use crate::DisplayId;

/// Commands offered by the displays panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelCommand {
    Add,
    Duplicate,
    Remove,
    Rename,
    LoadGroup,
    SaveGroup,
}

impl PanelCommand {
    pub const ALL: [PanelCommand; 6] = [
        PanelCommand::Add,
        PanelCommand::Duplicate,
        PanelCommand::Remove,
        PanelCommand::Rename,
        PanelCommand::LoadGroup,
        PanelCommand::SaveGroup,
    ];

    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            PanelCommand::Add => "Add",
            PanelCommand::Duplicate => "Duplicate",
            PanelCommand::Remove => "Remove",
            PanelCommand::Rename => "Rename",
            PanelCommand::LoadGroup => "Load Group",
            PanelCommand::SaveGroup => "Save Group",
        }
    }

    pub fn shortcut(self) -> Option<&'static str> {
        match self {
            PanelCommand::Add => Some("Ctrl+N"),
            PanelCommand::Duplicate => Some("Ctrl+D"),
            PanelCommand::Remove => Some("Ctrl+X"),
            PanelCommand::Rename => Some("Ctrl+R"),
            PanelCommand::LoadGroup | PanelCommand::SaveGroup => None,
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            PanelCommand::Add => "Add a new display, Ctrl+N",
            PanelCommand::Duplicate => "Duplicate a display, Ctrl+D",
            PanelCommand::Remove => "Remove displays, Ctrl+X",
            PanelCommand::Rename => "Rename a display, Ctrl+R",
            PanelCommand::LoadGroup => "Load a group display",
            PanelCommand::SaveGroup => "Save a group display",
        }
    }
}

/// Which commands are currently available
///
/// Derived from the selection alone; never cached past the selection it was
/// computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandState {
    pub add: bool,
    pub duplicate: bool,
    pub remove: bool,
    pub rename: bool,
    pub load_group: bool,
    pub save_group: bool,
}

impl CommandState {
    /// State for an empty selection
    pub fn initial() -> Self {
        Self::from_selection(0, false)
    }

    /// `count` is the number of selected displays, `first_is_group` whether
    /// the first of them is a group.
    pub fn from_selection(count: usize, first_is_group: bool) -> Self {
        let single_group = count == 1 && first_is_group;
        Self {
            add: true,
            duplicate: count > 0,
            remove: count > 0,
            rename: count == 1,
            load_group: true,
            save_group: single_group,
        }
    }

    pub fn is_enabled(&self, command: PanelCommand) -> bool {
        match command {
            PanelCommand::Add => self.add,
            PanelCommand::Duplicate => self.duplicate,
            PanelCommand::Remove => self.remove,
            PanelCommand::Rename => self.rename,
            PanelCommand::LoadGroup => self.load_group,
            PanelCommand::SaveGroup => self.save_group,
        }
    }
}

impl Default for CommandState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Ordered set of selected displays
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selected: Vec<DisplayId>,
    revision: u64,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected displays in selection order
    pub fn selected(&self) -> &[DisplayId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: DisplayId) -> bool {
        self.selected.contains(&id)
    }

    /// Bumped on every change; lets observers tell whether to re-query
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the selection. Duplicates are ignored. Returns true if the
    /// selection changed.
    pub fn clear_and_select(&mut self, ids: impl IntoIterator<Item = DisplayId>) -> bool {
        let mut next: Vec<DisplayId> = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        self.replace(next)
    }

    pub fn clear(&mut self) -> bool {
        self.replace(Vec::new())
    }

    /// Drop entries that are no longer live
    pub fn retain(&mut self, mut keep: impl FnMut(DisplayId) -> bool) -> bool {
        let next: Vec<DisplayId> = self.selected.iter().copied().filter(|&id| keep(id)).collect();
        self.replace(next)
    }

    fn replace(&mut self, next: Vec<DisplayId>) -> bool {
        if next == self.selected {
            return false;
        }
        self.selected = next;
        self.revision += 1;
        true
    }
}
