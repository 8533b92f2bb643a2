//! Arena-backed display tree
//!
//! Displays live in a generational arena and are addressed by [`DisplayId`].
//! Removing a display is two-phase: [`DisplayTree::schedule_destroy`] detaches
//! the subtree from its parent and tombstones every node in it, making them
//! unreachable from rows, traversal and lookups; the storage itself is only
//! freed by [`DisplayTree::reclaim`] at a later safe point.

use crate::constants::{KEY_CLASS, KEY_DISPLAYS, KEY_ENABLED, KEY_NAME};
use crate::{BoxedDisplay, Display, DisplayId, DisplayKind, PanelError, PanelResult};
use display_panel_types::ConfigNode;
use generational_arena::Arena;
use log::{debug, trace};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Live,
    /// Removed from the tree, storage not yet reclaimed
    Tombstoned,
}

/// A display plus the attributes the tree keeps for it
pub struct DisplayNode {
    /// Class id the display was created from. Never changes.
    pub class_id: String,
    /// User-facing name, not required to be unique
    pub name: String,
    pub enabled: bool,
    /// Fresh for every created display, including duplicates
    pub instance_id: Uuid,
    kind: DisplayKind,
    display: BoxedDisplay,
    parent: Option<DisplayId>,
    children: Vec<DisplayId>,
    state: NodeState,
}

impl DisplayNode {
    pub fn kind(&self) -> DisplayKind {
        self.kind
    }

    pub fn parent(&self) -> Option<DisplayId> {
        self.parent
    }

    pub fn children(&self) -> &[DisplayId] {
        &self.children
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn display(&self) -> &dyn Display {
        self.display.as_ref()
    }
}

/// One visible row of the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Non-removable row such as "Global Options"
    Fixture(String),
    Display { id: DisplayId, depth: usize },
}

pub struct DisplayTree {
    arena: Arena<DisplayNode>,
    fixtures: Vec<String>,
    top_level: Vec<DisplayId>,
    pending_free: Vec<DisplayId>,
}

impl DisplayTree {
    pub fn new(fixtures: &[&str]) -> Self {
        Self {
            arena: Arena::new(),
            fixtures: fixtures.iter().map(|f| f.to_string()).collect(),
            top_level: Vec::new(),
            pending_free: Vec::new(),
        }
    }

    /// Insert a display at the end of `parent`'s children, or at the end of
    /// the top level when `parent` is `None`.
    pub fn insert(
        &mut self,
        class_id: &str,
        name: &str,
        enabled: bool,
        display: BoxedDisplay,
        parent: Option<DisplayId>,
    ) -> PanelResult<DisplayId> {
        if let Some(parent_id) = parent {
            let parent_node = self.get(parent_id).ok_or(PanelError::StaleHandle(parent_id))?;
            if !parent_node.kind.is_group() {
                return Err(PanelError::NotAGroup(parent_id));
            }
        }

        let node = DisplayNode {
            class_id: class_id.to_string(),
            name: name.to_string(),
            enabled,
            instance_id: Uuid::new_v4(),
            kind: display.kind(),
            display,
            parent,
            children: Vec::new(),
            state: NodeState::Live,
        };
        let id = DisplayId(self.arena.insert(node));

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.arena.get_mut(parent_id.0) {
                    parent_node.children.push(id);
                }
            }
            None => self.top_level.push(id),
        }

        trace!("Inserted {} '{}' as {}", class_id, name, id);
        Ok(id)
    }

    /// Look up a live display
    pub fn get(&self, id: DisplayId) -> Option<&DisplayNode> {
        self.arena.get(id.0).filter(|n| n.state == NodeState::Live)
    }

    pub fn get_mut(&mut self, id: DisplayId) -> Option<&mut DisplayNode> {
        self.arena
            .get_mut(id.0)
            .filter(|n| n.state == NodeState::Live)
    }

    pub fn is_live(&self, id: DisplayId) -> bool {
        self.get(id).is_some()
    }

    /// True while the display's storage exists, live or tombstoned
    pub fn is_allocated(&self, id: DisplayId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn is_group(&self, id: DisplayId) -> bool {
        self.get(id).is_some_and(|n| n.kind.is_group())
    }

    pub fn display_mut(&mut self, id: DisplayId) -> Option<&mut (dyn Display + 'static)> {
        self.get_mut(id).map(|n| n.display.as_mut())
    }

    pub fn fixtures(&self) -> &[String] {
        &self.fixtures
    }

    pub fn top_level(&self) -> &[DisplayId] {
        &self.top_level
    }

    /// Siblings of a live display, itself included, in order
    pub fn siblings(&self, id: DisplayId) -> Option<&[DisplayId]> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => self.get(parent).map(|p| p.children.as_slice()),
            None => Some(self.top_level.as_slice()),
        }
    }

    /// The sibling directly before `id`, if any
    pub fn preceding_sibling(&self, id: DisplayId) -> Option<DisplayId> {
        let siblings = self.siblings(id)?;
        let pos = siblings.iter().position(|&s| s == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// All siblings from `first` to `last` inclusive. Falls back to just the
    /// two endpoints when they don't share a parent.
    pub fn sibling_range(&self, first: DisplayId, last: DisplayId) -> Vec<DisplayId> {
        let Some(siblings) = self.siblings(first) else {
            return Vec::new();
        };
        let start = siblings.iter().position(|&s| s == first);
        let end = siblings.iter().position(|&s| s == last);
        match (start, end) {
            (Some(s), Some(e)) if s <= e => siblings[s..=e].to_vec(),
            (Some(s), Some(e)) => siblings[e..=s].to_vec(),
            _ if self.is_live(last) => vec![first, last],
            _ => vec![first],
        }
    }

    /// `id` and all its live descendants, parents before children
    pub fn subtree(&self, id: DisplayId) -> Vec<DisplayId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: DisplayId, out: &mut Vec<DisplayId>) {
        if let Some(node) = self.get(id) {
            out.push(id);
            for &child in &node.children {
                self.collect_subtree(child, out);
            }
        }
    }

    /// Every live display, parents before children, in row order
    pub fn iter_preorder(&self) -> Vec<DisplayId> {
        let mut out = Vec::new();
        for &id in &self.top_level {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    /// Visible rows: fixtures first, then displays depth-first
    pub fn rows(&self) -> Vec<Row> {
        let mut rows: Vec<Row> = self.fixtures.iter().cloned().map(Row::Fixture).collect();
        for &id in &self.top_level {
            self.collect_rows(id, 0, &mut rows);
        }
        rows
    }

    fn collect_rows(&self, id: DisplayId, depth: usize, rows: &mut Vec<Row>) {
        if let Some(node) = self.get(id) {
            rows.push(Row::Display { id, depth });
            for &child in &node.children {
                self.collect_rows(child, depth + 1, rows);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.iter_preorder().len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Detach `id` from its parent and tombstone it and its descendants.
    ///
    /// Storage stays allocated until [`reclaim`](Self::reclaim). Returns the
    /// tombstoned ids, or an empty list if `id` was not live.
    pub fn schedule_destroy(&mut self, id: DisplayId) -> Vec<DisplayId> {
        let doomed = self.subtree(id);
        if doomed.is_empty() {
            return doomed;
        }

        let parent = self.get(id).and_then(|n| n.parent);
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.arena.get_mut(parent_id.0) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            None => self.top_level.retain(|&c| c != id),
        }

        for &member in &doomed {
            if let Some(node) = self.arena.get_mut(member.0) {
                node.state = NodeState::Tombstoned;
            }
        }
        self.pending_free.extend_from_slice(&doomed);
        debug!("Scheduled {} display(s) under {} for destruction", doomed.len(), id);
        doomed
    }

    /// Number of tombstoned displays still holding storage
    pub fn pending_destruction(&self) -> usize {
        self.pending_free.len()
    }

    /// Free the storage of every tombstoned display. Returns how many were freed.
    pub fn reclaim(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_free);
        let mut freed = 0;
        for id in pending {
            if self.arena.remove(id.0).is_some() {
                freed += 1;
            }
        }
        if freed > 0 {
            debug!("Reclaimed {} display(s)", freed);
        }
        freed
    }

    /// Write a display and, for groups, all its descendants into `config`.
    ///
    /// Layout: `Class`, `Name`, `Enabled`, the display's own parameters, then
    /// for groups a `Displays` sequence with one mapping per child.
    pub fn save_subtree(&self, id: DisplayId, config: &mut ConfigNode) -> PanelResult<()> {
        let node = self.get(id).ok_or(PanelError::StaleHandle(id))?;

        config.map_set(KEY_CLASS, node.class_id.as_str());
        config.map_set(KEY_NAME, node.name.as_str());
        config.map_set(KEY_ENABLED, node.enabled);
        node.display.save(config);

        if node.kind.is_group() {
            let list = config.map_child_mut(KEY_DISPLAYS);
            *list = ConfigNode::Sequence(Vec::new());
            for &child in &node.children {
                self.save_subtree(child, list.list_append_new())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingDisplay, RecordingGroup};

    fn tree_with(names: &[&str]) -> (DisplayTree, Vec<DisplayId>) {
        let mut tree = DisplayTree::new(&["Global Options"]);
        let ids = names
            .iter()
            .map(|n| {
                tree.insert("Recording", n, true, RecordingDisplay::boxed(), None)
                    .unwrap()
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_insert_into_leaf_fails() {
        let (mut tree, ids) = tree_with(&["a"]);
        let result = tree.insert("Recording", "b", true, RecordingDisplay::boxed(), Some(ids[0]));
        assert!(matches!(result, Err(PanelError::NotAGroup(_))));
    }

    #[test]
    fn test_rows_list_fixtures_then_preorder() {
        let mut tree = DisplayTree::new(&["Global Options", "Global Status"]);
        let group = tree
            .insert("Group", "g", true, RecordingGroup::boxed(), None)
            .unwrap();
        let child = tree
            .insert("Recording", "c", true, RecordingDisplay::boxed(), Some(group))
            .unwrap();

        assert_eq!(
            tree.rows(),
            vec![
                Row::Fixture("Global Options".to_string()),
                Row::Fixture("Global Status".to_string()),
                Row::Display { id: group, depth: 0 },
                Row::Display { id: child, depth: 1 },
            ]
        );
    }

    #[test]
    fn test_preceding_sibling() {
        let (tree, ids) = tree_with(&["a", "b", "c"]);
        assert_eq!(tree.preceding_sibling(ids[0]), None);
        assert_eq!(tree.preceding_sibling(ids[2]), Some(ids[1]));
    }

    #[test]
    fn test_sibling_range() {
        let (tree, ids) = tree_with(&["a", "b", "c", "d"]);
        assert_eq!(tree.sibling_range(ids[1], ids[3]), ids[1..].to_vec());
        assert_eq!(tree.sibling_range(ids[2], ids[2]), vec![ids[2]]);
    }

    #[test]
    fn test_schedule_destroy_keeps_storage_until_reclaim() {
        let mut tree = DisplayTree::new(&[]);
        let group = tree
            .insert("Group", "g", true, RecordingGroup::boxed(), None)
            .unwrap();
        let child = tree
            .insert("Recording", "c", true, RecordingDisplay::boxed(), Some(group))
            .unwrap();

        let doomed = tree.schedule_destroy(group);
        assert_eq!(doomed, vec![group, child]);
        assert!(!tree.is_live(group));
        assert!(!tree.is_live(child));
        assert!(tree.is_allocated(child));
        assert!(tree.rows().is_empty());
        assert_eq!(tree.pending_destruction(), 2);

        assert_eq!(tree.reclaim(), 2);
        assert!(!tree.is_allocated(group));
        assert!(!tree.is_allocated(child));
    }

    #[test]
    fn test_schedule_destroy_twice_is_noop() {
        let (mut tree, ids) = tree_with(&["a"]);
        assert_eq!(tree.schedule_destroy(ids[0]).len(), 1);
        assert!(tree.schedule_destroy(ids[0]).is_empty());
        assert_eq!(tree.reclaim(), 1);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let (mut tree, ids) = tree_with(&["a"]);
        tree.schedule_destroy(ids[0]);
        tree.reclaim();
        let fresh = tree
            .insert("Recording", "b", true, RecordingDisplay::boxed(), None)
            .unwrap();
        assert_ne!(fresh, ids[0]);
        assert!(tree.get(ids[0]).is_none());
    }

    #[test]
    fn test_save_subtree_layout() {
        let mut tree = DisplayTree::new(&[]);
        let group = tree
            .insert("Group", "g", false, RecordingGroup::boxed(), None)
            .unwrap();
        tree.insert("Recording", "c", true, RecordingDisplay::boxed(), Some(group))
            .unwrap();

        let mut config = ConfigNode::new();
        tree.save_subtree(group, &mut config).unwrap();

        let keys: Vec<&str> = config.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["Class", "Name", "Enabled", "Displays"]);
        assert_eq!(config.map_get_bool("Enabled"), Some(false));

        let children = config.map_get("Displays").unwrap().list_items();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].map_get_str("Class"), Some("Recording"));
        assert_eq!(children[0].map_get_str("Name"), Some("c"));
    }
}
