//! VisualizationManager - owns the display tree and everything around it
//!
//! The manager is the single owner of the display tree, the factory, the
//! listener registry and the update scheduler. All structural edits go
//! through it so that removal always detaches listeners before tombstoning,
//! and reclamation only happens in [`VisualizationManager::process_idle`].

use crate::constants::{DEFAULT_FIXTURE_ROWS, DEFAULT_UPDATE_INTERVAL, KEY_CLASS, KEY_DISPLAYS, KEY_ENABLED, KEY_NAME};
use crate::lifecycle::{LifecycleGuard, Listener, ListenerId};
use crate::tree::DisplayTree;
use crate::update_manager::{UpdateScheduler, UpdateSuspendGuard};
use crate::{DisplayContext, DisplayFactory, DisplayId, PanelError, PanelResult};
use display_panel_types::{ConfigNode, DisplayEvent};
use log::{debug, info, warn};
use std::time::Duration;

/// What an idle pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleReport {
    /// Listener invocations
    pub delivered: usize,
    /// Displays whose storage was freed
    pub reclaimed: usize,
}

pub struct VisualizationManager {
    factory: DisplayFactory,
    tree: DisplayTree,
    lifecycle: LifecycleGuard,
    scheduler: UpdateScheduler,
    config_dirty: bool,
    config_changed_count: u64,
    on_config_changed: Option<Box<dyn FnMut()>>,
}

impl VisualizationManager {
    pub fn new(factory: DisplayFactory) -> Self {
        Self::with_fixtures(factory, DEFAULT_FIXTURE_ROWS)
    }

    pub fn with_fixtures(factory: DisplayFactory, fixtures: &[&str]) -> Self {
        Self {
            factory,
            tree: DisplayTree::new(fixtures),
            lifecycle: LifecycleGuard::new(),
            scheduler: UpdateScheduler::new(DEFAULT_UPDATE_INTERVAL),
            config_dirty: false,
            config_changed_count: 0,
            on_config_changed: None,
        }
    }

    pub fn factory(&self) -> &DisplayFactory {
        &self.factory
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut UpdateScheduler {
        &mut self.scheduler
    }

    pub fn lifecycle(&self) -> &LifecycleGuard {
        &self.lifecycle
    }

    // ---- creation ----

    /// Create a top-level display. Fails if the class is unknown.
    pub fn create_display(&mut self, class_id: &str, name: &str, enabled: bool) -> PanelResult<DisplayId> {
        let id = self.insert_display(class_id, name, enabled, None)?;
        info!("Created display '{}' ({})", name, class_id);
        self.notify_config_changed();
        Ok(id)
    }

    /// Create a display as the last child of `parent`
    pub fn create_child_display(
        &mut self,
        parent: DisplayId,
        class_id: &str,
        name: &str,
        enabled: bool,
    ) -> PanelResult<DisplayId> {
        let id = self.insert_display(class_id, name, enabled, Some(parent))?;
        self.notify_config_changed();
        Ok(id)
    }

    fn insert_display(
        &mut self,
        class_id: &str,
        name: &str,
        enabled: bool,
        parent: Option<DisplayId>,
    ) -> PanelResult<DisplayId> {
        let display = self.factory.create(class_id)?;
        let id = self.tree.insert(class_id, name, enabled, display, parent)?;
        let ctx = DisplayContext {
            id,
            notifier: self.lifecycle.notifier(id),
        };
        if let Some(display) = self.tree.display_mut(id) {
            display.initialize(ctx);
        }
        Ok(id)
    }

    // ---- attributes ----

    pub fn display_name(&self, id: DisplayId) -> Option<&str> {
        self.tree.get(id).map(|n| n.name.as_str())
    }

    pub fn class_id(&self, id: DisplayId) -> Option<&str> {
        self.tree.get(id).map(|n| n.class_id.as_str())
    }

    pub fn is_group(&self, id: DisplayId) -> bool {
        self.tree.is_group(id)
    }

    pub fn is_live(&self, id: DisplayId) -> bool {
        self.tree.is_live(id)
    }

    /// Rename a display. Returns false if the name was already `name`.
    pub fn rename_display(&mut self, id: DisplayId, name: &str) -> PanelResult<bool> {
        let node = self.tree.get_mut(id).ok_or(PanelError::StaleHandle(id))?;
        if node.name == name {
            return Ok(false);
        }
        let old = std::mem::replace(&mut node.name, name.to_string());
        debug!("Renamed {} '{}' -> '{}'", id, old, name);
        self.lifecycle.post(
            id,
            DisplayEvent::NameChanged {
                old,
                new: name.to_string(),
            },
        );
        self.notify_config_changed();
        Ok(true)
    }

    pub fn set_display_enabled(&mut self, id: DisplayId, enabled: bool) -> PanelResult<()> {
        let node = self.tree.get_mut(id).ok_or(PanelError::StaleHandle(id))?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        if let Some(display) = self.tree.display_mut(id) {
            display.on_enabled_changed(enabled);
        }
        self.lifecycle.post(id, DisplayEvent::EnabledChanged(enabled));
        self.notify_config_changed();
        Ok(())
    }

    /// Point a display at a data source
    pub fn set_display_topic(&mut self, id: DisplayId, topic: &str, datatype: &str) -> PanelResult<()> {
        let name = self.display_name(id).unwrap_or_default().to_string();
        let display = self.tree.display_mut(id).ok_or(PanelError::StaleHandle(id))?;
        display
            .set_topic(topic, datatype)
            .map_err(|e| PanelError::Load {
                name,
                message: format!("{:#}", e),
            })
    }

    // ---- persistence ----

    /// Serialize a display and its whole subtree into `config`
    pub fn save_display(&self, id: DisplayId, config: &mut ConfigNode) -> PanelResult<()> {
        self.tree.save_subtree(id, config)
    }

    /// Load `config` into an existing display.
    ///
    /// Name and enabled flag are taken from the config when present. For a
    /// group, its current children are removed and replaced by displays
    /// built from the `Displays` sequence.
    pub fn load_display(&mut self, id: DisplayId, config: &ConfigNode) -> PanelResult<()> {
        let node = self.tree.get_mut(id).ok_or(PanelError::StaleHandle(id))?;
        let mut renamed = None;
        if let Some(name) = config.map_get_str(KEY_NAME).filter(|n| *n != node.name) {
            let old = std::mem::replace(&mut node.name, name.to_string());
            renamed = Some(DisplayEvent::NameChanged {
                old,
                new: name.to_string(),
            });
        }
        if let Some(enabled) = config.map_get_bool(KEY_ENABLED) {
            node.enabled = enabled;
        }
        let name = node.name.clone();
        let kind = node.kind();
        if let Some(event) = renamed {
            self.lifecycle.post(id, event);
        }

        if let Some(display) = self.tree.display_mut(id) {
            display.load(config).map_err(|e| PanelError::Load {
                name,
                message: format!("{:#}", e),
            })?;
        }

        if kind.is_group() {
            let existing: Vec<DisplayId> = self
                .tree
                .get(id)
                .map(|n| n.children().to_vec())
                .unwrap_or_default();
            for child in existing {
                self.remove_display(child);
            }

            let children = config.map_get(KEY_DISPLAYS).map(ConfigNode::list_items).unwrap_or(&[]);
            for child_config in children {
                let class_id = child_config
                    .map_get_str(KEY_CLASS)
                    .ok_or_else(|| PanelError::MissingClass(format!("child of {}", id)))?;
                let child_name = child_config.map_get_str(KEY_NAME).unwrap_or(class_id);
                let enabled = child_config.map_get_bool(KEY_ENABLED).unwrap_or(true);
                let child = self.insert_display(class_id, child_name, enabled, Some(id))?;
                self.load_display(child, child_config)?;
            }
        }
        Ok(())
    }

    /// Insert a group read from a file as a new top-level display.
    ///
    /// All-or-nothing: on failure the partially built subtree is removed
    /// and the tree is left as it was.
    pub fn load_group(&mut self, config: &ConfigNode) -> PanelResult<DisplayId> {
        let class_id = config
            .map_get_str(KEY_CLASS)
            .ok_or_else(|| PanelError::MissingClass("group file".to_string()))?
            .to_string();
        let name = config.map_get_str(KEY_NAME).unwrap_or(&class_id).to_string();

        let id = self.insert_display(&class_id, &name, true, None)?;
        if !self.tree.is_group(id) {
            self.discard(id);
            return Err(PanelError::NotAGroup(id));
        }
        if let Err(e) = self.load_display(id, config) {
            warn!("Failed to load group '{}': {}", name, e);
            self.discard(id);
            return Err(e);
        }

        info!("Loaded group '{}' with {} display(s)", name, self.tree.subtree(id).len() - 1);
        self.notify_config_changed();
        Ok(id)
    }

    /// Tear down a display that never became visible to the user
    fn discard(&mut self, id: DisplayId) {
        for member in self.tree.subtree(id) {
            self.lifecycle.disconnect_all(member);
        }
        self.tree.schedule_destroy(id);
    }

    // ---- removal ----

    /// Remove a display and its descendants.
    ///
    /// Listeners are detached first, then the subtree is tombstoned. Storage
    /// is freed at the next [`process_idle`](Self::process_idle). Does not
    /// emit a config-changed notification so callers can batch removals.
    pub fn remove_display(&mut self, id: DisplayId) -> bool {
        let members = self.tree.subtree(id);
        if members.is_empty() {
            return false;
        }
        for &member in &members {
            self.lifecycle.disconnect_all(member);
        }
        self.tree.schedule_destroy(id);
        debug!("Removed {} ({} display(s))", id, members.len());
        true
    }

    // ---- notifications ----

    /// Listen for events from a live display
    pub fn connect(&mut self, id: DisplayId, listener: Listener) -> PanelResult<ListenerId> {
        if !self.tree.is_live(id) {
            return Err(PanelError::StaleHandle(id));
        }
        Ok(self.lifecycle.connect(id, listener))
    }

    pub fn disconnect(&mut self, listener: ListenerId) -> bool {
        self.lifecycle.disconnect(listener)
    }

    /// Mark the overall configuration dirty
    pub fn notify_config_changed(&mut self) {
        self.config_dirty = true;
        self.config_changed_count += 1;
        if let Some(callback) = self.on_config_changed.as_mut() {
            callback();
        }
    }

    pub fn set_config_changed_callback(&mut self, callback: Box<dyn FnMut()>) {
        self.on_config_changed = Some(callback);
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    pub fn mark_config_saved(&mut self) {
        self.config_dirty = false;
    }

    /// Total config-changed notifications emitted so far
    pub fn config_changed_count(&self) -> u64 {
        self.config_changed_count
    }

    // ---- update cycle ----

    /// Pause the update cycle until the guard is dropped
    pub fn suspend_updates(&self) -> UpdateSuspendGuard {
        self.scheduler.suspend()
    }

    pub fn updates_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Run one update cycle over every enabled live display. Returns false
    /// if updates are suspended.
    pub fn update(&mut self, wall_dt: Duration) -> bool {
        if !self.scheduler.begin_frame() {
            return false;
        }
        for id in self.tree.iter_preorder() {
            let enabled = self.tree.get(id).is_some_and(|n| n.enabled);
            if !enabled {
                continue;
            }
            if let Some(display) = self.tree.display_mut(id) {
                display.update(wall_dt);
            }
        }
        true
    }

    /// Idle point: deliver queued events, then free tombstoned displays.
    pub fn process_idle(&mut self) -> IdleReport {
        let tree = &self.tree;
        let delivered = self.lifecycle.dispatch_pending(|id| tree.is_live(id));
        let reclaimed = self.tree.reclaim();
        IdleReport {
            delivered,
            reclaimed,
        }
    }
}
