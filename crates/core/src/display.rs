//! Display trait and related types

use anyhow::Result;
use crossbeam::channel::Sender;
use display_panel_types::{ConfigNode, DisplayEvent};
use generational_arena::Index;
use std::fmt;
use std::time::Duration;

/// Stable handle to a display in the tree
///
/// Handles are generation-checked: once a display's storage is reclaimed its
/// handle never resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayId(pub(crate) Index);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Capability of a display: plain leaf or group that owns children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Leaf,
    Group,
}

impl DisplayKind {
    pub fn is_group(self) -> bool {
        self == DisplayKind::Group
    }
}

/// An event tagged with the display that produced it
#[derive(Debug, Clone)]
pub struct Notification {
    pub source: DisplayId,
    pub event: DisplayEvent,
}

/// Thread-safe handle a display uses to emit events
///
/// Can be cloned into worker threads. Events are queued and delivered on the
/// owning thread at the next idle point; events from a display that has been
/// removed in the meantime are dropped.
#[derive(Debug, Clone)]
pub struct DisplayNotifier {
    source: DisplayId,
    sender: Sender<Notification>,
}

impl DisplayNotifier {
    pub(crate) fn new(source: DisplayId, sender: Sender<Notification>) -> Self {
        Self { source, sender }
    }

    pub fn source(&self) -> DisplayId {
        self.source
    }

    /// Queue an event for delivery. Never blocks.
    pub fn emit(&self, event: DisplayEvent) {
        if self
            .sender
            .send(Notification {
                source: self.source,
                event,
            })
            .is_err()
        {
            log::trace!("Dropping event from {}: tree is gone", self.source);
        }
    }
}

/// Everything a display receives when it joins the tree
#[derive(Debug, Clone)]
pub struct DisplayContext {
    pub id: DisplayId,
    pub notifier: DisplayNotifier,
}

/// Trait for all displays
///
/// A display owns its own parameters and knows how to write them into a
/// [`ConfigNode`] and read them back. `save` followed by `load` on a fresh
/// instance of the same class must reproduce the same parameters; this is
/// what duplication and group files are built on. Class id, name, enabled
/// flag and children are persisted by the tree, not by the display.
pub trait Display: Send {
    /// Leaf or group. Queried directly instead of downcasting.
    fn kind(&self) -> DisplayKind {
        DisplayKind::Leaf
    }

    /// Called once, right after the display is inserted in the tree
    fn initialize(&mut self, _ctx: DisplayContext) {}

    /// Write the display's parameters into `config` (a mapping)
    fn save(&self, config: &mut ConfigNode);

    /// Read parameters previously written by `save`
    fn load(&mut self, config: &ConfigNode) -> Result<()>;

    /// Periodic work, called from the update cycle while enabled
    fn update(&mut self, _wall_dt: Duration) {}

    /// Point the display at a data source. Displays without one ignore it.
    fn set_topic(&mut self, _topic: &str, _datatype: &str) -> Result<()> {
        Ok(())
    }

    /// Enabled flag changed
    fn on_enabled_changed(&mut self, _enabled: bool) {}
}

/// Type-erased display for dynamic dispatch
pub type BoxedDisplay = Box<dyn Display>;
