//! display-panel-core: Core traits and display tree management.
//!
//! This crate contains the `Display` trait, the `DisplayFactory` registry,
//! the arena-backed `DisplayTree`, listener dispatch with deferred
//! destruction, update scheduling, selection/command state, and the
//! `VisualizationManager` that ties them together.

pub mod config_io;
pub mod constants;
mod display;
mod error;
pub mod lifecycle;
mod manager;
mod registry;
pub mod selection;
pub mod tree;
pub mod update_manager;

#[cfg(test)]
mod test_support;

pub use config_io::{ConfigReader, ConfigWriter, JsonConfigReader, JsonConfigWriter};
pub use constants::{DEFAULT_FIXTURE_ROWS, DEFAULT_UPDATE_INTERVAL, GROUP_CLASS_ID, GROUP_FILE_EXTENSION};
pub use display::{
    BoxedDisplay, Display, DisplayContext, DisplayId, DisplayKind, DisplayNotifier, Notification,
};
pub use error::{ConfigIoError, PanelError, PanelResult};
pub use lifecycle::{LifecycleGuard, Listener, ListenerId};
pub use manager::{IdleReport, VisualizationManager};
pub use registry::{DisplayClassInfo, DisplayConstructor, DisplayFactory};
pub use selection::{CommandState, PanelCommand, SelectionModel};
pub use tree::{DisplayNode, DisplayTree, NodeState, Row};
pub use update_manager::{UpdateScheduler, UpdateStatus, UpdateSuspendGuard};

// Re-export types used in trait signatures for convenience
pub use display_panel_types::{ConfigNode, DisplayEvent, Mapping, Scalar, StatusLevel};
