//! display-panel: control logic for a panel of visualization displays
//!
//! This library provides:
//! - Built-in display classes (group, grid, axes, marker)
//! - The displays panel command controller and its prompt seam
//! - Configuration management
//!
//! The display tree, lifecycle and update scheduling live in
//! `display-panel-core`; the config tree types in `display-panel-types`.

pub mod config;
pub mod displays;
pub mod panel;

// Re-export commonly used types
pub use config::AppConfig;
pub use display_panel_core::{ConfigNode, DisplayId, PanelCommand, VisualizationManager};
pub use displays::{builtin_factory, register_all};
pub use panel::{CommandOutcome, DisplaysPanel, PanelPrompts, ScriptedPrompts};
