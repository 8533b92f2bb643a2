//! display-panel-types: Shared data types for the display tree.
//!
//! This crate contains pure data types (the generic config tree and the
//! display notification payloads) shared across all display-panel crates.
//! It has no behavior beyond (de)serialization.

pub mod config_node;
pub mod event;

pub use config_node::{ConfigNode, Mapping, Scalar};
pub use event::{DisplayEvent, StatusLevel};
