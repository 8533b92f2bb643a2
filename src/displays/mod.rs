//! Built-in displays
//!
//! Each display keeps its parameters in a typed serde struct; `save_params`
//! and `load_params` bridge those structs to the generic config tree.

mod axes;
mod grid;
mod group;
mod marker;

pub use axes::{AxesConfig, AxesDisplay};
pub use grid::{GridConfig, GridDisplay, GridPlane};
pub use group::DisplayGroup;
pub use marker::{MarkerConfig, MarkerDisplay};

use anyhow::{Context, Result};
use display_panel_core::{ConfigNode, DisplayFactory, GROUP_CLASS_ID};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Register all built-in display classes
pub fn register_all(factory: &mut DisplayFactory) {
    factory.register(GROUP_CLASS_ID, "A container for displays", DisplayGroup::boxed);
    factory.register("Grid", "Displays a grid along a plane", GridDisplay::boxed);
    factory.register("Axes", "Displays a set of coordinate axes", AxesDisplay::boxed);
    factory.register(
        "Marker",
        "Displays shapes received on a topic",
        MarkerDisplay::boxed,
    );
}

/// A factory with every built-in class registered
pub fn builtin_factory() -> DisplayFactory {
    let mut factory = DisplayFactory::new();
    register_all(&mut factory);
    factory
}

/// Merge the fields of `params` into the mapping `config`
pub(crate) fn save_params<T: Serialize>(params: &T, config: &mut ConfigNode) {
    let node = serde_json::to_value(params)
        .and_then(serde_json::from_value::<ConfigNode>);
    match node {
        Ok(ConfigNode::Mapping(fields)) => {
            for (key, value) in fields.iter() {
                config.map_set(key, value.clone());
            }
        }
        Ok(_) => log::warn!("Display parameters did not serialize to a mapping"),
        Err(e) => log::warn!("Failed to serialize display parameters: {}", e),
    }
}

/// Read a parameter struct back from `config`. Keys the struct doesn't
/// know (class, name, children) are ignored.
pub(crate) fn load_params<T: DeserializeOwned>(config: &ConfigNode) -> Result<T> {
    let value = serde_json::to_value(config).context("Failed to read display parameters")?;
    serde_json::from_value(value).context("Invalid display parameters")
}
