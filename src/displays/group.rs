//! Group display - a container for other displays

use anyhow::Result;
use display_panel_core::{BoxedDisplay, ConfigNode, Display, DisplayKind};

/// Composite display
///
/// Owns no parameters of its own; its children are kept and persisted by
/// the display tree.
#[derive(Debug, Default)]
pub struct DisplayGroup;

impl DisplayGroup {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self)
    }
}

impl Display for DisplayGroup {
    fn kind(&self) -> DisplayKind {
        DisplayKind::Group
    }

    fn save(&self, _config: &mut ConfigNode) {}

    fn load(&mut self, _config: &ConfigNode) -> Result<()> {
        Ok(())
    }
}
