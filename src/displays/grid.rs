//! Grid display

use super::{load_params, save_params};
use anyhow::Result;
use display_panel_core::{BoxedDisplay, ConfigNode, Display};
use serde::{Deserialize, Serialize};

/// Plane the grid is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridPlane {
    #[default]
    XY,
    XZ,
    YZ,
}

/// Grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GridConfig {
    /// Length of one cell edge in meters
    pub cell_size: f64,
    /// Number of cells along each axis
    pub cell_count: u32,
    pub line_width: f64,
    /// Line color as "#rrggbb"
    pub color: String,
    /// Alpha, 0.0 to 1.0
    pub alpha: f64,
    pub plane: GridPlane,
    pub reference_frame: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            cell_count: 10,
            line_width: 0.03,
            color: "#a0a0a4".to_string(),
            alpha: 0.5,
            plane: GridPlane::XY,
            reference_frame: "<Fixed Frame>".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GridDisplay {
    config: GridConfig,
}

impl GridDisplay {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self::default())
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }
}

impl Display for GridDisplay {
    fn save(&self, config: &mut ConfigNode) {
        save_params(&self.config, config);
    }

    fn load(&mut self, config: &ConfigNode) -> Result<()> {
        let mut loaded: GridConfig = load_params(config)?;
        loaded.alpha = loaded.alpha.clamp(0.0, 1.0);
        self.config = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let mut source = GridDisplay::default();
        source.config.cell_size = 0.25;
        source.config.plane = GridPlane::YZ;
        source.config.color = "#ff0000".to_string();

        let mut config = ConfigNode::new();
        source.save(&mut config);
        assert_eq!(config.map_get_str("Plane"), Some("YZ"));

        let mut copy = GridDisplay::default();
        copy.load(&config).unwrap();
        assert_eq!(copy.config(), source.config());
    }

    #[test]
    fn test_alpha_clamped() {
        let mut config = ConfigNode::new();
        config.map_set("Alpha", 3.0);
        let mut grid = GridDisplay::default();
        grid.load(&config).unwrap();
        assert_eq!(grid.config().alpha, 1.0);
    }

    #[test]
    fn test_bad_plane_rejected() {
        let mut config = ConfigNode::new();
        config.map_set("Plane", "diagonal");
        let mut grid = GridDisplay::default();
        assert!(grid.load(&config).is_err());
        assert_eq!(grid.config(), &GridConfig::default());
    }
}
