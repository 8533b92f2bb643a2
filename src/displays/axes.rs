//! Axes display

use super::{load_params, save_params};
use anyhow::{ensure, Result};
use display_panel_core::{BoxedDisplay, ConfigNode, Display};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AxesConfig {
    pub length: f64,
    pub radius: f64,
    pub reference_frame: String,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            length: 1.0,
            radius: 0.1,
            reference_frame: "<Fixed Frame>".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AxesDisplay {
    config: AxesConfig,
}

impl AxesDisplay {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self::default())
    }

    pub fn config(&self) -> &AxesConfig {
        &self.config
    }
}

impl Display for AxesDisplay {
    fn save(&self, config: &mut ConfigNode) {
        save_params(&self.config, config);
    }

    fn load(&mut self, config: &ConfigNode) -> Result<()> {
        let loaded: AxesConfig = load_params(config)?;
        ensure!(
            loaded.length >= 0.0 && loaded.radius >= 0.0,
            "axes length and radius must not be negative"
        );
        self.config = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_length_rejected() {
        let mut config = ConfigNode::new();
        config.map_set("Length", -1.0);
        let mut axes = AxesDisplay::default();
        assert!(axes.load(&config).is_err());
    }

    #[test]
    fn test_integer_length_accepted() {
        let mut config = ConfigNode::new();
        config.map_set("Length", 2);
        let mut axes = AxesDisplay::default();
        axes.load(&config).unwrap();
        assert_eq!(axes.config().length, 2.0);
    }
}
