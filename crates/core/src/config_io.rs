//! Reading and writing config trees as files

use crate::ConfigIoError;
use display_panel_types::ConfigNode;
use std::path::Path;

/// Reads a config tree from a file
pub trait ConfigReader {
    /// Read `path`. Implementations log the failure before returning it.
    fn read_file(&self, path: &Path) -> Result<ConfigNode, ConfigIoError>;
}

/// Writes a config tree to a file
pub trait ConfigWriter {
    fn write_file(&self, config: &ConfigNode, path: &Path) -> Result<(), ConfigIoError>;
}

/// JSON reader
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigReader;

impl ConfigReader for JsonConfigReader {
    fn read_file(&self, path: &Path) -> Result<ConfigNode, ConfigIoError> {
        let result = std::fs::read_to_string(path)
            .map_err(|source| ConfigIoError::Read {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|content| {
                serde_json::from_str(&content).map_err(|source| ConfigIoError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            });
        if let Err(e) = &result {
            log::error!("{}", e);
        }
        result
    }
}

/// Pretty-printing JSON writer
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigWriter;

impl ConfigWriter for JsonConfigWriter {
    fn write_file(&self, config: &ConfigNode, path: &Path) -> Result<(), ConfigIoError> {
        let content =
            serde_json::to_string_pretty(config).map_err(|source| ConfigIoError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigIoError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| ConfigIoError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
