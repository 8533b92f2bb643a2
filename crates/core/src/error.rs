//! Error types for display tree operations and config file I/O

use crate::DisplayId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Unknown display class: {0}")]
    UnknownClass(String),

    #[error("Display {0} is not in the tree")]
    StaleHandle(DisplayId),

    #[error("Display {0} is not a group")]
    NotAGroup(DisplayId),

    #[error("Stored display has no class: {0}")]
    MissingClass(String),

    #[error("{} does not exist!", .0.display())]
    FileMissing(PathBuf),

    #[error("Failed to load display '{name}': {message}")]
    Load { name: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigIoError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode config for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type PanelResult<T> = Result<T, PanelError>;
