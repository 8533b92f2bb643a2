//! Shared constants for the display tree

use std::time::Duration;

/// Default period of the cooperative update cycle
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(33);

/// Extension used for saved display group files (without the dot)
pub const GROUP_FILE_EXTENSION: &str = "dgroup";

/// Rows shown ahead of the first display; they are never removable
pub const DEFAULT_FIXTURE_ROWS: &[&str] = &["Global Options", "Global Status"];

/// Class id of the built-in composite display
pub const GROUP_CLASS_ID: &str = "Group";

// Keys every saved display mapping carries
pub const KEY_CLASS: &str = "Class";
pub const KEY_NAME: &str = "Name";
pub const KEY_ENABLED: &str = "Enabled";
pub const KEY_DISPLAYS: &str = "Displays";
