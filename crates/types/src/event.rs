//! Notification payloads emitted by displays

use serde::{Deserialize, Serialize};

/// Severity of a display status entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusLevel {
    Ok,
    Warn,
    Error,
}

/// Something that happened to a display
///
/// Events may be produced on any thread and are delivered to listeners on
/// the thread that owns the display tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Display was renamed
    NameChanged { old: String, new: String },
    /// Display was enabled or disabled
    EnabledChanged(bool),
    /// Display switched to a new data source
    TopicChanged { topic: String, datatype: String },
    /// A named status entry changed
    StatusChanged {
        level: StatusLevel,
        name: String,
        text: String,
    },
}

impl DisplayEvent {
    /// Short name used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayEvent::NameChanged { .. } => "name_changed",
            DisplayEvent::EnabledChanged(_) => "enabled_changed",
            DisplayEvent::TopicChanged { .. } => "topic_changed",
            DisplayEvent::StatusChanged { .. } => "status_changed",
        }
    }
}
