//! Display factory: creates displays from a class id

use crate::{BoxedDisplay, PanelError, PanelResult};
use std::collections::HashMap;

/// Function that creates a default-initialized display
pub type DisplayConstructor = fn() -> BoxedDisplay;

/// Description of a registered display class
#[derive(Debug, Clone)]
pub struct DisplayClassInfo {
    /// Unique class id (e.g., "Grid")
    pub class_id: String,
    /// One-line description shown in the add dialog
    pub description: String,
}

/// Registry of display classes
///
/// Built-in classes are registered at startup; plugins may add more at
/// runtime before the first display is created.
pub struct DisplayFactory {
    classes: HashMap<String, (DisplayClassInfo, DisplayConstructor)>,
}

impl DisplayFactory {
    /// Create a new empty factory
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a display class, replacing any previous class with the same id
    pub fn register(&mut self, class_id: &str, description: &str, constructor: DisplayConstructor) {
        let info = DisplayClassInfo {
            class_id: class_id.to_string(),
            description: description.to_string(),
        };
        if self
            .classes
            .insert(class_id.to_string(), (info, constructor))
            .is_some()
        {
            log::warn!("Display class {} registered twice, keeping the last", class_id);
        }
    }

    /// Create a display by class id
    pub fn create(&self, class_id: &str) -> PanelResult<BoxedDisplay> {
        let (_, constructor) = self
            .classes
            .get(class_id)
            .ok_or_else(|| PanelError::UnknownClass(class_id.to_string()))?;
        Ok(constructor())
    }

    pub fn contains(&self, class_id: &str) -> bool {
        self.classes.contains_key(class_id)
    }

    /// List registered classes, sorted by id
    pub fn list_classes(&self) -> Vec<&DisplayClassInfo> {
        let mut classes: Vec<&DisplayClassInfo> =
            self.classes.values().map(|(info, _)| info).collect();
        classes.sort_by(|a, b| a.class_id.cmp(&b.class_id));
        classes
    }
}

impl Default for DisplayFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDisplay;

    #[test]
    fn test_create_known_class() {
        let mut factory = DisplayFactory::new();
        factory.register("Recording", "Records calls", RecordingDisplay::boxed);

        assert!(factory.contains("Recording"));
        assert!(factory.create("Recording").is_ok());
    }

    #[test]
    fn test_create_unknown_class_fails() {
        let factory = DisplayFactory::new();
        match factory.create("Nope") {
            Err(PanelError::UnknownClass(id)) => assert_eq!(id, "Nope"),
            other => panic!("expected UnknownClass, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_list_classes_sorted() {
        let mut factory = DisplayFactory::new();
        factory.register("b", "", RecordingDisplay::boxed);
        factory.register("a", "", RecordingDisplay::boxed);

        let ids: Vec<&str> = factory
            .list_classes()
            .iter()
            .map(|c| c.class_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
