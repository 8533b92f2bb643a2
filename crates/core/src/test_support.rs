//! Displays used by unit tests

use crate::{BoxedDisplay, Display, DisplayContext, DisplayFactory, DisplayKind, DisplayNotifier};
use anyhow::{bail, Result};
use display_panel_types::{ConfigNode, DisplayEvent, StatusLevel};
use std::cell::Cell;
use std::time::Duration;

thread_local! {
    static UPDATE_CALLS: Cell<usize> = const { Cell::new(0) };
}

/// Number of `update` calls made on recording displays by this thread
pub fn update_calls() -> usize {
    UPDATE_CALLS.with(|c| c.get())
}

/// Leaf display with two parameters that counts its updates
#[derive(Default)]
pub struct RecordingDisplay {
    pub value: f64,
    pub label: String,
    pub topic: Option<(String, String)>,
    notifier: Option<DisplayNotifier>,
}

impl RecordingDisplay {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self::default())
    }
}

impl Display for RecordingDisplay {
    fn initialize(&mut self, ctx: DisplayContext) {
        self.notifier = Some(ctx.notifier);
    }

    fn save(&self, config: &mut ConfigNode) {
        config.map_set("Value", self.value);
        config.map_set("Label", self.label.as_str());
        if let Some((topic, datatype)) = &self.topic {
            config.map_set("Topic", topic.as_str());
            config.map_set("Type", datatype.as_str());
        }
    }

    fn load(&mut self, config: &ConfigNode) -> Result<()> {
        if let Some(value) = config.map_get_f64("Value") {
            self.value = value;
        }
        if let Some(label) = config.map_get_str("Label") {
            self.label = label.to_string();
        }
        if let (Some(topic), Some(datatype)) =
            (config.map_get_str("Topic"), config.map_get_str("Type"))
        {
            self.topic = Some((topic.to_string(), datatype.to_string()));
        }
        Ok(())
    }

    fn update(&mut self, _wall_dt: Duration) {
        UPDATE_CALLS.with(|c| c.set(c.get() + 1));
    }

    fn set_topic(&mut self, topic: &str, datatype: &str) -> Result<()> {
        self.topic = Some((topic.to_string(), datatype.to_string()));
        if let Some(notifier) = &self.notifier {
            notifier.emit(DisplayEvent::TopicChanged {
                topic: topic.to_string(),
                datatype: datatype.to_string(),
            });
            notifier.emit(DisplayEvent::StatusChanged {
                level: StatusLevel::Ok,
                name: "Topic".to_string(),
                text: "subscribed".to_string(),
            });
        }
        Ok(())
    }
}

/// Composite display with no parameters of its own
#[derive(Default)]
pub struct RecordingGroup;

impl RecordingGroup {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self)
    }
}

impl Display for RecordingGroup {
    fn kind(&self) -> DisplayKind {
        DisplayKind::Group
    }

    fn save(&self, _config: &mut ConfigNode) {}

    fn load(&mut self, _config: &ConfigNode) -> Result<()> {
        Ok(())
    }
}

/// Leaf display that refuses every load
#[derive(Default)]
pub struct FailingDisplay;

impl FailingDisplay {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self)
    }
}

impl Display for FailingDisplay {
    fn save(&self, _config: &mut ConfigNode) {}

    fn load(&mut self, _config: &ConfigNode) -> Result<()> {
        bail!("corrupt parameters")
    }
}

pub fn test_factory() -> DisplayFactory {
    let mut factory = DisplayFactory::new();
    factory.register("Recording", "Records calls", RecordingDisplay::boxed);
    factory.register("Group", "A container for displays", RecordingGroup::boxed);
    factory.register("Failing", "Never loads", FailingDisplay::boxed);
    factory
}
