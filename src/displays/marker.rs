//! Marker display - draws shapes received on a topic
//!
//! The only built-in display with a data source. Status changes are reported
//! through the display's notifier so they reach listeners on the owning
//! thread regardless of where the subscription runs.

use super::{load_params, save_params};
use anyhow::{bail, Result};
use display_panel_core::{
    BoxedDisplay, ConfigNode, Display, DisplayContext, DisplayEvent, DisplayNotifier, StatusLevel,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Datatypes the marker display can subscribe to
pub const SUPPORTED_DATATYPES: &[&str] = &["Marker", "MarkerArray"];

/// How long a subscribed display waits before warning about silence
const NO_MESSAGES_WARN_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MarkerConfig {
    pub topic: String,
    pub datatype: String,
    pub queue_size: u32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            datatype: "Marker".to_string(),
            queue_size: 100,
        }
    }
}

#[derive(Debug, Default)]
pub struct MarkerDisplay {
    config: MarkerConfig,
    notifier: Option<DisplayNotifier>,
    since_subscribe: Duration,
    warned: bool,
}

impl MarkerDisplay {
    pub fn boxed() -> BoxedDisplay {
        Box::new(Self::default())
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    fn report(&self, level: StatusLevel, text: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.emit(DisplayEvent::StatusChanged {
                level,
                name: "Topic".to_string(),
                text: text.to_string(),
            });
        }
    }

    fn subscribe(&mut self) {
        self.since_subscribe = Duration::ZERO;
        self.warned = false;
        if self.config.topic.is_empty() {
            self.report(StatusLevel::Warn, "No topic set");
        } else {
            log::debug!("Marker display subscribing to {}", self.config.topic);
            self.report(StatusLevel::Ok, &format!("Subscribed to {}", self.config.topic));
        }
    }
}

impl Display for MarkerDisplay {
    fn initialize(&mut self, ctx: DisplayContext) {
        self.notifier = Some(ctx.notifier);
        self.subscribe();
    }

    fn save(&self, config: &mut ConfigNode) {
        save_params(&self.config, config);
    }

    fn load(&mut self, config: &ConfigNode) -> Result<()> {
        let loaded: MarkerConfig = load_params(config)?;
        if !SUPPORTED_DATATYPES.contains(&loaded.datatype.as_str()) {
            bail!("unsupported marker datatype '{}'", loaded.datatype);
        }
        let changed = loaded.topic != self.config.topic;
        self.config = loaded;
        if changed {
            self.subscribe();
        }
        Ok(())
    }

    fn update(&mut self, wall_dt: Duration) {
        if self.config.topic.is_empty() || self.warned {
            return;
        }
        self.since_subscribe += wall_dt;
        if self.since_subscribe >= NO_MESSAGES_WARN_AFTER {
            self.warned = true;
            self.report(StatusLevel::Warn, "No messages received");
        }
    }

    fn set_topic(&mut self, topic: &str, datatype: &str) -> Result<()> {
        if !SUPPORTED_DATATYPES.contains(&datatype) {
            bail!("unsupported marker datatype '{}'", datatype);
        }
        self.config.topic = topic.to_string();
        self.config.datatype = datatype.to_string();
        if let Some(notifier) = &self.notifier {
            notifier.emit(DisplayEvent::TopicChanged {
                topic: topic.to_string(),
                datatype: datatype.to_string(),
            });
        }
        self.subscribe();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_topic_rejects_unknown_datatype() {
        let mut marker = MarkerDisplay::default();
        assert!(marker.set_topic("/points", "PointCloud2").is_err());
        assert!(marker.config().topic.is_empty());
    }

    #[test]
    fn test_topic_round_trips() {
        let mut marker = MarkerDisplay::default();
        marker.set_topic("/markers", "MarkerArray").unwrap();

        let mut config = ConfigNode::new();
        marker.save(&mut config);
        let mut copy = MarkerDisplay::default();
        copy.load(&config).unwrap();
        assert_eq!(copy.config(), marker.config());
    }

    #[test]
    fn test_silence_warning_fires_once() {
        let mut marker = MarkerDisplay::default();
        marker.set_topic("/markers", "Marker").unwrap();
        marker.update(Duration::from_secs(6));
        assert!(marker.warned);
        marker.since_subscribe = Duration::ZERO;
        marker.update(Duration::from_secs(6));
        assert_eq!(marker.since_subscribe, Duration::ZERO);
    }
}
