//! Streaming input subscribed to Kafka topics.

use super::utils::optional_str;
use crate::error::ComponentError;
use crate::resolver::TYPE_CONFIG_NAME;
use crate::{Component, Input};
use conveyor_config::{ConfigTree, Validations, ValueType};

pub const BROKERS_CONFIG: &str = "brokers";
pub const TOPICS_CONFIG: &str = "topics";
pub const TOPIC_PATTERN_CONFIG: &str = "topic.pattern";
pub const GROUP_ID_CONFIG: &str = "group.id";
pub const ENCODING_CONFIG: &str = "encoding";

/// How topics are selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    Topics(Vec<String>),
    Pattern(String),
}

#[derive(Debug, Default)]
pub struct KafkaInput {
    brokers: String,
    subscription: Option<Subscription>,
    group_id: Option<String>,
    encoding: String,
}

impl KafkaInput {
    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl Component for KafkaInput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        self.brokers = config.get_str(BROKERS_CONFIG)?.to_string();
        self.subscription = match (
            config.has_path(TOPICS_CONFIG),
            config.has_path(TOPIC_PATTERN_CONFIG),
        ) {
            (true, false) => Some(Subscription::Topics(
                config.get_string_list(TOPICS_CONFIG)?,
            )),
            (false, true) => Some(Subscription::Pattern(
                config.get_str(TOPIC_PATTERN_CONFIG)?.to_string(),
            )),
            _ => {
                return Err(ComponentError::InvalidConfig(format!(
                    "exactly one of {TOPICS_CONFIG} or {TOPIC_PATTERN_CONFIG} must be set"
                )));
            }
        };
        self.group_id = optional_str(config, GROUP_ID_CONFIG)?;
        self.encoding = optional_str(config, ENCODING_CONFIG)?.unwrap_or_else(|| "string".into());
        Ok(())
    }

    fn validations(&self) -> Validations {
        Validations::builder()
            .mandatory_path(BROKERS_CONFIG, Some(ValueType::String))
            .exactly_one_path_exists(None, [TOPICS_CONFIG, TOPIC_PATTERN_CONFIG])
            .optional_path(TOPICS_CONFIG, ValueType::List)
            .optional_path(TOPIC_PATTERN_CONFIG, ValueType::String)
            .optional_path(GROUP_ID_CONFIG, ValueType::String)
            .allowed_values(ENCODING_CONFIG, ["string", "bytearray"])
            .handles_path(TYPE_CONFIG_NAME)
            .build()
    }
}

impl Input for KafkaInput {
    fn is_streaming(&self) -> bool {
        true
    }
}
