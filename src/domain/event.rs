//! Progress events emitted by the pipeline for the presentation layer.

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of the training log.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineEvent {
    pub message: String,
    pub level: EventLevel,
    pub timestamp: DateTime<Local>,
}

impl PipelineEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Local::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_level_constructor_when_building_then_sets_level_and_local_time() {
        let before = Local::now();
        let event = PipelineEvent::warning("Using demonstration data...");

        assert_eq!(event.level, EventLevel::Warning);
        assert_eq!(event.message, "Using demonstration data...");
        assert!(event.timestamp >= before);
        assert_eq!(
            serde_json::to_string(&event.level).unwrap(),
            "\"warning\""
        );
    }
}
