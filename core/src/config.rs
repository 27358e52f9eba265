//! Store configuration.
//!
//! Loaded from JSON so the host can pass a single string across the
//! boundary. Every field is optional and falls back to its default.

use serde::Deserialize;

use crate::error::StoreError;

pub const DEFAULT_MAX_NAME_LENGTH: usize = 1024;
pub const DEFAULT_MAX_COLOR_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToodleConfig {
    /// Upper bound on item and label names, in characters.
    pub max_name_length: usize,
    /// Upper bound on label colors, in characters.
    pub max_color_length: usize,
    /// `tracing` filter directive used when the host does not set `TOODLE_LOG`.
    pub log_filter: Option<String>,
}

impl Default for ToodleConfig {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_color_length: DEFAULT_MAX_COLOR_LENGTH,
            log_filter: None,
        }
    }
}

impl ToodleConfig {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let config: ToodleConfig =
            serde_json::from_str(json).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.max_name_length == 0 {
            return Err(StoreError::Config("max_name_length must be positive".into()));
        }
        if self.max_color_length == 0 {
            return Err(StoreError::Config("max_color_length must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ToodleConfig::from_json("{}").unwrap();
        assert_eq!(config, ToodleConfig::default());
    }

    #[test]
    fn partial_object_overrides_only_given_fields() {
        let config = ToodleConfig::from_json(r#"{"max_name_length": 10}"#).unwrap();
        assert_eq!(config.max_name_length, 10);
        assert_eq!(config.max_color_length, DEFAULT_MAX_COLOR_LENGTH);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn log_filter_is_read() {
        let config = ToodleConfig::from_json(r#"{"log_filter": "toodle_core=debug"}"#).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("toodle_core=debug"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = ToodleConfig::from_json(r#"{"max_color_length": 0}"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ToodleConfig::from_json(r#"{"uri": "/tmp/toodle.db"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ToodleConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
