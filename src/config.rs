use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Which receivers `<Ident>.createElement(...)` is recognised on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiverPolicy {
    /// Only the given identifier, e.g. `React`.
    Named(String),
    /// Any plain identifier (`t.createElement`, `h.createElement`, ...).
    Any,
}

impl ReceiverPolicy {
    pub fn accepts(&self, receiver: &str) -> bool {
        match self {
            ReceiverPolicy::Named(name) => name == receiver,
            ReceiverPolicy::Any => true,
        }
    }

    fn from_value(v: Value) -> Option<Self> {
        match v {
            Value::Null => Some(ReceiverPolicy::Any),
            Value::String(s) if s == "*" => Some(ReceiverPolicy::Any),
            Value::String(s) if !s.is_empty() => Some(ReceiverPolicy::Named(s)),
            _ => None,
        }
    }
}

impl Default for ReceiverPolicy {
    fn default() -> Self {
        ReceiverPolicy::Named("React".to_string())
    }
}

/// Grammar used when parsing input for reconstruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Tsx,
    Jsx,
}

/// Printer settings for the default re-print formatter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub minify: bool,
    pub ascii_only: bool,
    /// `false` drops the trailing semicolon of each block.
    pub semi: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            minify: false,
            ascii_only: false,
            semi: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub receiver: ReceiverPolicy,
    pub dialect: Dialect,
    pub normalize_shims: bool,
    pub format: FormatOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            receiver: ReceiverPolicy::default(),
            dialect: Dialect::default(),
            normalize_shims: true,
            format: FormatOptions::default(),
        }
    }
}

impl Config {
    /// Build a config from a raw JSON object. Known keys are pulled out and
    /// validated one by one; a bad value falls back to that key's default and
    /// unknown keys are ignored.
    pub fn new(mut config: HashMap<String, Value>) -> Self {
        let defaults = Self::default();

        let receiver = match config.remove("receiver") {
            None => defaults.receiver,
            Some(v) => ReceiverPolicy::from_value(v.clone()).unwrap_or_else(|| {
                tracing::warn!(value = %v, "ignoring invalid `receiver` setting");
                defaults.receiver
            }),
        };

        let dialect = config
            .remove("dialect")
            .map(|v| {
                serde_json::from_value(v).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring invalid `dialect` setting");
                    defaults.dialect
                })
            })
            .unwrap_or(defaults.dialect);

        let normalize_shims = match config.remove("normalize_shims") {
            None => defaults.normalize_shims,
            Some(v) => v.as_bool().unwrap_or_else(|| {
                tracing::warn!(value = %v, "ignoring invalid `normalize_shims` setting");
                defaults.normalize_shims
            }),
        };

        // `#[serde(default)]` merges partial objects with the defaults
        let format = config
            .remove("format")
            .map(|v| {
                serde_json::from_value(v).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring invalid `format` setting");
                    FormatOptions::default()
                })
            })
            .unwrap_or(defaults.format);

        Self {
            receiver,
            dialect,
            normalize_shims,
            format,
        }
    }

    /// Strict loader: malformed JSON is an error.
    pub fn try_from_json(json: &str) -> Result<Self> {
        let map: HashMap<String, Value> = serde_json::from_str(json)?;
        Ok(Self::new(map))
    }

    /// Lenient loader: malformed JSON yields the defaults.
    pub fn from_json(json: &str) -> Self {
        Self::try_from_json(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tool() {
        let config = Config::default();
        assert_eq!(config.receiver, ReceiverPolicy::Named("React".into()));
        assert_eq!(config.dialect, Dialect::Tsx);
        assert!(config.normalize_shims);
        assert!(config.format.semi);
    }

    #[test]
    fn receiver_wildcard_and_null_mean_any() {
        assert_eq!(
            Config::from_json(r#"{"receiver": "*"}"#).receiver,
            ReceiverPolicy::Any
        );
        assert_eq!(
            Config::from_json(r#"{"receiver": null}"#).receiver,
            ReceiverPolicy::Any
        );
        assert_eq!(
            Config::from_json(r#"{"receiver": "Preact"}"#).receiver,
            ReceiverPolicy::Named("Preact".into())
        );
    }

    #[test]
    fn partial_format_merges_with_defaults() {
        let config = Config::from_json(r#"{"format": {"minify": true}, "theme": "dark"}"#);
        assert!(config.format.minify);
        assert!(config.format.semi);
        assert!(!config.format.ascii_only);
    }

    #[test]
    fn bad_values_fall_back_per_key() {
        let config = Config::from_json(r#"{"receiver": 3, "dialect": "vue", "normalize_shims": false}"#);
        assert_eq!(config.receiver, ReceiverPolicy::default());
        assert_eq!(config.dialect, Dialect::Tsx);
        assert!(!config.normalize_shims);
    }

    #[test]
    fn non_boolean_normalize_shims_falls_back() {
        for raw in [r#""no""#, "0", "null", "[]"] {
            let config = Config::from_json(&format!(r#"{{"normalize_shims": {raw}}}"#));
            assert!(config.normalize_shims, "{raw}");
        }
    }

    #[test]
    fn malformed_json_is_strict_or_lenient() {
        assert!(Config::try_from_json("{not json").is_err());
        assert_eq!(Config::from_json("{not json"), Config::default());
    }

    #[test]
    fn accepts_follows_policy() {
        assert!(ReceiverPolicy::default().accepts("React"));
        assert!(!ReceiverPolicy::default().accepts("t"));
        assert!(ReceiverPolicy::Any.accepts("t"));
    }
}
