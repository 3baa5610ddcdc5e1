//! Common configuration types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default log filter when neither `MS_LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "meeting_session=debug";

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. `info`, `meeting_session=debug`)
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// Read `MS_LOG_LEVEL` and `MS_JSON_LOGS` from a variable map.
    ///
    /// `MS_JSON_LOGS` accepts `1`/`true` (case-insensitive); anything else is off.
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let log_level = vars
            .get("MS_LOG_LEVEL")
            .filter(|level| !level.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let json_logs = vars
            .get("MS_JSON_LOGS")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Self {
            log_level,
            json_logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ObservabilityConfig::from_vars(&HashMap::new());
        assert_eq!(config, ObservabilityConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let vars = HashMap::from([
            ("MS_LOG_LEVEL".to_string(), "warn".to_string()),
            ("MS_JSON_LOGS".to_string(), "TRUE".to_string()),
        ]);
        let config = ObservabilityConfig::from_vars(&vars);

        assert_eq!(config.log_level, "warn");
        assert!(config.json_logs);
    }

    #[test]
    fn test_blank_level_falls_back() {
        let vars = HashMap::from([("MS_LOG_LEVEL".to_string(), "  ".to_string())]);
        assert_eq!(
            ObservabilityConfig::from_vars(&vars).log_level,
            DEFAULT_LOG_LEVEL
        );
    }
}
