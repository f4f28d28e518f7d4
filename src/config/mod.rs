//! Configuration management

use crate::domain::shared::{FsmError, Result};
use crate::domain::timer::TimerKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timers: TimerConfig,
    pub call_log: CallLogConfig,
    pub logging: LoggingConfig,
}

/// Countdown intervals for the per-session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub no_reply_ms: u64,
    pub released_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallLogConfig {
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl TimerConfig {
    pub fn interval(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::NoReply => Duration::from_millis(self.no_reply_ms),
            TimerKind::Released => Duration::from_millis(self.released_ms),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            no_reply_ms: 15_000,
            released_ms: 5_000,
        }
    }
}

impl Default for CallLogConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| FsmError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timers.no_reply_ms, 15_000);
        assert_eq!(config.timers.released_ms, 5_000);
        assert_eq!(config.call_log.max_entries, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [timers]
            no_reply_ms = 30000
            "#,
        )
        .unwrap();

        assert_eq!(config.timers.no_reply_ms, 30_000);
        assert_eq!(config.timers.released_ms, 5_000);
        assert_eq!(
            config.timers.interval(TimerKind::NoReply),
            Duration::from_secs(30)
        );
        assert_eq!(
            config.timers.interval(TimerKind::Released),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("timers = 3");
        assert!(matches!(result, Err(FsmError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/callfsm.toml");
        assert!(matches!(result, Err(FsmError::Io(_))));
    }
}
