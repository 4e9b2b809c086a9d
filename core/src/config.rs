//! Tunables for a try-it-out session.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! gives the stock behavior: one-second settle and failure delays and a
//! 10,000-character display limit.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TryOutError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const MAX_CONTENT_LENGTH: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TryOutConfig {
    /// Minimum time the pending flag stays up after the transport completes.
    pub settle_delay_ms: u64,
    /// Delay before a transport failure is published.
    pub failure_delay_ms: u64,
    /// Longest payload, in characters, shown as-is.
    pub max_content_length: usize,
    /// `Content-Type` used when neither the active media type nor the caller
    /// provides one.
    pub default_content_type: String,
}

impl Default for TryOutConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            failure_delay_ms: 1000,
            max_content_length: MAX_CONTENT_LENGTH,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl TryOutConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, TryOutError> {
        let config: TryOutConfig =
            toml::from_str(raw).map_err(|e| TryOutError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TryOutError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TryOutError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), TryOutError> {
        if self.max_content_length == 0 {
            return Err(TryOutError::InvalidConfig(
                "max_content_length must be greater than zero".to_string(),
            ));
        }
        if self.default_content_type.trim().is_empty() {
            return Err(TryOutError::InvalidConfig(
                "default_content_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }
}
