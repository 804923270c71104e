//! Queue configuration.

use crate::error::QueueError;
use serde::{Deserialize, Serialize};

/// Redemption window and on/off switch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Minimum delay between a request and its earliest fulfillment.
    #[serde(default = "default_window")]
    pub window_duration_secs: u64,

    /// Whether new requests are accepted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_window() -> u64 {
    86_400
}

fn default_enabled() -> bool {
    true
}

impl QueueConfig {
    pub fn new(window_duration_secs: u64, enabled: bool) -> Self {
        Self {
            window_duration_secs,
            enabled,
        }
    }

    pub fn validate(&self) -> Result<(), QueueError> {
        if self.window_duration_secs == 0 {
            return Err(QueueError::InvalidWindow);
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            window_duration_secs: default_window(),
            enabled: default_enabled(),
        }
    }
}
