use serde::{Deserialize, Serialize};

/// Fixed per-operation timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Socket dial (valid range: 1-60).
    pub dial_secs: u32,
    /// Each socket read (valid range: 5-600).
    pub read_secs: u32,
    /// Each socket write (valid range: 1-60).
    pub write_secs: u32,
    /// Keep-alive period (valid range: 1-60).
    pub keep_alive_period_secs: u32,
    /// Session creation and bypass HTTP requests (valid range: 1-300).
    pub http_secs: u32,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            dial_secs: 10,
            read_secs: 60,
            write_secs: 10,
            keep_alive_period_secs: 6,
            http_secs: 30,
        }
    }
}
