//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod client;
mod system;
mod timeouts;

pub use client::*;
pub use system::*;
pub use timeouts::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatHubConfig {
    pub client: ClientSection,
    pub timeouts: TimeoutsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
