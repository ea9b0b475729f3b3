//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::offset::GameVersion;
use crate::party::layout::party;

/// Locates the roster pointer in the game's code
pub const PARTY_SIGNATURE: &str = "48 ? ? * * * * 48 89 74 24 ? b2";

/// Captures the distance from the live roster to the replay roster
pub const REPLAY_SIGNATURE: &str = "74 ? f6 05 ? ? ? ? ? 48 ? ? * * * * 75";

/// Settings for one attach session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Use this build instead of probing the target
    pub version: Option<GameVersion>,
    /// Member slots built per roster
    pub roster_capacity: usize,
    pub party_signature: String,
    pub replay_signature: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: None,
            roster_capacity: party::CAPACITY,
            party_signature: PARTY_SIGNATURE.to_string(),
            replay_signature: REPLAY_SIGNATURE.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for SessionConfig
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    version: Option<GameVersion>,
    roster_capacity: Option<usize>,
    party_signature: Option<String>,
    replay_signature: Option<String>,
}

impl SessionConfigBuilder {
    /// Pin the game version
    pub fn version(mut self, version: GameVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn roster_capacity(mut self, capacity: usize) -> Self {
        self.roster_capacity = Some(capacity);
        self
    }

    pub fn party_signature<S: Into<String>>(mut self, pattern: S) -> Self {
        self.party_signature = Some(pattern.into());
        self
    }

    pub fn replay_signature<S: Into<String>>(mut self, pattern: S) -> Self {
        self.replay_signature = Some(pattern.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> SessionConfig {
        let default = SessionConfig::default();
        SessionConfig {
            version: self.version.or(default.version),
            roster_capacity: self.roster_capacity.unwrap_or(default.roster_capacity),
            party_signature: self.party_signature.unwrap_or(default.party_signature),
            replay_signature: self.replay_signature.unwrap_or(default.replay_signature),
        }
    }
}
