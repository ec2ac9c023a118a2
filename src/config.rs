use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// How construction treats consecutive words that share a `start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStartPolicy {
    /// Accept; a timestamp covered by several same-start words resolves to the
    /// lowest index among them.
    #[default]
    LowestIndexWins,
    Reject,
}

impl DuplicateStartPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowestIndexWins => "lowest_index_wins",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Neighbours examined on each side of the cached cursor before a full
    /// binary search.
    pub locality_probe_span: usize,
    pub duplicate_start_policy: DuplicateStartPolicy,
    /// Playback cadence used by simulations (16 ms is roughly 60 Hz).
    pub frame_interval_ms: u64,
    pub lookup_interval_ms: u64,
}

impl EngineConfig {
    pub const DEFAULT_LOCALITY_PROBE_SPAN: usize = 2;
    pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;
    pub const DEFAULT_LOOKUP_INTERVAL_MS: u64 = 10;

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            context: "read engine config",
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            context: "parse engine config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::invalid("frame_interval_ms must be > 0"));
        }
        if self.lookup_interval_ms == 0 {
            return Err(ConfigError::invalid("lookup_interval_ms must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locality_probe_span: Self::DEFAULT_LOCALITY_PROBE_SPAN,
            duplicate_start_policy: DuplicateStartPolicy::default(),
            frame_interval_ms: Self::DEFAULT_FRAME_INTERVAL_MS,
            lookup_interval_ms: Self::DEFAULT_LOOKUP_INTERVAL_MS,
        }
    }
}
