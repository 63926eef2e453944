use cadence_core::rrule::DecodeMode;
use cadence_core::tracker;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory holding the task files
    pub vault: PathBuf,
    /// Fail on unreadable recurrence rules instead of guessing
    pub strict_rrule: bool,
    /// Occurrences shown by `preview`
    pub preview_count: usize,
    pub materialization: MaterializationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: PathBuf::from("."),
            strict_rrule: false,
            preview_count: 5,
            materialization: MaterializationConfig::default(),
        }
    }
}

/// Configuration for occurrence materialization
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MaterializationConfig {
    /// Whether to activate occurrences missed while nothing was running
    pub enable_catchup: bool,
    /// How far back catch-up looks (days)
    pub catchup_days: u32,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        let core = tracker::MaterializationConfig::default();
        Self {
            enable_catchup: core.enable_catchup,
            catchup_days: core.catchup_days,
        }
    }
}

impl Config {
    /// Reads `cadence.toml` from the working directory, then `CADENCE_*`
    /// environment variables (`CADENCE_MATERIALIZATION__CATCHUP_DAYS=3`).
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("cadence.toml"))
            .merge(Env::prefixed("CADENCE_").split("__"))
    }

    pub fn decode_mode(&self) -> DecodeMode {
        if self.strict_rrule {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        }
    }

    pub fn materialization_config(&self) -> tracker::MaterializationConfig {
        tracker::MaterializationConfig {
            decode_mode: self.decode_mode(),
            enable_catchup: self.materialization.enable_catchup,
            catchup_days: self.materialization.catchup_days,
        }
    }
}
