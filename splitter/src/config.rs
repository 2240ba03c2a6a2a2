//! Splitter configuration with TOML file support.

use serde::{Deserialize, Serialize};

use fundsplit_types::{Amount, MIN_INIT_AMOUNT};
use fundsplit_utils::LogFormat;

use crate::SplitterError;

/// What happens to the initial funding of a new splitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialFunding {
    /// Held as the account's reserve, never distributed.
    #[default]
    Reserve,
    /// Split among the serials like any other deposit.
    Distribute,
}

/// Configuration for a [`SplitterRegistry`](crate::SplitterRegistry).
///
/// Can be loaded from a TOML file via [`SplitterConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Smallest accepted initial funding. Equal amounts pass.
    #[serde(default = "default_min_init_amount")]
    pub min_init_amount: Amount,

    #[serde(default)]
    pub initial_funding: InitialFunding,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_min_init_amount() -> Amount {
    MIN_INIT_AMOUNT
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SplitterConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, SplitterError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SplitterError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SplitterError> {
        toml::from_str(s).map_err(|e| SplitterError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("SplitterConfig is always serializable to TOML")
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            min_init_amount: default_min_init_amount(),
            initial_funding: InitialFunding::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
