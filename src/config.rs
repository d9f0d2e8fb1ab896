//! Engine configuration loaded from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::catalog::NormalizerPolicy;

/// Tunable engine knobs with safe defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub normalizer: NormalizerPolicy,
    /// How often the tally pass rescans the vote store.
    pub tally_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerPolicy::default(),
            tally_interval: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Read `TOPDECK_*` overrides from the environment. Unparseable
    /// values keep the default and log a warning; startup never fails
    /// on configuration.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var("TOPDECK_TALLY_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.tally_interval = Duration::from_secs(secs),
                _ => warn!(%raw, "ignoring invalid TOPDECK_TALLY_INTERVAL_SECS"),
            }
        }
        if let Ok(raw) = env::var("TOPDECK_DROP_BASIC_LANDS") {
            match raw.parse::<bool>() {
                Ok(drop) => config.normalizer.drop_basic_lands = drop,
                Err(_) => warn!(%raw, "ignoring invalid TOPDECK_DROP_BASIC_LANDS"),
            }
        }
        if let Ok(lang) = env::var("TOPDECK_CANONICAL_LANG")
            && !lang.is_empty()
        {
            config.normalizer.canonical_lang = lang;
        }

        config
    }
}
