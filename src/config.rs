//! Harness configuration read from the environment.
//!
//! The command line carries only the entry-point name, so the few tunables
//! live in `SUTRA_*` variables.

use crate::errors::{
    unspanned, ErrorKind, ErrorReporting, ErrorSite, Phase, SourceContext, SutraError,
};

pub const MAX_DEPTH_VAR: &str = "SUTRA_MAX_DEPTH";
pub const SEED_VAR: &str = "SUTRA_SEED";
pub const LOG_VAR: &str = "SUTRA_LOG";

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// CLI depth limit. The CLI evaluates on a large-stack thread, so it can go
/// well past `runtime::eval::DEFAULT_MAX_DEPTH`.
pub const CLI_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Maximum lambda call depth before `RecursionLimit`.
    pub max_depth: usize,
    /// Seed for the template world's PRNG; `None` draws from entropy.
    pub seed: Option<u64>,
    /// `EnvFilter` directive for the stderr log.
    pub log_filter: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_depth: CLI_MAX_DEPTH,
            seed: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, SutraError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SutraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_DEPTH_VAR) {
            config.max_depth = match raw.trim().parse::<usize>() {
                Ok(0) => return Err(invalid(MAX_DEPTH_VAR, &raw, "must be at least 1")),
                Ok(depth) => depth,
                Err(e) => return Err(invalid(MAX_DEPTH_VAR, &raw, &e.to_string())),
            };
        }

        if let Some(raw) = lookup(SEED_VAR) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(SEED_VAR, &raw, &e.to_string()))?;
            config.seed = Some(seed);
        }

        if let Some(raw) = lookup(LOG_VAR) {
            config.log_filter = raw.trim().to_string();
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> SutraError {
    let site = ErrorSite::new(
        SourceContext::from_file("environment", format!("{key}={value}")),
        Phase::Config,
    );
    site.report(
        ErrorKind::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        },
        unspanned(),
    )
}
