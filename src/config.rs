//! Engine-wide configuration: transposition table size, contempt, an
//! advisory thread count, and an opaque tablebase path, with the bounds
//! checking the `setOption` control surface relies on to report
//! `ResourceDegraded` instead of failing outright.

use std::fmt;

/// Tunable engine-wide options, independent of any particular search or
/// position.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub contempt_cp: i32,
    pub threads: usize,
    pub tablebase_path: Option<String>,
}

const MIN_HASH_MB: usize = 1;
const MAX_HASH_MB: usize = 4096;
const FALLBACK_HASH_MB: usize = 16;

/// A configuration request that could not be honored as given. The config
/// is still left in a usable state (the fallback is applied) rather than
/// rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    HashSizeOutOfRange { requested_mb: usize, applied_mb: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HashSizeOutOfRange { requested_mb, applied_mb } => {
                write!(f, "hash size {requested_mb} MB out of range [{MIN_HASH_MB}, {MAX_HASH_MB}], falling back to {applied_mb} MB")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { hash_mb: FALLBACK_HASH_MB, contempt_cp: 0, threads: 1, tablebase_path: None }
    }
}

impl EngineConfig {
    /// Set the hash table size, clamping out-of-range requests to the
    /// fallback instead of failing outright. The fallback is still applied
    /// when this returns `Err`.
    pub fn set_hash_mb(&mut self, requested_mb: usize) -> Result<(), ConfigError> {
        if (MIN_HASH_MB..=MAX_HASH_MB).contains(&requested_mb) {
            self.hash_mb = requested_mb;
            Ok(())
        } else {
            self.hash_mb = FALLBACK_HASH_MB;
            Err(ConfigError::HashSizeOutOfRange { requested_mb, applied_mb: FALLBACK_HASH_MB })
        }
    }

    pub fn set_contempt_cp(&mut self, contempt_cp: i32) {
        self.contempt_cp = contempt_cp;
    }

    /// Threads are advisory: this crate never parallelizes tree search, so
    /// any value is accepted and simply recorded for the caller to read back.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads.max(1);
    }

    pub fn set_tablebase_path(&mut self, path: Option<String>) {
        self.tablebase_path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hash_is_within_bounds() {
        let config = EngineConfig::default();
        assert!((MIN_HASH_MB..=MAX_HASH_MB).contains(&config.hash_mb));
    }

    #[test]
    fn out_of_range_hash_is_degraded_to_fallback() {
        let mut config = EngineConfig::default();
        assert!(config.set_hash_mb(0).is_err());
        assert_eq!(config.hash_mb, FALLBACK_HASH_MB);
        assert!(config.set_hash_mb(MAX_HASH_MB + 1).is_err());
        assert_eq!(config.hash_mb, FALLBACK_HASH_MB);
    }

    #[test]
    fn in_range_hash_is_accepted_unchanged() {
        let mut config = EngineConfig::default();
        assert!(config.set_hash_mb(64).is_ok());
        assert_eq!(config.hash_mb, 64);
    }

    #[test]
    fn threads_are_floored_at_one() {
        let mut config = EngineConfig::default();
        config.set_threads(0);
        assert_eq!(config.threads, 1);
    }
}
