//! Store configuration via `burrow.toml`
//!
//! A deployment keeps one config file next to its store file. On first open
//! the default file can be written with [`BurrowConfig::write_default_if_missing`];
//! to change settings, edit the file and reopen.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name placed next to the store file.
pub const CONFIG_FILE_NAME: &str = "burrow.toml";

/// Default maximum number of requests committed in one coalesced group.
pub const DEFAULT_BATCH_MAX_SIZE: usize = 1000;

/// Default time a partial group waits for more requests before committing.
pub const DEFAULT_BATCH_MAX_WAIT_MS: u64 = 10;

/// Commit durability requested from the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityLevel {
    /// Sync to disk before the commit returns
    #[default]
    Immediate,
    /// Persist eventually; a crash may lose the latest commits
    Eventual,
    /// No persistence guarantee until a later durable commit
    None,
}

impl DurabilityLevel {
    /// Parse the config-file spelling
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "immediate" => Ok(DurabilityLevel::Immediate),
            "eventual" => Ok(DurabilityLevel::Eventual),
            "none" => Ok(DurabilityLevel::None),
            other => Err(Error::Config(format!(
                "Invalid durability '{}'. Expected \"immediate\", \"eventual\" or \"none\".",
                other
            ))),
        }
    }
}

/// Write-coalescing settings, the `[batch]` section of `burrow.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Maximum requests per physical commit.
    #[serde(default = "default_batch_max_size")]
    pub max_size: usize,
    /// Milliseconds a partial group waits before it is committed.
    #[serde(default = "default_batch_max_wait_ms")]
    pub max_wait_ms: u64,
}

fn default_batch_max_size() -> usize {
    DEFAULT_BATCH_MAX_SIZE
}

fn default_batch_max_wait_ms() -> u64 {
    DEFAULT_BATCH_MAX_WAIT_MS
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_BATCH_MAX_SIZE,
            max_wait_ms: DEFAULT_BATCH_MAX_WAIT_MS,
        }
    }
}

impl BatchConfig {
    /// Maximum wait as a `Duration`
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Deployment configuration loaded from `burrow.toml`.
///
/// # Example
///
/// ```toml
/// # Give up opening after 2s if another process holds the store
/// lock_timeout_ms = 2000
/// durability = "immediate"
///
/// [batch]
/// max_size = 1000
/// max_wait_ms = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurrowConfig {
    /// How long opening waits for another process's file lock.
    /// Absent means wait until the lock is released.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
    /// Refuse every write transaction.
    #[serde(default)]
    pub read_only: bool,
    /// Commit durability: `"immediate"`, `"eventual"` or `"none"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Page cache size handed to the storage engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size_bytes: Option<usize>,
    /// Write-coalescing settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

fn default_durability_str() -> String {
    "immediate".to_string()
}

impl Default for BurrowConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: None,
            read_only: false,
            durability: default_durability_str(),
            cache_size_bytes: None,
            batch: BatchConfig::default(),
        }
    }
}

impl BurrowConfig {
    /// Parse the durability string.
    pub fn durability_level(&self) -> Result<DurabilityLevel> {
        DurabilityLevel::parse(&self.durability)
    }

    /// Lock wait bound, `None` meaning wait indefinitely.
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Check every field that has a constrained domain.
    pub fn validate(&self) -> Result<()> {
        self.durability_level()?;
        if self.batch.max_size == 0 {
            return Err(Error::Config("batch.max_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# burrowdb configuration
#
# How long opening waits for another process holding the store file (ms).
# Leave unset to wait until the lock is released.
# lock_timeout_ms = 2000

# Refuse all writes (for read replicas of a copied store file)
read_only = false

# Commit durability: "immediate" (default), "eventual" or "none"
#   "immediate" = fsync on every commit
#   "eventual"  = fsync deferred, a crash may lose the latest commits
durability = "immediate"

# cache_size_bytes = 67108864

[batch]
# Maximum logical writes per physical commit
max_size = 1000
# How long a partial group waits for more writes (ms)
max_wait_ms = 10
"#
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: BurrowConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
