//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Platform config file (`config.toml` in the skimdupe config directory)
//! 3. A file passed with `--config`
//! 4. `SKIMDUPE_*` environment variables (e.g. `SKIMDUPE_CHUNK_SIZE=4096`)
//! 5. Command-line flags, applied by [`crate::cli::ScanArgs::apply_to`]
//!
//! # Example
//!
//! ```toml
//! chunk_size = 4096
//! skip_interval = 512
//! skip_policy = "boundary"
//! algorithm = "blake3"
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::FinderConfig;
use crate::scanner::chunks::{
    DEFAULT_CHUNK_SIZE, DEFAULT_SKIP_INTERVAL, DEFAULT_SKIP_SIZE, MAX_CHUNK_SIZE,
};
use crate::scanner::{FingerprintAlgorithm, SamplingConfig, SkipPolicy, WalkerConfig};

/// Prefix of the environment variables read into [`Config`].
pub const ENV_PREFIX: &str = "SKIMDUPE_";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be parsed or extracted.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The file given with `--config` does not exist.
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    /// `chunk_size` was 0.
    #[error("chunk_size must be greater than 0")]
    ZeroChunkSize,

    /// `chunk_size` exceeded the largest supported chunk.
    #[error("chunk_size ({size}) is larger than the maximum of {max} bytes")]
    ChunkSizeTooLarge {
        /// Configured chunk size
        size: usize,
        /// Largest accepted value
        max: usize,
    },

    /// `io_threads` was 0.
    #[error("io_threads must be greater than 0")]
    ZeroIoThreads,

    /// `min_size` is larger than `max_size`.
    #[error("min_size ({min}) is larger than max_size ({max})")]
    InvalidSizeRange {
        /// Configured minimum
        min: u64,
        /// Configured maximum
        max: u64,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chunk size in bytes for all reads
    pub chunk_size: usize,
    /// Chunks between skips (0 reads every chunk)
    pub skip_interval: u64,
    /// Chunks jumped over per skip
    pub skip_size: u64,
    /// When the sampled reader skips
    pub skip_policy: SkipPolicy,
    /// Digest used for fingerprints
    pub algorithm: FingerprintAlgorithm,
    /// Worker threads for fingerprinting
    pub io_threads: usize,
    /// Follow symbolic links during the walk
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from the walk
    pub ignore_patterns: Vec<String>,
    /// Smallest file size considered
    pub min_size: Option<u64>,
    /// Largest file size considered
    pub max_size: Option<u64>,
    /// Byte-compare every reported pair
    pub verify: bool,
    /// Abort on the first per-file error
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_interval: DEFAULT_SKIP_INTERVAL,
            skip_size: DEFAULT_SKIP_SIZE,
            skip_policy: SkipPolicy::default(),
            algorithm: FingerprintAlgorithm::default(),
            io_threads: 4,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            min_size: None,
            max_size: None,
            verify: false,
            strict: false,
        }
    }
}

impl Config {
    /// Load and validate the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `custom` does not exist, a layer fails to
    /// parse, or the merged values are invalid.
    pub fn load(custom: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = custom {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }

        let config: Self = Self::figment(custom).extract()?;
        config.validate()?;

        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// The figment behind [`Config::load`], without validation.
    #[must_use]
    pub fn figment(custom: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = custom {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path of the platform config file, if a home directory is known.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "skimdupe", "skimdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::ChunkSizeTooLarge {
                size: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroIoThreads);
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::InvalidSizeRange { min, max });
            }
        }
        Ok(())
    }

    /// Sampling parameters for the hasher.
    #[must_use]
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_skip_interval(self.skip_interval)
            .with_skip_size(self.skip_size)
            .with_policy(self.skip_policy)
    }

    /// Walker settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            min_size: self.min_size,
            max_size: self.max_size,
            ignore_patterns: self.ignore_patterns.clone(),
        }
    }

    /// Finder configuration without shutdown flag or progress callback.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_strict(self.strict)
            .with_verify(self.verify)
            .with_sampling(self.sampling())
            .with_algorithm(self.algorithm)
            .with_walker_config(self.walker_config())
    }
}
