//! Configuration of the scenarios.
//!
//! Loaded in priority order:
//! 1. Environment variables (`CDCFLOW_OUTPUT_DIR`, `CDCFLOW_CYCLES`, `CDCFLOW_SEED`)
//! 2. Project-local config file (`./cdcflow.toml`)
//! 3. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! output_dir = "build"
//! cycles = 400
//! seed = 7
//!
//! [pulse]
//! trigger_period = 10
//! output_period = 27
//!
//! [reader]
//! n_cycles_per_word = 4
//! buffer_n_words = 2
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cdcflow_std::ReaderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project-local config file.
pub const CONFIG_FILE: &str = "cdcflow.toml";

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file system error on {path}: {error:?}")]
    Fs { path: PathBuf, error: io::Error },

    #[error("failed to parse {path}: {error}")]
    Parse { path: PathBuf, error: toml::de::Error },

    #[error("environment variable {name} has an invalid value `{value}`")]
    Env { name: &'static str, value: String },

    #[error("{field} should be a probability in [0, 1], found {value}")]
    Invalid { field: &'static str, value: f64 },
}

/// Bit synchronizer scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BitConfig {
    /// Period of the clock driving the flags.
    pub source_period: u64,
    /// Period of the synchronizing clock.
    pub period: u64,
    /// Number of flags.
    pub n_signals: usize,
    /// Probability that a flag toggles on a source edge.
    pub toggle_probability: f64,
}

impl Default for BitConfig {
    fn default() -> Self { Self { source_period: 13, period: 10, n_signals: 4, toggle_probability: 0.2 } }
}

/// Pulse synchronizer scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    /// Period of the trigger clock.
    pub trigger_period: u64,
    /// Period of the output clock.
    pub output_period: u64,
    /// Probability of a trigger on a trigger edge.
    pub trigger_probability: f64,
}

impl Default for PulseConfig {
    fn default() -> Self { Self { trigger_period: 10, output_period: 27, trigger_probability: 0.1 } }
}

/// FIFO feeding the paced reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FifoConfig {
    /// Period of the write clock.
    pub write_period: u64,
    /// Period of the read clock.
    pub read_period: u64,
    /// Capacity in words.
    pub depth: usize,
}

impl Default for FifoConfig {
    fn default() -> Self { Self { write_period: 41, read_period: 10, depth: 16 } }
}

/// Scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory receiving one VCD file per scenario.
    pub output_dir: PathBuf,
    /// Cycles of the consuming clock simulated per scenario.
    pub cycles: u64,
    /// Seed of the random stimulus.
    pub seed: u64,
    /// Bit synchronizer scenario.
    pub bit: BitConfig,
    /// Pulse synchronizer scenario.
    pub pulse: PulseConfig,
    /// FIFO of the paced reader scenario.
    pub fifo: FifoConfig,
    /// Paced reader.
    pub reader: ReaderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("build"),
            cycles: 400,
            seed: 0,
            bit: BitConfig::default(),
            pulse: PulseConfig::default(),
            fifo: FifoConfig::default(),
            reader: ReaderConfig::new(4, 2),
        }
    }
}

impl Config {
    /// Loads the configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::load_from_file(Path::new(CONFIG_FILE))? {
            Some(config) => config,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        log::debug!("loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Loads the file at `path`, or `None` if it does not exist.
    pub fn load_from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|error| ConfigError::Fs { path: path.to_path_buf(), error })?;
        let config = toml::from_str(&content).map_err(|error| ConfigError::Parse { path: path.to_path_buf(), error })?;
        log::info!("loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Checks the values that the scenarios cannot reject themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in
            [("bit.toggle_probability", self.bit.toggle_probability), ("pulse.trigger_probability", self.pulse.trigger_probability)]
        {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    /// Overrides fields with the variables returned by `var`.
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where F: Fn(&str) -> Option<String> {
        if let Some(path) = var("CDCFLOW_OUTPUT_DIR") {
            log::info!("using CDCFLOW_OUTPUT_DIR from environment: {}", path);
            self.output_dir = PathBuf::from(path);
        }
        if let Some(value) = var("CDCFLOW_CYCLES") {
            self.cycles = value.parse().map_err(|_| ConfigError::Env { name: "CDCFLOW_CYCLES", value })?;
            log::info!("using CDCFLOW_CYCLES from environment: {}", self.cycles);
        }
        if let Some(value) = var("CDCFLOW_SEED") {
            self.seed = value.parse().map_err(|_| ConfigError::Env { name: "CDCFLOW_SEED", value })?;
            log::info!("using CDCFLOW_SEED from environment: {}", self.seed);
        }
        Ok(())
    }
}
