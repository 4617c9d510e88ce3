//! Configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Env var naming the JSON config file
pub const CONFIG_ENV: &str = "ID_BENCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/id-bench.json";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Test data shape
    pub corpus: CorpusConfig,

    /// Scheduler settings
    pub measurement: MeasurementConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Number of identifiers in the corpus
    pub size: usize,
    /// Fixed RNG seed; `None` draws fresh identifiers every setup
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    pub warmup_iterations: u32,
    pub warmup_secs: u64,
    pub measurement_iterations: u32,
    pub measurement_secs: u64,
    /// Isolated child processes; 0 runs in the launcher process
    pub forks: u32,
    /// Measurement threads, each with its own fixture
    pub threads: usize,
    /// Substring filters on operation names; empty selects all
    pub include: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_output: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            size: 10,
            seed: None,
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: 5,
            warmup_secs: 10,
            measurement_iterations: 5,
            measurement_secs: 5,
            forks: 1,
            threads: 1,
            include: vec![],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl MeasurementConfig {
    pub fn warmup_time(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn measurement_time(&self) -> Duration {
        Duration::from_secs(self.measurement_secs)
    }

    /// Warmup plus measurement iterations
    pub fn total_iterations(&self) -> u32 {
        self.warmup_iterations + self.measurement_iterations
    }

    /// Thread count clamped to the available cores
    pub fn effective_threads(&self) -> usize {
        self.threads.clamp(1, num_cpus::get().max(1))
    }
}

impl Config {
    /// Load config from environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config_path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let config = if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.corpus.size < 2 {
            anyhow::bail!("corpus.size must be at least 2, got {}", self.corpus.size);
        }
        if self.measurement.measurement_iterations == 0 {
            anyhow::bail!("measurement.measurement_iterations must be non-zero");
        }
        if self.measurement.measurement_secs == 0 {
            anyhow::bail!("measurement.measurement_secs must be non-zero");
        }
        if self.measurement.threads == 0 {
            anyhow::bail!("measurement.threads must be non-zero");
        }
        Ok(())
    }
}
