// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::brand::OverlayParams;
use crate::constants::{
    DEFAULT_JOB_MAX_ENTRIES, DEFAULT_JOB_TTL_SECS, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DIR,
};

pub mod assets;
pub mod engine;

pub use assets::{AssetsConfig, OrientationDirs};
pub use engine::EngineConfig;

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_job_ttl_secs() -> u64 {
    DEFAULT_JOB_TTL_SECS
}

fn default_job_max_entries() -> u64 {
    DEFAULT_JOB_MAX_ENTRIES
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Overlay parameters for brands with no stored record
    #[serde(default)]
    pub overlay: OverlayParams,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub jobs: JobsConfig,

    /// Directory rendered files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Brand registry file; convention-only resolution when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: AssetsConfig::default(),
            overlay: OverlayParams::default(),
            engine: EngineConfig::default(),
            jobs: JobsConfig::default(),
            output_dir: default_output_dir(),
            brands_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Job record retention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Records are evicted this many seconds after insertion (default: 24h)
    #[serde(default = "default_job_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum records kept (default: 10000)
    #[serde(default = "default_job_max_entries")]
    pub max_entries: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_job_ttl_secs(),
            max_entries: default_job_max_entries(),
        }
    }
}

impl JobsConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `brandmark=debug` (RUST_LOG wins)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        // An empty document means "all defaults"
        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.assets.validate()?;
        self.overlay
            .validate()
            .map_err(|e| format!("overlay: {}", e))?;
        self.engine.validate()?;

        if self.jobs.ttl_secs == 0 {
            return Err("jobs.ttl_secs must be > 0 seconds".to_string());
        }
        if self.jobs.max_entries == 0 {
            return Err("jobs.max_entries must be at least 1".to_string());
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir cannot be empty".to_string());
        }

        if self.logging.level.trim().is_empty() {
            return Err("logging.level cannot be empty".to_string());
        }

        Ok(())
    }
}
