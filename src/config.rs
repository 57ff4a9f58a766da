//! Miner configuration
//!
//! Loaded from a JSON file, then overridden by command-line flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default nonces per scan call
pub const DEFAULT_NONCE_SPAN: u32 = 0x0010_0000;

/// Default seconds between hashrate reports
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 5;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// Miner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Worker threads (0 = one per CPU core)
    pub threads: usize,
    /// Nonces per scan call before a worker re-checks its work
    pub nonce_span: u32,
    /// Seconds between hashrate reports
    pub report_interval_secs: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            nonce_span: DEFAULT_NONCE_SPAN,
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threads: Option<usize>,
    pub nonce_span: Option<u32>,
    pub report_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl MinerConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nonce_span == 0 {
            return Err(ConfigError::InvalidValue {
                field: "nonce_span",
                reason: "must be at least 1",
            });
        }
        if self.report_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report_interval_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Apply command-line values and re-validate
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(threads) = overrides.threads {
            self.threads = threads;
        }
        if let Some(span) = overrides.nonce_span {
            self.nonce_span = span;
        }
        if let Some(secs) = overrides.report_interval_secs {
            self.report_interval_secs = secs;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    /// Thread count with 0 resolved to the number of CPU cores
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.threads
        }
    }
}

/// Get the default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("xhash").join("config.json")
}

/// Get the default config file path
#[cfg(not(feature = "cli"))]
pub fn default_config_path() -> PathBuf {
    PathBuf::from("xhash.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("xhash-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = MinerConfig::load(&temp_path("absent.json")).unwrap();
        assert_eq!(config, MinerConfig::default());
        assert_eq!(config.nonce_span, 0x100000);
        assert_eq!(config.report_interval_secs, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("saved.json");
        let config = MinerConfig {
            threads: 3,
            nonce_span: 4096,
            report_interval_secs: 2,
            log_level: "debug".to_string(),
        };

        config.save(&path).unwrap();
        assert_eq!(MinerConfig::load(&path).unwrap(), config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: MinerConfig = serde_json::from_str(r#"{"threads": 2}"#).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.nonce_span, DEFAULT_NONCE_SPAN);
    }

    #[test]
    fn test_zero_span_rejected() {
        let result = MinerConfig::default().apply(ConfigOverrides {
            nonce_span: Some(0),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "nonce_span",
                ..
            })
        ));
    }

    #[test]
    fn test_overrides_win() {
        let config = MinerConfig::default()
            .apply(ConfigOverrides {
                threads: Some(6),
                log_level: Some("warn".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.threads, 6);
        assert_eq!(config.worker_threads(), 6);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.nonce_span, DEFAULT_NONCE_SPAN);
    }

    #[test]
    fn test_zero_threads_means_all_cores() {
        assert!(MinerConfig::default().worker_threads() >= 1);
    }
}
