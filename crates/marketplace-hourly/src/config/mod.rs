use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ingest::InputFiles;
use crate::output::OUTPUT_FILE;

/// Distinguishes runtime behavior for different stages of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log filter used when `APP_LOG_LEVEL` is unset. Test runs stay quiet.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Self::Test => "warn",
            Self::Development | Self::Production => "info",
        }
    }

    /// Production runs are usually scraped by a scheduler's log collector, so
    /// they keep the full line format with module targets.
    pub fn log_style(&self) -> LogStyle {
        match self {
            Self::Production => LogStyle::Full,
            Self::Development | Self::Test => LogStyle::Compact,
        }
    }
}

/// Top-level configuration for the report job.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("HOURLY_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let data = DataConfig::new(data_dir)?;

        let log_level = env::var("APP_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        Ok(Self {
            environment,
            data,
            telemetry: TelemetryConfig {
                log_level,
                style: environment.log_style(),
            },
        })
    }

    /// Replaces the configured data directory, e.g. from a CLI flag.
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Result<Self, ConfigError> {
        self.data = DataConfig::new(dir)?;
        Ok(self)
    }
}

/// The directory holding the three input logs and receiving the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    dir: PathBuf,
}

impl DataConfig {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn inputs(&self) -> InputFiles {
        InputFiles::in_dir(&self.dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE)
    }
}

/// Line format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// Single-line events without module targets.
    Compact,
    /// Default `fmt` layout including module targets.
    Full,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub style: LogStyle,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDataDir => write!(f, "HOURLY_DATA_DIR must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
