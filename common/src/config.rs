// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::report::DEFAULT_JOB_GROUP;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub engine: EngineSettings,
    pub intake: IntakeSettings,
    pub report: ReportSettings,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSettings {
    /// Path to the fact bundle produced by the upstream extractor
    pub facts_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub format: ReportFormat,
    pub output_path: String,
    /// Scheduler group stamped on generated job skeletons
    pub job_group: String,
}

/// Output format for the report sink
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Text,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Prometheus exporter port; the exporter stays off when unset
    pub metrics_port: Option<u16>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults -> file -> env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.engine.concurrency == 0 {
            return Err("Engine concurrency must be greater than 0".to_string());
        }

        if self.intake.facts_path.is_empty() {
            return Err("Intake facts_path cannot be empty".to_string());
        }

        if self.report.output_path.is_empty() {
            return Err("Report output_path cannot be empty".to_string());
        }
        if self.report.job_group.is_empty() {
            return Err("Report job_group cannot be empty".to_string());
        }

        if self.observability.metrics_port == Some(0) {
            return Err("Metrics port must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings { concurrency: 8 },
            intake: IntakeSettings {
                facts_path: "fixtures/sample_facts.json".to_string(),
            },
            report: ReportSettings {
                format: ReportFormat::Json,
                output_path: "reports/migration_report.jsonl".to_string(),
                job_group: DEFAULT_JOB_GROUP.to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_port: None,
            },
        }
    }
}
