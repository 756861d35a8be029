mod file_config;

pub use file_config::{FileConfig, ProviderFileConfig};

use crate::llm::{gemini_defaults, openai_defaults};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PROVIDER_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_PUBLIC_FEED_MAX: usize = 50;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub provider_timeout_sec: Option<u64>,
    pub public_feed_max: Option<usize>,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
}

/// Connection settings of one scoring provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    fn resolve(
        file: Option<ProviderFileConfig>,
        cli_api_key: &Option<String>,
        cli_model: &Option<String>,
        cli_base_url: &Option<String>,
        defaults: (&str, &str),
    ) -> Self {
        let file = file.unwrap_or_default();
        let (default_base_url, default_model) = defaults;
        Self {
            api_key: file
                .api_key
                .or_else(|| cli_api_key.clone())
                .filter(|k| !k.trim().is_empty()),
            model: file
                .model
                .or_else(|| cli_model.clone())
                .unwrap_or_else(|| default_model.to_string()),
            base_url: file
                .base_url
                .or_else(|| cli_base_url.clone())
                .unwrap_or_else(|| default_base_url.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_upload_bytes: usize,
    pub provider_timeout: Duration,
    pub public_feed_max: usize,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let max_upload_bytes = file
            .max_upload_bytes
            .or(cli.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            bail!("max_upload_bytes must be greater than zero");
        }

        let provider_timeout_sec = file
            .provider_timeout_sec
            .or(cli.provider_timeout_sec)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SEC);
        if provider_timeout_sec == 0 {
            bail!("provider_timeout_sec must be greater than zero");
        }

        let public_feed_max = file
            .public_feed_max
            .or(cli.public_feed_max)
            .unwrap_or(DEFAULT_PUBLIC_FEED_MAX)
            .max(1);

        let openai = ProviderSettings::resolve(
            file.openai,
            &cli.openai_api_key,
            &cli.openai_model,
            &cli.openai_base_url,
            openai_defaults(),
        );
        let gemini = ProviderSettings::resolve(
            file.gemini,
            &cli.gemini_api_key,
            &cli.gemini_model,
            &cli.gemini_base_url,
            gemini_defaults(),
        );

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            max_upload_bytes,
            provider_timeout: Duration::from_secs(provider_timeout_sec),
            public_feed_max,
            openai,
            gemini,
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn analysis_db_path(&self) -> PathBuf {
        self.db_dir.join("analysis.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
