use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub provider_timeout_sec: Option<u64>,
    pub public_feed_max: Option<usize>,

    // Provider sections
    pub openai: Option<ProviderFileConfig>,
    pub gemini: Option<ProviderFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProviderFileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            db_dir = "/data"
            port = 4000
            logging_level = "headers"
            max_upload_bytes = 1048576
            provider_timeout_sec = 12

            [openai]
            api_key = "sk-test"
            model = "gpt-4o-mini"

            [gemini]
            base_url = "http://localhost:9999/v1beta"
            "#,
        )
        .unwrap();

        assert_eq!(config.db_dir.as_deref(), Some("/data"));
        assert_eq!(config.port, Some(4000));
        assert_eq!(config.max_upload_bytes, Some(1048576));
        assert_eq!(config.provider_timeout_sec, Some(12));
        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(openai.model.as_deref(), Some("gpt-4o-mini"));
        assert!(openai.base_url.is_none());
        assert_eq!(
            config.gemini.unwrap().base_url.as_deref(),
            Some("http://localhost:9999/v1beta")
        );
    }

    #[test]
    fn empty_file_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.db_dir.is_none());
        assert!(config.openai.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/auranic.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
