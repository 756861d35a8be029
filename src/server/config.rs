use super::RequestsLoggingLevel;
use crate::config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PUBLIC_FEED_MAX};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub frontend_dir_path: Option<String>,
    /// Upper bound for request bodies, image uploads included.
    pub max_upload_bytes: usize,
    pub public_feed_max: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            frontend_dir_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_feed_max: DEFAULT_PUBLIC_FEED_MAX,
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            metrics_port: config.metrics_port,
            frontend_dir_path: config.frontend_dir_path.clone(),
            max_upload_bytes: config.max_upload_bytes,
            public_feed_max: config.public_feed_max,
        }
    }
}
