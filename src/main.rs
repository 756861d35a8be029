use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auranic_server::analysis::{AnalysisOrchestrator, Persona};
use auranic_server::analysis_store::SqliteAnalysisStore;
use auranic_server::config::{AppConfig, CliConfig, FileConfig, ProviderSettings};
use auranic_server::llm::{GeminiProvider, OpenAIProvider, ScoringProvider};
use auranic_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use auranic_server::user::{SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding user.db and analysis.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Maximum accepted size of an uploaded image, in bytes.
    #[clap(long)]
    pub max_upload_bytes: Option<usize>,

    /// Timeout in seconds for a single scoring provider call.
    #[clap(long)]
    pub provider_timeout_sec: Option<u64>,

    /// Maximum number of entries the public feed returns.
    #[clap(long)]
    pub public_feed_max: Option<usize>,

    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[clap(long)]
    pub openai_model: Option<String>,

    #[clap(long)]
    pub openai_base_url: Option<String>,

    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[clap(long)]
    pub gemini_model: Option<String>,

    #[clap(long)]
    pub gemini_base_url: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            max_upload_bytes: self.max_upload_bytes,
            provider_timeout_sec: self.provider_timeout_sec,
            public_feed_max: self.public_feed_max,
            openai_api_key: self.openai_api_key.clone(),
            openai_model: self.openai_model.clone(),
            openai_base_url: self.openai_base_url.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            gemini_model: self.gemini_model.clone(),
            gemini_base_url: self.gemini_base_url.clone(),
        }
    }
}

fn log_provider(name: &str, settings: &ProviderSettings) {
    if settings.api_key.is_some() {
        info!("{} provider enabled with model {}", name, settings.model);
    } else {
        warn!("{} API key not set, its calls will fall through", name);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Opening user database at {:?}...", config.user_db_path());
    let user_store = Arc::new(SqliteUserStore::new(config.user_db_path())?);
    let user_manager = Arc::new(UserManager::new(user_store));

    info!("Opening analysis database at {:?}...", config.analysis_db_path());
    let analysis_store = Arc::new(SqliteAnalysisStore::new(config.analysis_db_path())?);

    log_provider("OpenAI", &config.openai);
    log_provider("Gemini", &config.gemini);
    let providers: Vec<Arc<dyn ScoringProvider>> = vec![
        Arc::new(OpenAIProvider::new(
            config.openai.base_url.clone(),
            config.openai.model.clone(),
            config.openai.api_key.clone(),
        )) as Arc<dyn ScoringProvider>,
        Arc::new(GeminiProvider::new(
            config.gemini.base_url.clone(),
            config.gemini.model.clone(),
            config.gemini.api_key.clone(),
        )) as Arc<dyn ScoringProvider>,
    ];
    let orchestrator = Arc::new(
        AnalysisOrchestrator::new(Persona::auranic(), providers)
            .with_provider_timeout(config.provider_timeout),
    );

    run_server(
        ServerConfig::from(&config),
        user_manager,
        analysis_store,
        orchestrator,
    )
    .await
}
