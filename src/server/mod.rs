mod analysis_routes;
pub mod config;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod session;
pub mod state;

pub use analysis_routes::{detect_image_mime, resolve_feed_limit, DEFAULT_PUBLIC_FEED_LIMIT};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server, run_server_with_shutdown};
