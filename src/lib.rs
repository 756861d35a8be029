//! Auranic Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod analysis;
pub mod analysis_store;
pub mod config;
pub mod llm;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisOrchestrator, AnalysisRequest, AnalysisResult, Persona};
pub use analysis_store::{AnalysisStore, SqliteAnalysisStore};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserManager, UserStore};
