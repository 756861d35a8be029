//! Persistence of completed analyses.

mod models;
mod schema;
mod sqlite_analysis_store;

pub use models::{NewAnalysis, StoredAnalysis};
pub use schema::ANALYSIS_VERSIONED_SCHEMAS;
pub use sqlite_analysis_store::SqliteAnalysisStore;

use anyhow::Result;

pub trait AnalysisStore: Send + Sync {
    /// Stores a normalized analysis and returns its generated id.
    fn create_analysis(&self, analysis: &NewAnalysis) -> Result<String>;

    /// Returns the analysis with the given id, or Ok(None) if it does not exist.
    fn get_analysis(&self, id: &str) -> Result<Option<StoredAnalysis>>;

    /// Returns all analyses owned by a user, newest first.
    fn get_user_analyses(&self, user_id: usize) -> Result<Vec<StoredAnalysis>>;

    /// Returns the most recent public analyses, newest first.
    fn get_public_analyses(&self, limit: usize) -> Result<Vec<StoredAnalysis>>;

    /// Sets the visibility flag. Returns the updated analysis, or Ok(None) if it does not exist.
    fn set_analysis_visibility(&self, id: &str, is_public: bool) -> Result<Option<StoredAnalysis>>;
}
