use crate::analysis::{AnalysisResult, Modality};
use serde::Serialize;

/// An analysis about to be persisted.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub user_id: Option<usize>,
    pub content_type: Modality,
    pub song_title: Option<String>,
    pub result: AnalysisResult,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: Option<usize>,
    pub content_type: Modality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_title: Option<String>,
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub is_public: bool,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

impl StoredAnalysis {
    pub fn is_owned_by(&self, user_id: usize) -> bool {
        self.user_id == Some(user_id)
    }
}
