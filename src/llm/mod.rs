//! Scoring providers backed by hosted LLM APIs.
//!
//! Each provider performs exactly one round trip per call and never retries;
//! ordering and fallthrough live in [`crate::analysis::AnalysisOrchestrator`].

mod gemini;
mod json_extract;
mod openai;
mod provider;

pub use gemini::GeminiProvider;
pub use json_extract::{extract_json_object, parse_raw_analysis, REQUIRED_FIELDS};
pub use openai::OpenAIProvider;
pub use provider::{LlmError, ScoringProvider};

/// Default `(base_url, model)` for the OpenAI provider.
pub fn openai_defaults() -> (&'static str, &'static str) {
    (openai::DEFAULT_BASE_URL, openai::DEFAULT_MODEL)
}

/// Default `(base_url, model)` for the Gemini provider.
pub fn gemini_defaults() -> (&'static str, &'static str) {
    (gemini::DEFAULT_BASE_URL, gemini::DEFAULT_MODEL)
}
