//! Aura and rizz analysis of images and song titles.
//!
//! Requests go through [`AnalysisOrchestrator`], which always returns a normalized
//! [`AnalysisResult`] unless the request itself is malformed.

mod fallback;
mod normalizer;
mod orchestrator;
mod prompt;
mod types;

pub use fallback::{digest, FallbackGenerator};
pub use normalizer::{normalize, PLACEHOLDER_TEXT, PLACEHOLDER_TITLE};
pub use orchestrator::{
    AnalysisError, AnalysisOrchestrator, AnalysisOutcome, PipelineStage, ResultSource,
    DEFAULT_PROVIDER_TIMEOUT,
};
pub use prompt::{build_prompt, ImagePayload, Persona, Prompt, PromptError, JSON_SHAPE_INSTRUCTION};
pub use types::{AnalysisRequest, AnalysisResult, ImageMimeType, InputError, Modality, RawAnalysis};
