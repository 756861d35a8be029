//! The analysis pipeline: prompt, providers in priority order, offline fallback, normalization.

use super::fallback::FallbackGenerator;
use super::normalizer::normalize;
use super::prompt::{build_prompt, Persona, Prompt, PromptError};
use super::types::{AnalysisRequest, AnalysisResult, InputError, RawAnalysis};
use crate::llm::{LlmError, ScoringProvider};
use crate::server::metrics;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    BuildingPrompt,
    TryingPrimary,
    TryingSecondary,
    GeneratingFallback,
    Normalizing,
    Done,
    Failed,
}

/// Where the final result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    Provider(String),
    Fallback,
}

impl ResultSource {
    pub fn label(&self) -> &str {
        match self {
            ResultSource::Provider(name) => name,
            ResultSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: ResultSource,
    /// Every stage the pipeline went through, in order.
    pub stages: Vec<PipelineStage>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Could not build prompt: {0}")]
    Prompt(#[from] PromptError),
}

pub struct AnalysisOrchestrator {
    persona: Persona,
    providers: Vec<Arc<dyn ScoringProvider>>,
    fallback: FallbackGenerator,
    provider_timeout: Duration,
}

impl AnalysisOrchestrator {
    /// `providers` are tried in order; the first is the primary, the second the secondary.
    pub fn new(persona: Persona, providers: Vec<Arc<dyn ScoringProvider>>) -> Self {
        Self {
            persona,
            providers,
            fallback: FallbackGenerator,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    fn stage_for(index: usize) -> PipelineStage {
        match index {
            0 => PipelineStage::TryingPrimary,
            _ => PipelineStage::TryingSecondary,
        }
    }

    async fn try_provider(
        &self,
        provider: &dyn ScoringProvider,
        prompt: &Prompt,
    ) -> Result<RawAnalysis, LlmError> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.provider_timeout, provider.attempt_analysis(prompt))
            .await
            .unwrap_or(Err(LlmError::Timeout));
        metrics::record_provider_call(provider.name(), start.elapsed());
        result
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        let modality = request.modality();
        let mut stages = vec![PipelineStage::BuildingPrompt];

        let prompt = match build_prompt(&self.persona, request) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(%modality, stage = ?PipelineStage::Failed, error = %e, "Could not build prompt");
                return Err(e.into());
            }
        };

        let mut raw_and_source = None;
        for (index, provider) in self.providers.iter().enumerate() {
            stages.push(Self::stage_for(index));
            match self.try_provider(provider.as_ref(), &prompt).await {
                Ok(raw) => {
                    debug!(provider = provider.name(), %modality, "Provider returned an analysis");
                    raw_and_source = Some((raw, ResultSource::Provider(provider.name().to_string())));
                    break;
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        model = provider.model(),
                        kind = e.kind(),
                        error = %e,
                        "Provider failed, falling through"
                    );
                    metrics::record_provider_failure(provider.name(), e.kind());
                }
            }
        }

        let (raw, source) = match raw_and_source {
            Some(found) => found,
            None => {
                stages.push(PipelineStage::GeneratingFallback);
                let generated = self.fallback.generate(request);
                (RawAnalysis::from(&generated), ResultSource::Fallback)
            }
        };

        stages.push(PipelineStage::Normalizing);
        let result = normalize(&raw);
        stages.push(PipelineStage::Done);

        info!(
            %modality,
            %source,
            aura = result.aura_score,
            rizz = result.rizz_score,
            "Analysis completed"
        );
        metrics::record_analysis(modality.as_str(), source.label());

        Ok(AnalysisOutcome {
            result,
            source,
            stages,
        })
    }
}
