//! Turns any [`RawAnalysis`] into a valid [`AnalysisResult`].

use super::types::{AnalysisResult, RawAnalysis};
use serde_json::Value;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 100;
pub const DEFAULT_SCORE: u8 = 50;

pub const PLACEHOLDER_TITLE: &str = "Unreadable Aura";
pub const PLACEHOLDER_TEXT: &str =
    "The vibes came through a little scrambled this time, but the energy is still there. Try again for a clearer reading.";

pub fn normalize(raw: &RawAnalysis) -> AnalysisResult {
    AnalysisResult {
        aura_score: normalize_score(&raw.aura_score),
        rizz_score: normalize_score(&raw.rizz_score),
        mystic_title: normalize_text(&raw.mystic_title, PLACEHOLDER_TITLE),
        analysis_text: normalize_text(&raw.analysis_text, PLACEHOLDER_TEXT),
    }
}

fn normalize_score(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => {
            n.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
        }
        _ => DEFAULT_SCORE,
    }
}

fn normalize_text(value: &Value, placeholder: &str) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        _ => placeholder.to_string(),
    }
}
