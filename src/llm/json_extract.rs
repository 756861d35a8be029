//! Pulls the analysis JSON object out of free-form model output.

use super::provider::LlmError;
use crate::analysis::RawAnalysis;
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS: [&str; 4] = ["auraScore", "rizzScore", "mysticTitle", "analysisText"];

/// Returns the first balanced `{...}` span of `text` that parses as a JSON object.
///
/// Braces inside string literals are ignored, so replies like
/// `Sure! {"mysticTitle": "the {chosen} one", ...}` are handled.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open) {
            if let Ok(Value::Object(map)) = serde_json::from_str(&text[open..=close]) {
                return Some(map);
            }
        }
        start = open + 1;
    }
    None
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a provider reply into a [`RawAnalysis`], checking that all four fields exist.
pub fn parse_raw_analysis(text: &str) -> Result<RawAnalysis, LlmError> {
    let object = match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => map,
        _ => extract_json_object(text).ok_or(LlmError::NoJsonObject)?,
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LlmError::MissingFields(missing));
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to read analysis fields: {}", e)))
}
