//! Value types flowing through the analysis pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// What kind of content is being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Song,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Image => "image",
            Modality::Song => "song",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Modality::Image),
            "song" => Some(Modality::Song),
            _ => None,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image formats accepted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMimeType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMimeType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMimeType::Jpeg),
            "image/png" => Some(ImageMimeType::Png),
            "image/gif" => Some(ImageMimeType::Gif),
            "image/webp" => Some(ImageMimeType::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMimeType::Jpeg => "image/jpeg",
            ImageMimeType::Png => "image/png",
            ImageMimeType::Gif => "image/gif",
            ImageMimeType::Webp => "image/webp",
        }
    }
}

/// Rejections raised while building a request, before any provider is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Song title must not be empty")]
    EmptySongTitle,

    #[error("No image data provided")]
    EmptyImage,

    #[error("Unsupported image type: {0}. Only JPEG, PNG, GIF and WEBP are allowed")]
    UnsupportedImageType(String),
}

/// A validated analysis input. Can only be built through [`AnalysisRequest::image`]
/// and [`AnalysisRequest::song`], which reject empty payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Image {
        bytes: Vec<u8>,
        mime_type: ImageMimeType,
    },
    Song {
        title: String,
    },
}

impl AnalysisRequest {
    pub fn image(bytes: Vec<u8>, mime_type: &str) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::EmptyImage);
        }
        let mime_type = ImageMimeType::from_mime(mime_type)
            .ok_or_else(|| InputError::UnsupportedImageType(mime_type.to_string()))?;
        Ok(AnalysisRequest::Image { bytes, mime_type })
    }

    pub fn song(title: impl Into<String>) -> Result<Self, InputError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(InputError::EmptySongTitle);
        }
        Ok(AnalysisRequest::Song { title })
    }

    pub fn modality(&self) -> Modality {
        match self {
            AnalysisRequest::Image { .. } => Modality::Image,
            AnalysisRequest::Song { .. } => Modality::Song,
        }
    }

    /// The bytes the fallback digest is computed over.
    pub fn payload_bytes(&self) -> &[u8] {
        match self {
            AnalysisRequest::Image { bytes, .. } => bytes,
            AnalysisRequest::Song { title } => title.as_bytes(),
        }
    }

    pub fn song_title(&self) -> Option<&str> {
        match self {
            AnalysisRequest::Song { title } => Some(title),
            AnalysisRequest::Image { .. } => None,
        }
    }
}

/// A provider reply before normalization. Fields keep whatever JSON the provider sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnalysis {
    pub aura_score: Value,
    pub rizz_score: Value,
    pub mystic_title: Value,
    pub analysis_text: Value,
}

impl From<&AnalysisResult> for RawAnalysis {
    fn from(result: &AnalysisResult) -> Self {
        RawAnalysis {
            aura_score: Value::from(result.aura_score),
            rizz_score: Value::from(result.rizz_score),
            mystic_title: Value::from(result.mystic_title.clone()),
            analysis_text: Value::from(result.analysis_text.clone()),
        }
    }
}

/// The normalized output of the pipeline. Scores are always within `[1, 100]`
/// and both texts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub aura_score: u8,
    pub rizz_score: u8,
    pub mystic_title: String,
    pub analysis_text: String,
}
