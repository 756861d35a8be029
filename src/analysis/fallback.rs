//! Offline result generator used when every provider failed.
//!
//! The output is a pure function of the request payload: a SHA-256 digest of the
//! payload bytes is folded into a `u64`, and every field is picked from it with
//! fixed modulo arithmetic. No randomness, no clock.

use super::types::{AnalysisRequest, AnalysisResult, Modality};
use sha2::{Digest, Sha256};

pub const AURA_BASE: u64 = 40;
pub const AURA_SPAN: u64 = 55;
pub const RIZZ_BASE: u64 = 35;
pub const RIZZ_SPAN: u64 = 60;

const IMAGE_TITLES: &[&str] = &[
    "Ethereal Main Character Vibes",
    "Soft Launch Of A Legend Era",
    "Golden Hour Energy, No Filter Needed",
    "Quiet Storm With Cozy Undertones",
    "Certified Side Quest Protagonist",
    "Moonlit Mystery In Plain Sight",
];

const IMAGE_TEXTS: &[&str] = &[
    "This energy is literally giving main character energy but with a side of mystery that hits different fr. The vibe check is passing immaculately, and the low-key confidence is living rent-free in everyone's mind.",
    "The aura here is high-key glowing and it understood the assignment before the assignment was even given. Calm, collected and lowkey iconic.",
    "Giving soft power with a chaotic little sparkle, no cap. The rizz is quiet but it absolutely lands.",
    "This is cozy-mysterious energy that makes people want to know the lore. The vibe check came back immaculate.",
    "Serving effortless confidence with zero try-hard moments. This aura is living rent-free and paying no bills.",
    "Low-key radiating the kind of calm that makes the whole room exhale. The mystic signals say this one is a keeper.",
];

const SONG_TITLES: &[&str] = &[
    "Mystery Track Maestro",
    "Midnight Vibe Wizard",
    "Emotional Damage Champion",
    "Aux Cord Oracle",
    "Late Night Drive Prophet",
    "Certified Bop Whisperer",
];

const SONG_TEXTS: &[&str] = &[
    "This track is giving major unknown vibes, no cap. The server's literally ghosted us, but the mystery lowkey adds to your main character energy. Still slaps though!",
    "The title alone is bussin and the aura is on another frequency fr. This one lives in the playlist rent-free.",
    "High-key the soundtrack to a coming-of-age montage. The rizz is subtle but it hits different at 2am.",
    "This song radiates chaotic good energy and we are here for it. Vibe check: passed with flying colors.",
    "Giving windows-down, volume-up, no thoughts just vibes. Main character energy is off the charts.",
    "Lowkey mysterious, highkey iconic. The mystic charts say this one slaps on every replay.",
];

/// Digest of the request payload: the first eight bytes of its SHA-256 hash, big-endian.
pub fn digest(bytes: &[u8]) -> u64 {
    let hash = Sha256::digest(bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(head)
}

fn pools(modality: Modality) -> (&'static [&'static str], &'static [&'static str]) {
    match modality {
        Modality::Image => (IMAGE_TITLES, IMAGE_TEXTS),
        Modality::Song => (SONG_TITLES, SONG_TEXTS),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn generate(&self, request: &AnalysisRequest) -> AnalysisResult {
        let d = digest(request.payload_bytes());
        let (titles, texts) = pools(request.modality());

        AnalysisResult {
            aura_score: (AURA_BASE + d % AURA_SPAN) as u8,
            rizz_score: (RIZZ_BASE + (d / 7) % RIZZ_SPAN) as u8,
            mystic_title: titles[((d >> 16) % titles.len() as u64) as usize].to_string(),
            analysis_text: texts[((d >> 32) % texts.len() as u64) as usize].to_string(),
        }
    }
}
