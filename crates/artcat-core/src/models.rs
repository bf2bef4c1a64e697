use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::CoreError;

/// Every metric is scored out of this value.
pub const FULL_MARK: f64 = 100.0;

/// Average score below which Maestro Michi turns stern.
pub const STERN_THRESHOLD: u32 = 60;

// ── Analysis payload (wire shape of the inference reply) ──

/// One scored technical dimension, e.g. perspective or colour theory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metric {
    pub category: String,
    pub score: f64,
    pub full_mark: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TechnicalFeedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub tips: Vec<String>,
}

/// The structured critique for one uploaded image.
///
/// The wire shape is exact: a reply missing any field, or carrying one that
/// isn't listed here, fails to deserialize instead of producing a partial analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArtAnalysis {
    pub technical_scores: Vec<Metric>,
    pub detected_patterns: Vec<String>,
    pub color_palette: Vec<String>,
    pub feedback: TechnicalFeedback,
    pub cat_commentary: String,
}

static HEX_COLOR: OnceLock<Regex> = OnceLock::new();

/// True for `#rgb`, `#rrggbb` and `#rrggbbaa`.
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR
        .get_or_init(|| {
            Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
        })
        .is_match(s)
}

impl ArtAnalysis {
    /// Check the value constraints serde can't express: score range, the fixed
    /// full mark and hex palette entries.
    pub fn validate(&self) -> Result<(), CoreError> {
        for metric in &self.technical_scores {
            if !metric.score.is_finite() || !(0.0..=FULL_MARK).contains(&metric.score) {
                return Err(CoreError::InvalidResponse(format!(
                    "score for '{}' out of range: {}",
                    metric.category, metric.score
                )));
            }
            if metric.full_mark != FULL_MARK {
                return Err(CoreError::InvalidResponse(format!(
                    "fullMark for '{}' must be 100, got {}",
                    metric.category, metric.full_mark
                )));
            }
        }
        if let Some(bad) = self.color_palette.iter().find(|c| !is_hex_color(c)) {
            return Err(CoreError::InvalidResponse(format!(
                "palette entry is not a hex color: {bad}"
            )));
        }
        Ok(())
    }

    /// Rounded mean of all metric scores, 0 when there are none.
    pub fn average_score(&self) -> u32 {
        if self.technical_scores.is_empty() {
            return 0;
        }
        let total: f64 = self.technical_scores.iter().map(|m| m.score).sum();
        let mean = total / self.technical_scores.len() as f64;
        mean.round().clamp(0.0, FULL_MARK) as u32
    }
}

/// Average score of an optional analysis; 0 when absent.
pub fn average_score(analysis: Option<&ArtAnalysis>) -> u32 {
    analysis.map(ArtAnalysis::average_score).unwrap_or(0)
}

// ── Request side ──

/// Encoded image ready to embed in an inference request. Transient: built per
/// upload and dropped once the reply arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Base64 text with no data-URL header.
    pub image_data: String,
    pub mime_type: String,
}

/// Local, ephemeral preview of the selected image. Independent of the encoded
/// payload so it can exist before the file is even read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewHandle {
    pub id: Uuid,
    pub path: PathBuf,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl PreviewHandle {
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id: Uuid::new_v4(),
            path,
            file_name,
            created_at: Utc::now(),
        }
    }
}

// ── Session state ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Idle,
    Analyzing,
    Complete,
    Error,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Maestro Michi's expression.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Neutral,
    Pleased,
    Stern,
}

impl Mood {
    pub fn from_status(status: AnalysisStatus, average_score: u32) -> Self {
        match status {
            AnalysisStatus::Complete if average_score < STERN_THRESHOLD => Self::Stern,
            AnalysisStatus::Complete => Self::Pleased,
            _ => Self::Neutral,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Stern => "Maestro Enojado",
            Self::Neutral | Self::Pleased => "Maestro Michi",
        }
    }
}
