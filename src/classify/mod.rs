//! Content severity classification.

mod engine;

pub use engine::classify;

use serde::{Deserialize, Serialize};

/// Severity levels for classified content, ordered by risk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe = 0,
    Mild = 1,
    Moderate = 2,
    Explicit = 3,
}

impl Severity {
    /// Numeric level as exposed on the wire (0..=3).
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Safe => write!(f, "safe"),
            Severity::Mild => write!(f, "mild"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::Explicit => write!(f, "explicit"),
        }
    }
}

/// A single labeled detection from the image-scoring service.
///
/// The upstream scorer emits `class` for the label name; both spellings are
/// accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "class")]
    pub label: String,
    pub score: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}
