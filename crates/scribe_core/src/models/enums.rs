//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a job's media reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A remote URL handled by the media downloader.
    Remote,
    /// A file already on the local filesystem.
    Local,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Remote => write!(f, "remote"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

/// Speech-to-text model size tier.
///
/// Larger tiers trade speed and memory for accuracy. The size identifier
/// doubles as the ggml model file name stem (`ggml-{size}.bin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

/// All sizes in ascending quality order (for help text and validation).
pub const ALL_SIZES: [ModelSize; 5] = [
    ModelSize::Tiny,
    ModelSize::Base,
    ModelSize::Small,
    ModelSize::Medium,
    ModelSize::Large,
];

impl ModelSize {
    /// The ggml model file name for this size.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self)
    }

    /// Approximate model footprint in MB.
    pub fn size_mb(&self) -> u32 {
        match self {
            ModelSize::Tiny => 75,
            ModelSize::Base => 142,
            ModelSize::Small => 466,
            ModelSize::Medium => 1500,
            ModelSize::Large => 2900,
        }
    }

    /// Human-readable description for selection UIs.
    pub fn description(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "Fastest, basic accuracy",
            ModelSize::Base => "Fast, good general quality",
            ModelSize::Small => "Balanced speed and accuracy",
            ModelSize::Medium => "High quality, slower",
            ModelSize::Large => "Best quality, slowest",
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        };
        write!(f, "{}", name)
    }
}

/// Error returned when parsing an unknown model size name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown model size '{0}' (expected one of: tiny, base, small, medium, large)")]
pub struct ParseModelSizeError(pub String);

impl std::str::FromStr for ModelSize {
    type Err = ParseModelSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            other => Err(ParseModelSizeError(other.to_string())),
        }
    }
}
