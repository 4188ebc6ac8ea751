//! Job request, intermediate artifacts, and terminal outcome types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::enums::{ModelSize, SourceKind};
use crate::orchestrator::errors::{JobError, JobErrorKind};

/// Sentinel language value meaning "let the engine detect the language".
pub const AUTO_LANGUAGE: &str = "auto";

/// Immutable input to a transcription job.
///
/// Constructed once by the presentation surface and read-only for the
/// job's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Whether the reference is a URL or a local path.
    pub source_kind: SourceKind,
    /// The URL or filesystem path.
    pub source_ref: String,
    /// Language code hint, or `None`/`"auto"` for engine auto-detection.
    #[serde(default)]
    pub language_hint: Option<String>,
    /// Model size tier to transcribe with.
    pub model_size: ModelSize,
    /// Translate to English instead of transcribing verbatim.
    #[serde(default)]
    pub translate: bool,
    /// Render segment timing into the output.
    #[serde(default)]
    pub include_timestamps: bool,
}

impl JobRequest {
    /// The language hint with the auto-detect sentinel collapsed to `None`.
    pub fn effective_language(&self) -> Option<&str> {
        match self.language_hint.as_deref() {
            None | Some("") | Some(AUTO_LANGUAGE) => None,
            Some(code) => Some(code),
        }
    }

    /// Check the request shape before a job is allowed to start.
    ///
    /// Invalid requests are rejected here, synchronously, and never reach
    /// the worker thread.
    pub fn validate(&self) -> Result<(), JobError> {
        let reference = self.source_ref.trim();
        if reference.is_empty() {
            return Err(JobError::invalid_request("no media reference provided"));
        }

        match self.source_kind {
            SourceKind::Remote => {
                if !reference.starts_with("http://") && !reference.starts_with("https://") {
                    return Err(JobError::invalid_request(format!(
                        "'{}' does not look like a URL",
                        reference
                    )));
                }
            }
            SourceKind::Local => {
                let path = Path::new(reference);
                if !path.exists() {
                    return Err(JobError::input_not_found(reference));
                }
                if !path.is_file() {
                    return Err(JobError::invalid_request(format!(
                        "'{}' is not a regular file",
                        reference
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A media reference resolved to a playable local audio file.
///
/// Owned exclusively by the running job. If `is_temporary` is set the file
/// was produced by the downloader and is deleted exactly once at job end,
/// whatever the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAudio {
    /// Local path of the audio file.
    pub file_path: PathBuf,
    /// Human-readable title for the transcript filename.
    pub display_title: String,
    /// True only when the file was fetched by the downloader.
    pub is_temporary: bool,
}

/// A time-bounded span of transcribed text, offsets in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Unprocessed engine output.
///
/// `segments` may be absent; downstream code tolerates that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTranscription {
    pub full_text: String,
    #[serde(default)]
    pub segments: Option<Vec<Segment>>,
}

/// Final renderable transcript. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    pub word_count: usize,
}

impl TranscriptResult {
    /// Build a result from formatted text, counting whitespace-separated words.
    pub fn new(text: String) -> Self {
        let word_count = text.split_whitespace().count();
        Self { text, word_count }
    }
}

/// Lifecycle state of a job.
///
/// `Idle` is both the initial state and the state reached after a terminal
/// outcome is delivered. No state is re-entered within one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Idle,
    Resolving,
    ModelLoading,
    Transcribing,
    Formatting,
    Persisting,
    Completed,
    Failed,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobPhase::Idle => "Idle",
            JobPhase::Resolving => "Resolving",
            JobPhase::ModelLoading => "ModelLoading",
            JobPhase::Transcribing => "Transcribing",
            JobPhase::Formatting => "Formatting",
            JobPhase::Persisting => "Persisting",
            JobPhase::Completed => "Completed",
            JobPhase::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Terminal result of a job. Exactly one is produced per started job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobOutcome {
    Success {
        result: TranscriptResult,
        saved_path: PathBuf,
        elapsed: Duration,
    },
    Failure {
        kind: JobErrorKind,
        message: String,
        /// Advisory domain guidance (e.g. suggest a smaller model).
        guidance: Option<String>,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }
}
