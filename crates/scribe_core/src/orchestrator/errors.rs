//! Error types for the transcription pipeline.
//!
//! Every collaborator failure is caught at its call site and re-tagged into
//! one of these kinds, with the original diagnostic preserved as the message.
//! Nothing propagates past the orchestrator boundary unclassified.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ModelSize;

/// A classified job failure.
#[derive(Error, Debug)]
pub enum JobError {
    /// The request shape was rejected before the job started.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A local input path does not exist or is not a regular file.
    #[error("input file not found: {path}")]
    InputNotFound { path: String },

    /// The media downloader failed; message is its raw diagnostic output.
    #[error("download failed: {message}")]
    Download { message: String },

    /// The engine could not load the requested model size.
    #[error("failed to load model '{size}': {message}")]
    ModelLoad { size: ModelSize, message: String },

    /// The engine failed while transcribing.
    #[error("transcription failed: {message}")]
    Transcription { message: String },

    /// The engine reported success but produced no text.
    #[error("transcription returned an empty result")]
    EmptyResult,

    /// Writing the transcript file failed.
    #[error("failed to save transcript: {message}")]
    Write { message: String },
}

impl JobError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    pub fn model_load(size: ModelSize, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            size,
            message: message.into(),
        }
    }

    pub fn transcription(message: impl Into<String>) -> Self {
        Self::Transcription {
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// The kind tag carried by `JobOutcome::Failure`.
    pub fn kind(&self) -> JobErrorKind {
        match self {
            JobError::InvalidRequest(_) => JobErrorKind::InvalidRequest,
            JobError::InputNotFound { .. } => JobErrorKind::InputNotFound,
            JobError::Download { .. } => JobErrorKind::DownloadError,
            JobError::ModelLoad { .. } => JobErrorKind::ModelLoadError,
            JobError::Transcription { .. } => JobErrorKind::TranscriptionError,
            JobError::EmptyResult => JobErrorKind::EmptyResult,
            JobError::Write { .. } => JobErrorKind::WriteError,
        }
    }

    /// Advisory guidance shown to the user alongside the failure.
    pub fn guidance(&self) -> Option<String> {
        match self {
            JobError::Download { .. } => Some(
                "Make sure yt-dlp is installed and up to date, and that the URL is reachable"
                    .to_string(),
            ),
            JobError::ModelLoad { size, .. } => Some(format!(
                "Model '{}' needs roughly {} MB; try a smaller size if memory is tight",
                size,
                size.size_mb()
            )),
            _ => None,
        }
    }
}

/// Discriminant-only failure classification, reported in outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobErrorKind {
    InvalidRequest,
    InputNotFound,
    DownloadError,
    ModelLoadError,
    TranscriptionError,
    EmptyResult,
    WriteError,
}

impl std::fmt::Display for JobErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobErrorKind::InvalidRequest => "InvalidRequest",
            JobErrorKind::InputNotFound => "InputNotFound",
            JobErrorKind::DownloadError => "DownloadError",
            JobErrorKind::ModelLoadError => "ModelLoadError",
            JobErrorKind::TranscriptionError => "TranscriptionError",
            JobErrorKind::EmptyResult => "EmptyResult",
            JobErrorKind::WriteError => "WriteError",
        };
        write!(f, "{}", name)
    }
}

/// Why a start request was refused. No job thread was started and no
/// outcome will be reported.
#[derive(Error, Debug)]
pub enum StartError {
    /// Another job is active; the running job is unaffected.
    #[error("a job is already running")]
    AlreadyRunning,

    /// The request failed shape validation.
    #[error(transparent)]
    Rejected(#[from] JobError),
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_error_preserves_diagnostic() {
        let err = JobError::download("yt-dlp: video unavailable");
        assert_eq!(err.kind(), JobErrorKind::DownloadError);
        assert!(err.to_string().contains("video unavailable"));
    }

    #[test]
    fn model_load_guidance_names_a_smaller_size() {
        let err = JobError::model_load(ModelSize::Large, "out of memory");
        let guidance = err.guidance().unwrap();
        assert!(guidance.contains("smaller"));
    }

    #[test]
    fn empty_result_has_no_guidance() {
        assert!(JobError::EmptyResult.guidance().is_none());
    }
}
