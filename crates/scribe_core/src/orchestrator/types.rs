//! Core types for the job pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::download::MediaDownloader;
use crate::engine::{ModelCache, SpeechEngine};
use crate::logging::JobLogger;
use crate::models::{
    JobOutcome, JobPhase, JobRequest, RawTranscription, ResolvedAudio, TranscriptResult,
};

/// Event delivered from the worker to the presentation surface.
///
/// Delivery is one-way; the worker never blocks on the receiver.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Free-text progress for the current lifecycle state.
    Status { phase: JobPhase, message: String },
    /// Elapsed-time tick; monotonically non-decreasing while a job runs.
    Tick { elapsed_seconds: u64 },
    /// The terminal outcome. Exactly one per started job.
    Outcome(JobOutcome),
}

/// Callback receiving job events for presentation.
pub type EventCallback = Box<dyn Fn(JobEvent) + Send + Sync>;

/// Callback receiving step status updates.
///
/// Arguments: (phase, message)
pub type StatusCallback = Box<dyn Fn(JobPhase, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Holds the request, configuration, and shared collaborators that steps
/// can read but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// The immutable job request.
    pub request: JobRequest,
    /// Application settings.
    pub settings: Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Remote media downloader collaborator.
    pub downloader: Arc<dyn MediaDownloader>,
    /// Speech-to-text engine collaborator.
    pub engine: Arc<dyn SpeechEngine>,
    /// Model cache, shared across jobs.
    pub models: Arc<Mutex<ModelCache>>,
    /// Optional status callback.
    status_callback: Option<StatusCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        request: JobRequest,
        settings: Settings,
        job_name: impl Into<String>,
        logger: Arc<JobLogger>,
        downloader: Arc<dyn MediaDownloader>,
        engine: Arc<dyn SpeechEngine>,
        models: Arc<Mutex<ModelCache>>,
    ) -> Self {
        Self {
            request,
            settings,
            job_name: job_name.into(),
            logger,
            downloader,
            engine,
            models,
            status_callback: None,
        }
    }

    /// Set the status callback.
    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status_callback = Some(callback);
        self
    }

    /// Report a status update to the callback (if set).
    pub fn report_status(&self, phase: JobPhase, message: &str) {
        if let Some(ref callback) = self.status_callback {
            callback(phase, message);
        }
    }

    /// Staging directory for downloads and scratch files.
    pub fn staging_dir(&self) -> PathBuf {
        self.settings.paths.staging_dir()
    }

    /// Output directory for finished transcripts.
    pub fn output_dir(&self) -> PathBuf {
        self.settings.paths.output_dir()
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Steps add new data; they do not overwrite earlier sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Resolved input audio (from the Resolve step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedAudio>,
    /// Raw engine output (from the Transcribe step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawTranscription>,
    /// Formatted transcript (from the Format step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TranscriptResult>,
    /// Path of the saved transcript file (from the Persist step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn has_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn has_raw(&self) -> bool {
        self.raw.is_some()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_tracks_completion() {
        let mut state = JobState::new("job-1");
        assert!(!state.has_resolved());

        state.resolved = Some(ResolvedAudio {
            file_path: PathBuf::from("/tmp/a.mp3"),
            display_title: "a".to_string(),
            is_temporary: false,
        });

        assert!(state.has_resolved());
    }

    #[test]
    fn job_state_serializes() {
        let state = JobState::new("job-2");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"job-2\""));
    }
}
