//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, JobState};
use crate::models::JobPhase;

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - check preconditions before execution
/// 2. `execute` - perform the step's work
/// 3. `validate_output` - verify the step recorded valid output
///
/// Each step corresponds 1:1 to a job lifecycle state reported through
/// `phase()`.
pub trait JobStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// The lifecycle state this step represents.
    fn phase(&self) -> JobPhase;

    /// Status line announced to the presentation surface when the step
    /// begins.
    fn status_message(&self, _ctx: &Context) -> String {
        self.name().to_string()
    }

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Execute the step's main work, recording results in `state`.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()>;

    /// Validate outputs after execution.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep;

    impl JobStep for MockStep {
        fn name(&self) -> &str {
            "Mock"
        }

        fn phase(&self) -> JobPhase {
            JobPhase::Resolving
        }

        fn validate_input(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<()> {
            Ok(())
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn JobStep> = Box::new(MockStep);
        assert_eq!(step.name(), "Mock");
        assert_eq!(step.phase(), JobPhase::Resolving);
        assert_eq!(step.status_message(&placeholder_ctx()), "Mock");
    }

    // A minimal context for trait-level tests.
    fn placeholder_ctx() -> Context {
        use crate::config::Settings;
        use crate::download::{DownloadFailure, MediaDownloader};
        use crate::engine::{
            EngineResult, LoadedModel, ModelCache, SpeechEngine, TranscribeOptions,
        };
        use crate::logging::{JobLogger, LogConfig};
        use crate::models::{JobRequest, ModelSize, RawTranscription, SourceKind};
        use parking_lot::Mutex;
        use std::path::Path;
        use std::sync::Arc;

        struct NoEngine;
        impl SpeechEngine for NoEngine {
            fn load_model(&self, size: ModelSize) -> EngineResult<LoadedModel> {
                Ok(LoadedModel::new(size, ()))
            }
            fn transcribe(
                &self,
                _model: &LoadedModel,
                _audio_path: &Path,
                _options: &TranscribeOptions,
            ) -> EngineResult<RawTranscription> {
                Ok(RawTranscription {
                    full_text: String::new(),
                    segments: None,
                })
            }
        }

        struct NoDownloader;
        impl MediaDownloader for NoDownloader {
            fn fetch_audio(&self, _url: &str, _staging_dir: &Path) -> Result<(), DownloadFailure> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let logger =
            Arc::new(JobLogger::new("test", dir.path(), LogConfig::default(), None).unwrap());
        let engine: Arc<dyn SpeechEngine> = Arc::new(NoEngine);
        let models = Arc::new(Mutex::new(ModelCache::new(Arc::clone(&engine))));

        Context::new(
            JobRequest {
                source_kind: SourceKind::Local,
                source_ref: "x".to_string(),
                language_hint: None,
                model_size: ModelSize::Base,
                translate: false,
                include_timestamps: false,
            },
            Settings::default(),
            "test",
            logger,
            Arc::new(NoDownloader),
            engine,
            models,
        )
    }
}
