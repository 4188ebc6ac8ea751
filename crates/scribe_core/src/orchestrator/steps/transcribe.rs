//! Transcribe step - runs the engine over the resolved audio.

use crate::engine::TranscribeOptions;
use crate::models::JobPhase;
use crate::orchestrator::errors::{JobError, StepResult};
use crate::orchestrator::step::JobStep;
use crate::orchestrator::types::{Context, JobState};

/// Transcription step.
///
/// Builds the engine options from the request: translate mode when the
/// flag is set, and the language hint omitted when it is the auto-detect
/// sentinel so the engine infers the language itself.
pub struct TranscribeStep;

impl TranscribeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TranscribeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for TranscribeStep {
    fn name(&self) -> &str {
        "Transcribe"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Transcribing
    }

    fn status_message(&self, _ctx: &Context) -> String {
        "Transcribing audio... please wait".to_string()
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let resolved = state
            .resolved
            .as_ref()
            .ok_or_else(|| JobError::transcription("no resolved audio to transcribe"))?;

        if !resolved.file_path.is_file() {
            return Err(JobError::input_not_found(
                resolved.file_path.display().to_string(),
            ));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let resolved = state
            .resolved
            .as_ref()
            .ok_or_else(|| JobError::transcription("no resolved audio to transcribe"))?;

        let options = TranscribeOptions {
            language: ctx.request.effective_language().map(str::to_string),
            translate: ctx.request.translate,
        };

        match &options.language {
            Some(code) => ctx.logger.info(&format!("Language hint: {}", code)),
            None => ctx.logger.info("Language: auto-detect"),
        }
        if options.translate {
            ctx.logger.info("Mode: translate to English");
        }

        let cache = ctx.models.lock();
        let model = cache
            .current()
            .filter(|m| m.size() == ctx.request.model_size)
            .ok_or_else(|| JobError::transcription("no model loaded for this job"))?;

        let raw = ctx
            .engine
            .transcribe(model, &resolved.file_path, &options)
            .map_err(|e| JobError::transcription(e.to_string()))?;

        // A structurally successful call with nothing to say is a failure:
        // an empty transcript is never a valid result.
        if raw.full_text.trim().is_empty() {
            return Err(JobError::EmptyResult);
        }

        let segment_count = raw.segments.as_ref().map_or(0, |s| s.len());
        ctx.logger.info(&format!(
            "Engine returned {} characters in {} segments",
            raw.full_text.len(),
            segment_count
        ));

        state.raw = Some(raw);

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_raw() {
            return Err(JobError::transcription("transcription not recorded"));
        }
        Ok(())
    }
}
