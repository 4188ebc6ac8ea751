//! Format step - renders the raw transcription into final text.

use crate::models::{JobPhase, TranscriptResult};
use crate::orchestrator::errors::{JobError, StepResult};
use crate::orchestrator::step::JobStep;
use crate::orchestrator::types::{Context, JobState};
use crate::transcript::formatter;

/// Formatting step.
///
/// Pure transformation of the raw transcription; timestamps are rendered
/// only when the request asked for them.
pub struct FormatStep;

impl FormatStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FormatStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for FormatStep {
    fn name(&self) -> &str {
        "Format"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Formatting
    }

    fn status_message(&self, _ctx: &Context) -> String {
        "Formatting transcript...".to_string()
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_raw() {
            return Err(JobError::transcription("no transcription to format"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let raw = state
            .raw
            .as_ref()
            .ok_or_else(|| JobError::transcription("no transcription to format"))?;

        let text = formatter::format(raw, ctx.request.include_timestamps);
        let result = TranscriptResult::new(text);

        ctx.logger
            .info(&format!("Formatted transcript: {} words", result.word_count));
        state.result = Some(result);

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_result() {
            return Err(JobError::transcription("formatted transcript not recorded"));
        }
        Ok(())
    }
}
