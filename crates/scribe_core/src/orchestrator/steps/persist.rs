//! Persist step - writes the transcript file.

use crate::models::JobPhase;
use crate::orchestrator::errors::{JobError, StepResult};
use crate::orchestrator::step::JobStep;
use crate::orchestrator::types::{Context, JobState};
use crate::transcript::store;

/// Persistence step.
///
/// Writes the formatted transcript to a collision-resistant filename
/// under the output directory. Temporary-media cleanup is not done here:
/// it belongs to the job runner so it also happens when earlier steps
/// fail.
pub struct PersistStep;

impl PersistStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PersistStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for PersistStep {
    fn name(&self) -> &str {
        "Persist"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Persisting
    }

    fn status_message(&self, _ctx: &Context) -> String {
        "Saving transcript...".to_string()
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_result() {
            return Err(JobError::write("no formatted transcript to save"));
        }
        if !state.has_resolved() {
            return Err(JobError::write("no resolved audio to derive a title from"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let result = state
            .result
            .as_ref()
            .ok_or_else(|| JobError::write("no formatted transcript to save"))?;
        let resolved = state
            .resolved
            .as_ref()
            .ok_or_else(|| JobError::write("no resolved audio to derive a title from"))?;

        let saved_path = store::persist(&result.text, &resolved.display_title, &ctx.output_dir())?;

        ctx.logger
            .success(&format!("Transcript saved to {}", saved_path.display()));
        state.saved_path = Some(saved_path);

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let saved_path = state
            .saved_path
            .as_ref()
            .ok_or_else(|| JobError::write("saved path not recorded"))?;

        if !saved_path.is_file() {
            return Err(JobError::write(format!(
                "transcript file was not created: {}",
                saved_path.display()
            )));
        }

        Ok(())
    }
}
