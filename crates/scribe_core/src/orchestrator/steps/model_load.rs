//! LoadModel step - warms the single-slot model cache.

use crate::models::JobPhase;
use crate::orchestrator::errors::{JobError, StepResult};
use crate::orchestrator::step::JobStep;
use crate::orchestrator::types::{Context, JobState};

/// Model loading step.
///
/// Asks the cache for the requested size. A repeat of the previous size is
/// a hit and costs nothing; a size change releases the old model and loads
/// the new one, which is the slowest deterministic part of a first run.
pub struct LoadModelStep;

impl LoadModelStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoadModelStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for LoadModelStep {
    fn name(&self) -> &str {
        "LoadModel"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::ModelLoading
    }

    fn status_message(&self, ctx: &Context) -> String {
        format!("Loading model '{}'...", ctx.request.model_size)
    }

    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_resolved() {
            return Err(JobError::model_load(
                ctx.request.model_size,
                "no resolved audio recorded before model load",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, _state: &mut JobState) -> StepResult<()> {
        let size = ctx.request.model_size;
        let mut cache = ctx.models.lock();

        if cache.current_size() == Some(size) {
            ctx.logger
                .info(&format!("Model '{}' already loaded, reusing it", size));
            return Ok(());
        }

        cache
            .obtain(size)
            .map_err(|e| JobError::model_load(size, e.to_string()))?;

        ctx.logger
            .info(&format!("Model '{}' loaded successfully", size));

        Ok(())
    }

    fn validate_output(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        let size = ctx.request.model_size;
        if ctx.models.lock().current_size() != Some(size) {
            return Err(JobError::model_load(size, "model cache holds no model"));
        }
        Ok(())
    }
}
