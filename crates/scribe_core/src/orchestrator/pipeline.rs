//! Pipeline runner that executes steps in sequence.

use super::errors::StepResult;
use super::step::JobStep;
use super::steps::{FormatStep, LoadModelStep, PersistStep, ResolveStep, TranscribeStep};
use super::types::{Context, JobState};

/// Pipeline that runs a sequence of steps.
///
/// Steps execute strictly in order with validation before and after each
/// one. The first failure short-circuits the run; remaining steps are
/// skipped and the error propagates to the job runner.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn JobStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: JobStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// For each step: announce the phase, run `validate_input`, `execute`,
    /// then `validate_output`. Returns the first error encountered.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        for step in &self.steps {
            let step_name = step.name();
            ctx.logger.phase(step_name);
            ctx.report_status(step.phase(), &step.status_message(ctx));

            ctx.logger
                .debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx, state) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(e);
            }

            if let Err(e) = step.execute(ctx, state) {
                ctx.logger.error(&format!("{} failed: {}", step_name, e));
                return Err(e);
            }

            ctx.logger
                .debug(&format!("Validating output for '{}'", step_name));
            if let Err(e) = step.validate_output(ctx, state) {
                ctx.logger.error(&format!("Output validation failed: {}", e));
                return Err(e);
            }

            ctx.logger.success(&format!("{} completed", step_name));
        }

        Ok(())
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the standard transcription pipeline.
///
/// 1. Resolve - turn the media reference into a local audio file
/// 2. LoadModel - warm the single-slot model cache
/// 3. Transcribe - run the engine over the resolved audio
/// 4. Format - render plain or timestamped text
/// 5. Persist - write the transcript file
pub fn standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ResolveStep::new())
        .with_step(LoadModelStep::new())
        .with_step(TranscribeStep::new())
        .with_step(FormatStep::new())
        .with_step(PersistStep::new())
}
