//! Single-slot model cache.
//!
//! Holds at most one loaded model, keyed by size. A repeat request is a
//! cache hit with no engine call; a size change drops the previous model
//! before the replacement loads, so two models are never resident at once.
//!
//! The cache outlives individual jobs (it is owned by the orchestrator and
//! used from the worker thread), so callers share it behind a mutex.

use std::sync::Arc;

use super::{EngineError, EngineResult, LoadedModel, SpeechEngine};
use crate::models::ModelSize;

/// Cache of the most recently loaded model.
pub struct ModelCache {
    engine: Arc<dyn SpeechEngine>,
    slot: Option<LoadedModel>,
}

impl ModelCache {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine, slot: None }
    }

    /// The cached model, if any.
    pub fn current(&self) -> Option<&LoadedModel> {
        self.slot.as_ref()
    }

    /// Size of the cached model, if any.
    pub fn current_size(&self) -> Option<ModelSize> {
        self.slot.as_ref().map(|m| m.size())
    }

    /// Get the model for `size`, loading it on a miss.
    ///
    /// Loading is synchronous and blocking; it is the dominant cost the
    /// first time a size is used. A failed load leaves the cache empty.
    pub fn obtain(&mut self, size: ModelSize) -> EngineResult<&LoadedModel> {
        let hit = self.slot.as_ref().is_some_and(|m| m.size() == size);
        if !hit {
            // Release the previous model before loading the next one.
            self.slot = None;
            tracing::debug!("Model cache miss, loading '{}'", size);
            let model = self.engine.load_model(size)?;
            self.slot = Some(model);
        }

        self.slot
            .as_ref()
            .ok_or_else(|| EngineError::load_failed("model cache slot is empty"))
    }
}
