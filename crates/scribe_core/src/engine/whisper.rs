//! whisper.cpp-backed speech engine.
//!
//! Models are ggml files (`ggml-{size}.bin`) under a configured models
//! directory. Loading builds a `WhisperContext`, which is the expensive
//! step the model cache exists to avoid repeating.

use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{audio, EngineError, EngineResult, LoadedModel, SpeechEngine, TranscribeOptions};
use crate::models::{ModelSize, RawTranscription, Segment};

/// Production speech engine over whisper.cpp bindings.
pub struct WhisperSpeech {
    /// Directory holding ggml model files.
    models_dir: PathBuf,
    /// Scratch directory for decoded audio.
    scratch_dir: PathBuf,
}

impl WhisperSpeech {
    pub fn new(models_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Path of the ggml model file for a size.
    pub fn model_path(&self, size: ModelSize) -> PathBuf {
        self.models_dir.join(size.file_name())
    }
}

impl SpeechEngine for WhisperSpeech {
    fn load_model(&self, size: ModelSize) -> EngineResult<LoadedModel> {
        let path = self.model_path(size);
        if !path.is_file() {
            return Err(EngineError::ModelNotFound { path });
        }

        tracing::info!("Loading whisper model '{}' from {}", size, path.display());

        let path_str = path.to_str().ok_or_else(|| {
            EngineError::load_failed(format!("model path is not valid UTF-8: {}", path.display()))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| EngineError::load_failed(e.to_string()))?;

        Ok(LoadedModel::new(size, ctx))
    }

    fn transcribe(
        &self,
        model: &LoadedModel,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> EngineResult<RawTranscription> {
        let ctx = model.handle::<WhisperContext>().ok_or_else(|| {
            EngineError::transcribe("model handle does not belong to the whisper engine")
        })?;

        let samples = audio::decode_to_samples(audio_path, &self.scratch_dir)?;

        let mut state = ctx
            .create_state()
            .map_err(|e| EngineError::transcribe(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_translate(options.translate);
        params.set_language(options.language.as_deref());
        // Keep whisper.cpp's own printing out of our logs.
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);

        state
            .full(params, &samples)
            .map_err(|e| EngineError::transcribe(e.to_string()))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| EngineError::transcribe(e.to_string()))?;

        let mut segments = Vec::with_capacity(num_segments as usize);
        let mut full_text = String::new();

        for i in 0..num_segments {
            let text = state
                .full_get_segment_text_lossy(i)
                .map_err(|e| EngineError::transcribe(e.to_string()))?;
            // t0/t1 are centisecond offsets.
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| EngineError::transcribe(e.to_string()))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| EngineError::transcribe(e.to_string()))?;

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !full_text.is_empty() {
                    full_text.push(' ');
                }
                full_text.push_str(trimmed);
            }

            segments.push(Segment {
                start: t0 as f64 / 100.0,
                end: t1 as f64 / 100.0,
                text,
            });
        }

        Ok(RawTranscription {
            full_text,
            segments: Some(segments),
        })
    }
}
