//! Speech-to-text engine collaborator.
//!
//! The pipeline talks to the engine through the `SpeechEngine` trait:
//! load a model by size, then transcribe a local audio file with options.
//! The production implementation wraps whisper.cpp; tests substitute mocks.

mod audio;
mod cache;
mod whisper;

pub use audio::SAMPLE_RATE;
pub use cache::ModelCache;
pub use whisper::WhisperSpeech;

use std::any::Any;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ModelSize, RawTranscription};

/// Errors from the engine collaborator.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The model file for the requested size is not installed.
    #[error("model file not found: {path} (download a ggml model to the models folder)")]
    ModelNotFound { path: PathBuf },

    /// The engine failed to initialize a model.
    #[error("{message}")]
    LoadFailed { message: String },

    /// The input audio could not be decoded.
    #[error("audio decode failed: {message}")]
    AudioDecode { message: String },

    /// The engine failed during transcription.
    #[error("{message}")]
    Transcribe { message: String },
}

impl EngineError {
    pub fn load_failed(message: impl Into<String>) -> Self {
        Self::LoadFailed {
            message: message.into(),
        }
    }

    pub fn audio_decode(message: impl Into<String>) -> Self {
        Self::AudioDecode {
            message: message.into(),
        }
    }

    pub fn transcribe(message: impl Into<String>) -> Self {
        Self::Transcribe {
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// A loaded model: its size plus the engine's opaque handle.
///
/// Handles are engine-specific; the pipeline never looks inside.
pub struct LoadedModel {
    size: ModelSize,
    handle: Box<dyn Any + Send>,
}

impl LoadedModel {
    pub fn new(size: ModelSize, handle: impl Any + Send) -> Self {
        Self {
            size,
            handle: Box::new(handle),
        }
    }

    pub fn size(&self) -> ModelSize {
        self.size
    }

    /// Downcast the handle back to the engine's concrete type.
    pub fn handle<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref()
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Options for one transcription call.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    /// Language code, or `None` to let the engine detect the language.
    pub language: Option<String>,
    /// Translate to English instead of transcribing verbatim.
    pub translate: bool,
}

/// The speech-to-text engine seam.
pub trait SpeechEngine: Send + Sync {
    /// Load the model for `size`.
    ///
    /// Expensive and blocking; callers cache the returned model.
    fn load_model(&self, size: ModelSize) -> EngineResult<LoadedModel>;

    /// Transcribe the audio file at `audio_path` with a loaded model.
    fn transcribe(
        &self,
        model: &LoadedModel,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> EngineResult<RawTranscription>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_model_downcasts_to_its_handle_type() {
        let model = LoadedModel::new(ModelSize::Tiny, 42u32);
        assert_eq!(model.size(), ModelSize::Tiny);
        assert_eq!(model.handle::<u32>(), Some(&42));
        assert_eq!(model.handle::<String>(), None);
    }
}
