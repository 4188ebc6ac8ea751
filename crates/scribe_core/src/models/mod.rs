//! Data model shared across the pipeline.

mod enums;
mod job;

pub use enums::{ModelSize, ParseModelSizeError, SourceKind, ALL_SIZES};
pub use job::{
    JobOutcome, JobPhase, JobRequest, RawTranscription, ResolvedAudio, Segment, TranscriptResult,
    AUTO_LANGUAGE,
};
