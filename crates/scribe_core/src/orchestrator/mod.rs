//! Job orchestrator for transcription pipelines.
//!
//! One job at a time runs through a fixed sequence of steps, each step
//! mapping 1:1 to a lifecycle state:
//!
//! ```text
//! Idle -> Resolving -> ModelLoading -> Transcribing
//!      -> Formatting -> Persisting -> Completed | Failed -> Idle
//! ```
//!
//! The control thread only starts jobs and receives events; all blocking
//! work (download, model load, transcription, file I/O) happens on a
//! dedicated worker thread. Temporary media is cleaned up on every exit
//! path before the terminal outcome is reported.
//!
//! # Example
//!
//! ```ignore
//! use scribe_core::orchestrator::{JobOrchestrator, JobEvent};
//!
//! let orchestrator = JobOrchestrator::new(settings, engine, downloader,
//!     Box::new(|event| match event {
//!         JobEvent::Status { message, .. } => println!("{message}"),
//!         JobEvent::Tick { elapsed_seconds } => print_timer(elapsed_seconds),
//!         JobEvent::Outcome(outcome) => finish(outcome),
//!     }));
//!
//! orchestrator.start(request)?;
//! ```

pub mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

pub use errors::{JobError, JobErrorKind, StartError, StepResult};
pub use pipeline::{standard_pipeline, Pipeline};
pub use runner::JobOrchestrator;
pub use step::JobStep;
pub use steps::{FormatStep, LoadModelStep, PersistStep, ResolveStep, TranscribeStep};
pub use types::{Context, EventCallback, JobEvent, JobState, StatusCallback};
