//! Job runner: owns the one-job-at-a-time lifecycle.
//!
//! The control thread calls `start()` and gets an immediate accept/reject.
//! Accepted jobs run on a dedicated worker thread; a companion ticker
//! thread emits elapsed-time events while the job is active. All events
//! flow one way, worker to presentation, through the event callback, and
//! exactly one terminal outcome is reported per started job.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::Settings;
use crate::download::MediaDownloader;
use crate::engine::{ModelCache, SpeechEngine};
use crate::logging::{JobLogger, LogConfig};
use crate::models::{JobOutcome, JobPhase, JobRequest};
use crate::transcript::store;

use super::errors::{JobErrorKind, StartError};
use super::pipeline::standard_pipeline;
use super::types::{Context, EventCallback, JobEvent, JobState};

/// Interval between elapsed-time ticks.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Orchestrates transcription jobs, one at a time.
///
/// Holds the collaborators and the cross-job model cache. Cheap to share:
/// all mutable state sits behind atomics and mutexes.
pub struct JobOrchestrator {
    settings: Settings,
    engine: Arc<dyn SpeechEngine>,
    downloader: Arc<dyn MediaDownloader>,
    /// Model cache persists across jobs so a repeated size skips reloading.
    models: Arc<Mutex<ModelCache>>,
    events: Arc<dyn Fn(JobEvent) + Send + Sync>,
    /// True from accepted start until the outcome has been delivered.
    active: Arc<AtomicBool>,
    job_seq: AtomicU64,
}

impl JobOrchestrator {
    pub fn new(
        settings: Settings,
        engine: Arc<dyn SpeechEngine>,
        downloader: Arc<dyn MediaDownloader>,
        events: EventCallback,
    ) -> Self {
        let models = Arc::new(Mutex::new(ModelCache::new(Arc::clone(&engine))));
        Self {
            settings,
            engine,
            downloader,
            models,
            events: Arc::from(events),
            active: Arc::new(AtomicBool::new(false)),
            job_seq: AtomicU64::new(0),
        }
    }

    /// Whether a job is currently running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a job.
    ///
    /// Returns synchronously. While a job is active the request is refused
    /// with `AlreadyRunning` and the active job is untouched. A request
    /// that fails shape validation is refused with `Rejected`; in both
    /// cases no worker starts and no outcome will be reported.
    pub fn start(&self, request: JobRequest) -> Result<(), StartError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(StartError::AlreadyRunning);
        }

        if let Err(e) = request.validate() {
            self.active.store(false, Ordering::SeqCst);
            return Err(StartError::Rejected(e));
        }

        let job_id = self.job_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let worker = JobWorker {
            job_name: format!("transcribe_{:04}", job_id),
            request,
            settings: self.settings.clone(),
            engine: Arc::clone(&self.engine),
            downloader: Arc::clone(&self.downloader),
            models: Arc::clone(&self.models),
            events: Arc::clone(&self.events),
            active: Arc::clone(&self.active),
        };

        thread::spawn(move || worker.run());

        Ok(())
    }
}

/// Everything one worker thread needs to run a job to its terminal state.
struct JobWorker {
    job_name: String,
    request: JobRequest,
    settings: Settings,
    engine: Arc<dyn SpeechEngine>,
    downloader: Arc<dyn MediaDownloader>,
    models: Arc<Mutex<ModelCache>>,
    events: Arc<dyn Fn(JobEvent) + Send + Sync>,
    active: Arc<AtomicBool>,
}

impl JobWorker {
    fn run(self) {
        let started = Instant::now();

        let log_config = LogConfig::from_settings(&self.settings.logging);
        let logger = match JobLogger::new(
            &self.job_name,
            self.settings.paths.logs_dir(),
            log_config,
            None,
        ) {
            Ok(logger) => Arc::new(logger),
            Err(e) => {
                // Without a log file the job cannot run; still deliver a
                // terminal outcome.
                (self.events)(JobEvent::Outcome(JobOutcome::Failure {
                    kind: JobErrorKind::WriteError,
                    message: format!("failed to create job log: {}", e),
                    guidance: None,
                }));
                self.active.store(false, Ordering::SeqCst);
                return;
            }
        };

        // Ticker thread: advisory elapsed-time events at a fixed interval.
        // It never gates the pipeline; the worker just waves it off at the
        // end before reporting the terminal state.
        let ticking = Arc::new(AtomicBool::new(true));
        let ticker = {
            let ticking = Arc::clone(&ticking);
            let events = Arc::clone(&self.events);
            thread::spawn(move || {
                let mut next_tick = Instant::now();
                while ticking.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if now >= next_tick {
                        events(JobEvent::Tick {
                            elapsed_seconds: started.elapsed().as_secs(),
                        });
                        next_tick = now + TICK_INTERVAL;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            })
        };

        let status_events = Arc::clone(&self.events);
        let ctx = Context::new(
            self.request,
            self.settings,
            &self.job_name,
            Arc::clone(&logger),
            self.downloader,
            self.engine,
            self.models,
        )
        .with_status_callback(Box::new(move |phase, message| {
            status_events(JobEvent::Status {
                phase,
                message: message.to_string(),
            });
            status_events(JobEvent::Tick {
                elapsed_seconds: started.elapsed().as_secs(),
            });
        }));

        logger.info(&format!(
            "Starting job '{}' for {} source: {}",
            ctx.job_name, ctx.request.source_kind, ctx.request.source_ref
        ));

        let mut state = JobState::new(&ctx.job_name);
        let run_result = standard_pipeline().run(&ctx, &mut state);

        // Cleanup runs on every exit path, before the outcome is reported.
        if let Some(resolved) = state.resolved.as_ref() {
            store::remove_temp_audio(resolved, &logger);
        }

        // Stop ticks before the terminal state goes out.
        ticking.store(false, Ordering::SeqCst);
        let _ = ticker.join();

        let outcome = match run_result {
            Ok(()) => match (state.result.take(), state.saved_path.take()) {
                (Some(result), Some(saved_path)) => {
                    ctx.report_status(JobPhase::Completed, "Transcription complete");
                    logger.success(&format!(
                        "Job finished: {} words in {:?}",
                        result.word_count,
                        started.elapsed()
                    ));
                    JobOutcome::Success {
                        result,
                        saved_path,
                        elapsed: started.elapsed(),
                    }
                }
                _ => {
                    ctx.report_status(JobPhase::Failed, "Transcription failed");
                    JobOutcome::Failure {
                        kind: JobErrorKind::WriteError,
                        message: "job finished without recording a transcript".to_string(),
                        guidance: None,
                    }
                }
            },
            Err(e) => {
                ctx.report_status(JobPhase::Failed, "Transcription failed");
                logger.error(&e.to_string());
                JobOutcome::Failure {
                    kind: e.kind(),
                    message: e.to_string(),
                    guidance: e.guidance(),
                }
            }
        };

        (self.events)(JobEvent::Outcome(outcome));
        logger.close();
        self.active.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DownloadFailure, MediaDownloader};
    use crate::engine::{
        EngineError, EngineResult, LoadedModel, SpeechEngine, TranscribeOptions,
    };
    use crate::models::{ModelSize, RawTranscription, Segment, SourceKind};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct StubEngine {
        text: String,
        segments: Option<Vec<Segment>>,
        delay: Duration,
        fail_transcribe: bool,
        loads: AtomicUsize,
    }

    impl StubEngine {
        fn speaking(text: &str) -> Self {
            Self {
                text: text.to_string(),
                segments: None,
                delay: Duration::ZERO,
                fail_transcribe: false,
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl SpeechEngine for StubEngine {
        fn load_model(&self, size: ModelSize) -> EngineResult<LoadedModel> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(LoadedModel::new(size, ()))
        }

        fn transcribe(
            &self,
            _model: &LoadedModel,
            _audio_path: &Path,
            _options: &TranscribeOptions,
        ) -> EngineResult<RawTranscription> {
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if self.fail_transcribe {
                return Err(EngineError::transcribe("simulated engine crash"));
            }
            Ok(RawTranscription {
                full_text: self.text.clone(),
                segments: self.segments.clone(),
            })
        }
    }

    struct StubDownloader {
        file_name: Option<String>,
        diagnostic: Option<String>,
    }

    impl StubDownloader {
        fn producing(file_name: &str) -> Self {
            Self {
                file_name: Some(file_name.to_string()),
                diagnostic: None,
            }
        }

        fn failing(diagnostic: &str) -> Self {
            Self {
                file_name: None,
                diagnostic: Some(diagnostic.to_string()),
            }
        }
    }

    impl MediaDownloader for StubDownloader {
        fn fetch_audio(&self, _url: &str, staging_dir: &Path) -> Result<(), DownloadFailure> {
            if let Some(ref diagnostic) = self.diagnostic {
                return Err(DownloadFailure::new(diagnostic.clone()));
            }
            if let Some(ref file_name) = self.file_name {
                fs::write(staging_dir.join(file_name), b"fake audio").unwrap();
            }
            Ok(())
        }
    }

    struct Harness {
        _dir: TempDir,
        root: PathBuf,
        events: Arc<Mutex<Vec<JobEvent>>>,
        engine: Arc<StubEngine>,
        orchestrator: JobOrchestrator,
    }

    fn harness(engine: StubEngine, downloader: StubDownloader) -> Harness {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();

        let mut settings = Settings::default();
        settings.paths.output_folder = root.join("output").to_string_lossy().to_string();
        settings.paths.staging_folder = root.join("staging").to_string_lossy().to_string();
        settings.paths.models_folder = root.join("models").to_string_lossy().to_string();
        settings.paths.logs_folder = root.join("logs").to_string_lossy().to_string();

        let events: Arc<Mutex<Vec<JobEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Box::new(move |event| sink.lock().push(event));

        let engine = Arc::new(engine);
        let orchestrator = JobOrchestrator::new(
            settings,
            Arc::clone(&engine) as Arc<dyn SpeechEngine>,
            Arc::new(downloader),
            callback,
        );

        Harness {
            _dir: dir,
            root,
            events,
            engine,
            orchestrator,
        }
    }

    fn local_request(path: &Path) -> JobRequest {
        JobRequest {
            source_kind: SourceKind::Local,
            source_ref: path.to_string_lossy().to_string(),
            language_hint: None,
            model_size: ModelSize::Base,
            translate: false,
            include_timestamps: false,
        }
    }

    fn remote_request() -> JobRequest {
        JobRequest {
            source_kind: SourceKind::Remote,
            source_ref: "https://example.com/watch?v=abc".to_string(),
            language_hint: None,
            model_size: ModelSize::Base,
            translate: false,
            include_timestamps: false,
        }
    }

    fn wait_done(harness: &Harness) {
        for _ in 0..1000 {
            if !harness.orchestrator.is_active() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("job did not reach a terminal state");
    }

    fn outcomes(harness: &Harness) -> Vec<JobOutcome> {
        harness
            .events
            .lock()
            .iter()
            .filter_map(|e| match e {
                JobEvent::Outcome(outcome) => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    fn make_input(harness: &Harness, name: &str) -> PathBuf {
        let path = harness.root.join(name);
        fs::write(&path, b"fake audio").unwrap();
        path
    }

    #[test]
    fn local_job_writes_exactly_one_transcript() {
        let h = harness(StubEngine::speaking("hello world"), StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        h.orchestrator.start(local_request(&input)).unwrap();
        wait_done(&h);

        let outcomes = outcomes(&h);
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            JobOutcome::Success {
                result, saved_path, ..
            } => {
                assert_eq!(result.text, "hello world");
                assert_eq!(result.word_count, 2);
                assert!(saved_path.exists());
                assert_eq!(fs::read_to_string(saved_path).unwrap(), "hello world");
            }
            other => panic!("expected success, got {:?}", other),
        }

        let written: Vec<_> = fs::read_dir(h.root.join("output")).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn timestamped_output_is_rendered_into_the_file() {
        let mut engine = StubEngine::speaking("hi bye");
        engine.segments = Some(vec![
            Segment {
                start: 0.0,
                end: 5.0,
                text: "hi".to_string(),
            },
            Segment {
                start: 65.0,
                end: 70.0,
                text: "bye".to_string(),
            },
        ]);
        let h = harness(engine, StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        let mut request = local_request(&input);
        request.include_timestamps = true;
        h.orchestrator.start(request).unwrap();
        wait_done(&h);

        match &outcomes(&h)[0] {
            JobOutcome::Success { saved_path, .. } => {
                assert_eq!(
                    fs::read_to_string(saved_path).unwrap(),
                    "[00:00 - 00:05] hi\n[01:05 - 01:10] bye\n"
                );
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn second_start_is_refused_while_active() {
        let mut engine = StubEngine::speaking("slow result");
        engine.delay = Duration::from_millis(300);
        let h = harness(engine, StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        h.orchestrator.start(local_request(&input)).unwrap();
        thread::sleep(Duration::from_millis(50));

        let second = h.orchestrator.start(local_request(&input));
        assert!(matches!(second, Err(StartError::AlreadyRunning)));

        wait_done(&h);
        let outcomes = outcomes(&h);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
    }

    #[test]
    fn invalid_request_is_rejected_with_no_events() {
        let h = harness(StubEngine::speaking("x"), StubDownloader::producing("x.mp3"));

        let mut request = remote_request();
        request.source_ref = "not a url".to_string();

        let result = h.orchestrator.start(request);
        assert!(matches!(result, Err(StartError::Rejected(_))));
        assert!(!h.orchestrator.is_active());
        assert!(h.events.lock().is_empty());
    }

    #[test]
    fn download_failure_surfaces_the_raw_diagnostic() {
        let h = harness(
            StubEngine::speaking("x"),
            StubDownloader::failing("ERROR: Video unavailable"),
        );

        h.orchestrator.start(remote_request()).unwrap();
        wait_done(&h);

        match &outcomes(&h)[0] {
            JobOutcome::Failure { kind, message, .. } => {
                assert_eq!(*kind, JobErrorKind::DownloadError);
                assert!(message.contains("ERROR: Video unavailable"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn temporary_audio_is_removed_after_success() {
        let h = harness(
            StubEngine::speaking("downloaded words"),
            StubDownloader::producing("Example Clip.mp3"),
        );

        h.orchestrator.start(remote_request()).unwrap();
        wait_done(&h);

        assert!(outcomes(&h)[0].is_success());
        assert!(!h.root.join("staging").join("Example Clip.mp3").exists());
    }

    #[test]
    fn temporary_audio_is_removed_after_failure_too() {
        let mut engine = StubEngine::speaking("never used");
        engine.fail_transcribe = true;
        let h = harness(engine, StubDownloader::producing("Example Clip.mp3"));

        h.orchestrator.start(remote_request()).unwrap();
        wait_done(&h);

        match &outcomes(&h)[0] {
            JobOutcome::Failure { kind, .. } => {
                assert_eq!(*kind, JobErrorKind::TranscriptionError)
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!h.root.join("staging").join("Example Clip.mp3").exists());
    }

    #[test]
    fn whitespace_only_transcript_is_an_empty_result() {
        let h = harness(StubEngine::speaking("   \n\t"), StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        h.orchestrator.start(local_request(&input)).unwrap();
        wait_done(&h);

        match &outcomes(&h)[0] {
            JobOutcome::Failure { kind, .. } => assert_eq!(*kind, JobErrorKind::EmptyResult),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn model_cache_survives_across_jobs() {
        let h = harness(StubEngine::speaking("words"), StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        h.orchestrator.start(local_request(&input)).unwrap();
        wait_done(&h);
        h.orchestrator.start(local_request(&input)).unwrap();
        wait_done(&h);

        assert_eq!(outcomes(&h).len(), 2);
        // Same size twice across two jobs: exactly one engine load.
        assert_eq!(h.engine.loads.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.orchestrator.models.lock().current_size(),
            Some(ModelSize::Base)
        );
    }

    #[test]
    fn statuses_walk_the_lifecycle_in_order() {
        let h = harness(StubEngine::speaking("words"), StubDownloader::producing("x.mp3"));
        let input = make_input(&h, "talk.mp3");

        h.orchestrator.start(local_request(&input)).unwrap();
        wait_done(&h);

        let phases: Vec<JobPhase> = h
            .events
            .lock()
            .iter()
            .filter_map(|e| match e {
                JobEvent::Status { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();

        assert_eq!(
            phases,
            vec![
                JobPhase::Resolving,
                JobPhase::ModelLoading,
                JobPhase::Transcribing,
                JobPhase::Formatting,
                JobPhase::Persisting,
                JobPhase::Completed,
            ]
        );
    }
}
