//! Audio Scribe command line front end.
//!
//! Thin presentation surface over `scribe_core`: collects the source,
//! language, model and option choices, then renders status lines, a live
//! elapsed timer, and the final transcript.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scribe_core::config::ConfigManager;
use scribe_core::download::YtDlpDownloader;
use scribe_core::engine::WhisperSpeech;
use scribe_core::models::{
    JobOutcome, JobRequest, ModelSize, SourceKind, ALL_SIZES, AUTO_LANGUAGE,
};
use scribe_core::orchestrator::{JobEvent, JobOrchestrator, StartError};

#[derive(Parser)]
#[command(
    name = "audio-scribe",
    version,
    about = "Transcribe audio or video from a URL or a local file",
    after_help = extra_help()
)]
struct Cli {
    /// Media source: an http(s) URL or a local file path.
    source: String,

    /// Language code hint, or "auto" to let the engine detect it.
    #[arg(short, long, default_value = AUTO_LANGUAGE)]
    language: String,

    /// Model size to transcribe with (defaults to the configured size).
    #[arg(short, long)]
    model: Option<ModelSize>,

    /// Translate the transcript to English.
    #[arg(long)]
    translate: bool,

    /// Include segment timestamps in the transcript.
    #[arg(long)]
    timestamps: bool,

    /// Path to the settings file.
    #[arg(long, default_value = "scribe.toml")]
    config: PathBuf,
}

fn extra_help() -> String {
    let mut help = String::from("Model sizes:\n");
    for size in ALL_SIZES {
        help.push_str(&format!(
            "  {:<8}~{} MB - {}\n",
            size.to_string(),
            size.size_mb(),
            size.description()
        ));
    }
    help.push_str(
        "\nCommon language codes: ar, en, es, fr, de, it, pt, ru, zh, ja, ko, tr, hi, nl, pl\n\
         Any other code the engine understands is passed through verbatim.",
    );
    help
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ConfigManager::new(&cli.config);
    config.load_or_create()?;
    config.ensure_dirs_exist()?;
    let settings = config.settings().clone();

    let source_kind = if cli.source.starts_with("http://") || cli.source.starts_with("https://") {
        SourceKind::Remote
    } else {
        SourceKind::Local
    };

    let request = JobRequest {
        source_kind,
        source_ref: cli.source,
        language_hint: Some(cli.language),
        model_size: cli.model.unwrap_or(settings.job.default_model),
        translate: cli.translate || settings.job.translate,
        include_timestamps: cli.timestamps || settings.job.include_timestamps,
    };

    let engine = Arc::new(WhisperSpeech::new(
        settings.paths.models_dir(),
        settings.paths.staging_dir(),
    ));
    let downloader = Arc::new(YtDlpDownloader::new());

    // Worker events are marshalled back onto this thread via the channel.
    let (tx, rx) = mpsc::channel::<JobEvent>();
    let orchestrator = JobOrchestrator::new(
        settings,
        engine,
        downloader,
        Box::new(move |event| {
            let _ = tx.send(event);
        }),
    );

    match orchestrator.start(request) {
        Ok(()) => {}
        Err(StartError::AlreadyRunning) => return Err("a job is already running".into()),
        Err(StartError::Rejected(e)) => return Err(e.to_string().into()),
    }

    for event in rx {
        match event {
            JobEvent::Status { message, .. } => {
                println!("{}", message);
            }
            JobEvent::Tick { elapsed_seconds } => {
                eprint!(
                    "\r  elapsed {:02}:{:02} ",
                    elapsed_seconds / 60,
                    elapsed_seconds % 60
                );
                let _ = io::stderr().flush();
            }
            JobEvent::Outcome(outcome) => {
                eprintln!();
                return finish(outcome);
            }
        }
    }

    Err("event channel closed before an outcome was delivered".into())
}

fn finish(outcome: JobOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        JobOutcome::Success {
            result,
            saved_path,
            elapsed,
        } => {
            println!();
            println!("{}", result.text);
            println!();
            println!("Words: {}", result.word_count);
            println!("Saved to: {}", saved_path.display());
            println!(
                "Completed in {:02}:{:02}",
                elapsed.as_secs() / 60,
                elapsed.as_secs() % 60
            );
            Ok(())
        }
        JobOutcome::Failure {
            kind,
            message,
            guidance,
        } => {
            let mut text = format!("{} [{}]", message, kind);
            if let Some(tip) = guidance {
                text.push_str(&format!("\nTip: {}", tip));
            }
            Err(text.into())
        }
    }
}
