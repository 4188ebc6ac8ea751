//! Resolve step - turns the media reference into a local audio file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::{JobPhase, ResolvedAudio, SourceKind};
use crate::orchestrator::errors::{JobError, StepResult};
use crate::orchestrator::step::JobStep;
use crate::orchestrator::types::{Context, JobState};

/// Resolve step for acquiring the input audio.
///
/// Remote references go through the downloader collaborator into the
/// staging directory; local references are checked and normalized.
pub struct ResolveStep;

impl ResolveStep {
    pub fn new() -> Self {
        Self
    }

    fn resolve_remote(&self, ctx: &Context) -> StepResult<ResolvedAudio> {
        let url = ctx.request.source_ref.trim();
        let staging = ctx.staging_dir();

        fs::create_dir_all(&staging)
            .map_err(|e| JobError::download(format!("creating staging directory: {}", e)))?;

        ctx.logger.command(&format!("fetch bestaudio {}", url));

        if let Err(failure) = ctx.downloader.fetch_audio(url, &staging) {
            for line in failure.diagnostic.lines() {
                ctx.logger.output_line(line, true);
            }
            ctx.logger.show_tail("downloader output");
            return Err(JobError::download(failure.diagnostic));
        }

        let newest = newest_audio_file(&staging)
            .map_err(|e| JobError::download(format!("scanning staging directory: {}", e)))?
            .ok_or_else(|| JobError::download("download finished but produced no audio file"))?;

        let display_title = title_from_path(&newest);
        ctx.logger
            .info(&format!("Downloaded: {}", newest.display()));

        Ok(ResolvedAudio {
            file_path: newest,
            display_title,
            is_temporary: true,
        })
    }

    fn resolve_local(&self, ctx: &Context) -> StepResult<ResolvedAudio> {
        let reference = ctx.request.source_ref.trim();
        let path = Path::new(reference);

        if !path.exists() || !path.is_file() {
            return Err(JobError::input_not_found(reference));
        }

        let file_path = path
            .canonicalize()
            .map_err(|e| JobError::input_not_found(format!("{} ({})", reference, e)))?;
        let display_title = title_from_path(&file_path);

        Ok(ResolvedAudio {
            file_path,
            display_title,
            is_temporary: false,
        })
    }
}

impl Default for ResolveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStep for ResolveStep {
    fn name(&self) -> &str {
        "Resolve"
    }

    fn phase(&self) -> JobPhase {
        JobPhase::Resolving
    }

    fn status_message(&self, ctx: &Context) -> String {
        match ctx.request.source_kind {
            SourceKind::Remote => "Downloading audio from source...".to_string(),
            SourceKind::Local => "Checking input file...".to_string(),
        }
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        if ctx.request.source_ref.trim().is_empty() {
            return Err(JobError::invalid_request("no media reference provided"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let resolved = match ctx.request.source_kind {
            SourceKind::Remote => self.resolve_remote(ctx)?,
            SourceKind::Local => self.resolve_local(ctx)?,
        };

        ctx.logger
            .info(&format!("Input resolved: '{}'", resolved.display_title));
        state.resolved = Some(resolved);

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let resolved = state
            .resolved
            .as_ref()
            .ok_or_else(|| JobError::input_not_found("no resolved audio recorded"))?;

        if !resolved.file_path.is_file() {
            return Err(JobError::input_not_found(
                resolved.file_path.display().to_string(),
            ));
        }

        Ok(())
    }
}

/// Derive a display title from a file name stem.
fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "transcription".to_string())
}

/// The newest `.mp3` artifact in the staging directory, by creation time
/// (falling back to modification time where creation time is unsupported).
fn newest_audio_file(staging: &Path) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(staging)? {
        let entry = entry?;
        let path = entry.path();

        let is_mp3 = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mp3"));
        if !is_mp3 || !path.is_file() {
            continue;
        }

        let meta = entry.metadata()?;
        let stamp = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if newest.as_ref().map_or(true, |(t, _)| stamp >= *t) {
            newest = Some((stamp, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}
