//! Transcript persistence and temporary-media cleanup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::logging::JobLogger;
use crate::models::ResolvedAudio;
use crate::orchestrator::errors::JobError;

/// Maximum length of the sanitized title inside the filename.
const MAX_TITLE_LEN: usize = 100;

/// Sanitize a media title for use in a filename.
///
/// Characters outside alphanumerics, space, and `-_.()` are replaced
/// one-for-one with `_`; the result is capped at 100 characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_TITLE_LEN)
        .collect()
}

/// Build the transcript filename for a title at a given time.
pub fn build_filename(title: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}_transcript.txt",
        sanitize_title(title),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Write the transcript under the output directory, creating it on demand.
///
/// A same-second name collision overwrites the earlier file; that risk is
/// accepted rather than mitigated.
pub fn persist(text: &str, title: &str, output_dir: &Path) -> Result<PathBuf, JobError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| JobError::write(format!("creating output directory: {}", e)))?;

    let path = output_dir.join(build_filename(title, Local::now()));
    fs::write(&path, text)
        .map_err(|e| JobError::write(format!("writing {}: {}", path.display(), e)))?;

    Ok(path)
}

/// Delete a temporary downloaded audio file, best-effort.
///
/// Failure is logged and swallowed; a stray temp file never turns a
/// finished job into a failed one.
pub fn remove_temp_audio(resolved: &ResolvedAudio, logger: &JobLogger) {
    if !resolved.is_temporary || !resolved.file_path.exists() {
        return;
    }

    match fs::remove_file(&resolved.file_path) {
        Ok(()) => logger.info(&format!(
            "Removed temporary audio: {}",
            resolved.file_path.display()
        )),
        Err(e) => logger.warn(&format!(
            "Could not remove temporary audio {}: {}",
            resolved.file_path.display(),
            e
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use tempfile::tempdir;

    #[test]
    fn sanitizes_title_one_for_one() {
        assert_eq!(
            sanitize_title("Quarterly Report: Q1/Q2!!"),
            "Quarterly Report_ Q1_Q2__"
        );
    }

    #[test]
    fn safe_characters_pass_through() {
        assert_eq!(sanitize_title("A-b_c.d (e) 9"), "A-b_c.d (e) 9");
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_title(&long).chars().count(), 100);
    }

    #[test]
    fn filename_has_timestamp_and_suffix() {
        let now = Local::now();
        let name = build_filename("My Talk", now);
        assert!(name.starts_with("My Talk_"));
        assert!(name.ends_with("_transcript.txt"));
    }

    #[test]
    fn persist_writes_verbatim_content() {
        let dir = tempdir().unwrap();
        let path = persist("the transcript text", "title", dir.path()).unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "the transcript text");
    }

    #[test]
    fn persist_creates_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = persist("text", "t", &nested).unwrap();
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn cleanup_removes_temporary_file() {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("clip.mp3");
        fs::write(&audio, b"data").unwrap();

        let logger = JobLogger::new("cleanup", dir.path(), LogConfig::default(), None).unwrap();
        let resolved = ResolvedAudio {
            file_path: audio.clone(),
            display_title: "clip".to_string(),
            is_temporary: true,
        };

        remove_temp_audio(&resolved, &logger);
        assert!(!audio.exists());
    }

    #[test]
    fn cleanup_leaves_local_files_alone() {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("keep.mp3");
        fs::write(&audio, b"data").unwrap();

        let logger = JobLogger::new("cleanup", dir.path(), LogConfig::default(), None).unwrap();
        let resolved = ResolvedAudio {
            file_path: audio.clone(),
            display_title: "keep".to_string(),
            is_temporary: false,
        };

        remove_temp_audio(&resolved, &logger);
        assert!(audio.exists());
    }
}
