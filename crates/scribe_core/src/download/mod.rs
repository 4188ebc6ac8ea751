//! Remote media acquisition.
//!
//! The downloader collaborator turns a URL into an audio file in the
//! staging directory. The production implementation shells out to yt-dlp;
//! the trait seam keeps the pipeline testable without network access.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// A failed download. `diagnostic` is the tool's raw output, surfaced
/// verbatim to the user.
#[derive(Error, Debug)]
#[error("{diagnostic}")]
pub struct DownloadFailure {
    pub diagnostic: String,
}

impl DownloadFailure {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// Collaborator that fetches remote media as local audio.
pub trait MediaDownloader: Send + Sync {
    /// Fetch the best available audio for `url` into `staging_dir` as an
    /// mp3 file named after the media title.
    fn fetch_audio(&self, url: &str, staging_dir: &Path) -> Result<(), DownloadFailure>;
}

/// yt-dlp backed downloader.
///
/// Invocation: best audio, extracted to mp3, title-derived filename capped
/// at 100 characters, no playlist expansion.
pub struct YtDlpDownloader {
    /// Path to the yt-dlp executable (None = find in PATH).
    binary_path: Option<PathBuf>,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self { binary_path: None }
    }

    /// Set a custom path to the yt-dlp executable.
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    fn binary_cmd(&self) -> &str {
        self.binary_path
            .as_ref()
            .and_then(|p| p.to_str())
            .unwrap_or("yt-dlp")
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDownloader for YtDlpDownloader {
    fn fetch_audio(&self, url: &str, staging_dir: &Path) -> Result<(), DownloadFailure> {
        let output_template = staging_dir.join("%(title).100s.%(ext)s");

        let mut cmd = Command::new(self.binary_cmd());
        cmd.args(["-f", "bestaudio/best", "--extract-audio", "--audio-format", "mp3"])
            .arg("-o")
            .arg(&output_template)
            .arg("--no-playlist")
            .arg(url);

        tracing::debug!(
            "Running: {} -f bestaudio/best --extract-audio --audio-format mp3 -o {} --no-playlist {}",
            self.binary_cmd(),
            output_template.display(),
            url
        );

        let output = cmd.output().map_err(|e| {
            DownloadFailure::new(format!("failed to run {}: {}", self.binary_cmd(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).to_string()
            } else {
                stderr.to_string()
            };
            return Err(DownloadFailure::new(diagnostic));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn failure_displays_raw_diagnostic() {
        let failure = DownloadFailure::new("ERROR: Video unavailable");
        assert_eq!(failure.to_string(), "ERROR: Video unavailable");
    }

    #[test]
    fn downloader_with_custom_binary_path() {
        let downloader = YtDlpDownloader::new().with_binary_path("/opt/bin/yt-dlp");
        assert_eq!(downloader.binary_cmd(), "/opt/bin/yt-dlp");
    }

    #[test]
    fn missing_binary_reports_diagnostic() {
        let dir = tempdir().unwrap();
        let downloader = YtDlpDownloader::new().with_binary_path("/nonexistent/yt-dlp");

        let err = downloader
            .fetch_audio("https://example.com/watch?v=1", dir.path())
            .unwrap_err();
        assert!(err.diagnostic.contains("failed to run"));
    }
}
