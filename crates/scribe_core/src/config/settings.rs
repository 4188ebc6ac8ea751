//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so a partial file loads cleanly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::{ModelSize, AUTO_LANGUAGE};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Defaults applied to new jobs.
    #[serde(default)]
    pub job: JobSettings,
}

/// Directory configuration for output, staging, models, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder transcripts are written to.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Staging folder for downloaded media and scratch files.
    #[serde(default = "default_staging_folder")]
    pub staging_folder: String,

    /// Folder holding ggml model files.
    #[serde(default = "default_models_folder")]
    pub models_folder: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_staging_folder() -> String {
    "downloads".to_string()
}

fn default_models_folder() -> String {
    "models".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            staging_folder: default_staging_folder(),
            models_folder: default_models_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output_folder)
    }

    pub fn staging_dir(&self) -> PathBuf {
        PathBuf::from(&self.staging_folder)
    }

    pub fn models_dir(&self) -> PathBuf {
        PathBuf::from(&self.models_folder)
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.logs_folder)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Compact mode: external tool output goes to the tail buffer only.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of buffered tool-output lines replayed after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,

    /// Prefix log lines with a wall-clock timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: default_true(),
            error_tail: default_error_tail(),
            show_timestamps: default_true(),
        }
    }
}

/// Per-job defaults, overridable by the presentation surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// Model size used when the request does not choose one.
    #[serde(default)]
    pub default_model: ModelSize,

    /// Language hint, `"auto"` for engine detection.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Translate to English by default.
    #[serde(default)]
    pub translate: bool,

    /// Include segment timestamps by default.
    #[serde(default)]
    pub include_timestamps: bool,
}

fn default_language() -> String {
    AUTO_LANGUAGE.to_string()
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            default_model: ModelSize::default(),
            default_language: default_language(),
            translate: false,
            include_timestamps: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.paths.output_folder, "output");
        assert_eq!(settings.job.default_model, ModelSize::Base);
        assert!(settings.logging.compact);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings =
            toml::from_str("[paths]\noutput_folder = \"transcripts\"\n").unwrap();
        assert_eq!(settings.paths.output_folder, "transcripts");
        assert_eq!(settings.paths.staging_folder, "downloads");
    }

    #[test]
    fn model_size_parses_from_toml() {
        let settings: Settings = toml::from_str("[job]\ndefault_model = \"small\"\n").unwrap();
        assert_eq!(settings.job.default_model, ModelSize::Small);
    }
}
