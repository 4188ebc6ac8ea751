//! Audio decoding for the engine.
//!
//! whisper.cpp wants 16 kHz mono f32 samples. Any container ffmpeg can
//! read is decoded through a scratch WAV file in the staging directory,
//! read back with hound, and removed afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{EngineError, EngineResult};

/// Sample rate the engine expects.
pub const SAMPLE_RATE: u32 = 16_000;

/// Decode `input` to 16 kHz mono f32 samples via an ffmpeg subprocess.
pub fn decode_to_samples(input: &Path, scratch_dir: &Path) -> EngineResult<Vec<f32>> {
    fs::create_dir_all(scratch_dir)
        .map_err(|e| EngineError::audio_decode(format!("creating scratch directory: {}", e)))?;

    let wav_path = scratch_wav_path(scratch_dir);

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(input)
        .args(["-ar", "16000", "-ac", "1", "-f", "wav", "-y"])
        .arg(&wav_path)
        .output()
        .map_err(|e| {
            EngineError::audio_decode(format!(
                "failed to run ffmpeg (is it installed?): {}",
                e
            ))
        })?;

    if !output.status.success() {
        let _ = fs::remove_file(&wav_path);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::audio_decode(stderr.trim().to_string()));
    }

    let samples = read_wav_samples(&wav_path);
    let _ = fs::remove_file(&wav_path);
    samples
}

/// Unique scratch file name so concurrent processes never collide.
fn scratch_wav_path(scratch_dir: &Path) -> PathBuf {
    let unique = format!(
        "{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    scratch_dir.join(format!("decode_{}.wav", unique))
}

/// Read a WAV file into f32 samples, normalizing integer formats.
fn read_wav_samples(path: &Path) -> EngineResult<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| EngineError::audio_decode(format!("reading decoded wav: {}", e)))?;

    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
    };

    samples.map_err(|e| EngineError::audio_decode(format!("reading decoded wav: {}", e)))
}
