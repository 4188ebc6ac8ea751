//! Transcript text rendering.
//!
//! Pure and total over its inputs: the same raw transcription and flag
//! always produce the same string.

use crate::models::RawTranscription;

/// Render a raw transcription into final transcript text.
///
/// Without timestamps (or without segments) this is the trimmed full
/// text. With timestamps, each segment becomes one line:
/// `[MM:SS - MM:SS] <trimmed text>`.
pub fn format(raw: &RawTranscription, include_timestamps: bool) -> String {
    if !include_timestamps {
        return raw.full_text.trim().to_string();
    }

    let segments = match &raw.segments {
        Some(segments) if !segments.is_empty() => segments,
        _ => return raw.full_text.trim().to_string(),
    };

    let mut rendered = String::new();
    for segment in segments {
        rendered.push_str(&format!(
            "[{} - {}] {}\n",
            mm_ss(segment.start),
            mm_ss(segment.end),
            segment.text.trim()
        ));
    }

    if rendered.is_empty() {
        raw.full_text.trim().to_string()
    } else {
        rendered
    }
}

/// Render seconds as `MM:SS`, truncating (not rounding) fractions.
fn mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn raw_with_segments(segments: Vec<Segment>) -> RawTranscription {
        RawTranscription {
            full_text: "hi bye".to_string(),
            segments: Some(segments),
        }
    }

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn renders_timestamped_lines() {
        let raw = raw_with_segments(vec![segment(0.0, 5.0, "hi"), segment(65.0, 70.0, "bye")]);
        assert_eq!(
            format(&raw, true),
            "[00:00 - 00:05] hi\n[01:05 - 01:10] bye\n"
        );
    }

    #[test]
    fn truncates_fractional_seconds() {
        let raw = raw_with_segments(vec![segment(5.9, 119.99, "x")]);
        assert_eq!(format(&raw, true), "[00:05 - 01:59] x\n");
    }

    #[test]
    fn without_timestamps_returns_trimmed_text() {
        let raw = RawTranscription {
            full_text: "  hello world \n".to_string(),
            segments: Some(vec![segment(0.0, 1.0, "hello world")]),
        };
        assert_eq!(format(&raw, false), "hello world");
    }

    #[test]
    fn missing_segments_fall_back_to_full_text() {
        let raw = RawTranscription {
            full_text: "plain text".to_string(),
            segments: None,
        };
        assert_eq!(format(&raw, true), "plain text");
    }

    #[test]
    fn empty_segments_fall_back_to_full_text() {
        let raw = raw_with_segments(vec![]);
        assert_eq!(format(&raw, true), "hi bye");
    }

    #[test]
    fn formatting_is_idempotent() {
        let raw = raw_with_segments(vec![segment(0.0, 5.0, " hi "), segment(65.0, 70.0, "bye")]);
        assert_eq!(format(&raw, true), format(&raw, true));
        assert_eq!(format(&raw, false), format(&raw, false));
    }

    #[test]
    fn segment_text_is_trimmed_per_line() {
        let raw = raw_with_segments(vec![segment(0.0, 2.0, "  padded  ")]);
        assert_eq!(format(&raw, true), "[00:00 - 00:02] padded\n");
    }
}
