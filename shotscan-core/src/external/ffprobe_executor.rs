//! FFprobe integration for extracting video metadata.
//!
//! Runs ffprobe (via the ffprobe crate) once per input to learn the frame
//! rate, frame count, and frame dimensions that size the batch reader's
//! ring buffer.

use std::path::Path;

use ffprobe::ffprobe;

use crate::error::{CoreError, CoreResult};
use crate::external::VideoMetadata;

/// Probes a video file and returns its metadata.
///
/// Fails if ffprobe cannot be executed, the file has no video stream, or
/// the stream is missing dimensions. A missing `nb_frames` (common for
/// stream-copied containers) is estimated from duration and frame rate.
pub fn probe_video(input_path: &Path) -> CoreResult<VideoMetadata> {
    log::debug!(
        "Running ffprobe (via crate) for video metadata on: {}",
        input_path.display()
    );

    let metadata = ffprobe(input_path).map_err(|e| {
        CoreError::Ffprobe(format!("ffprobe failed for {}: {e:?}", input_path.display()))
    })?;

    let stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "no video stream found in {}",
                input_path.display()
            ))
        })?;

    let width = stream.width.filter(|&w| w > 0).ok_or_else(|| {
        CoreError::FfprobeParse(format!(
            "missing video width for {}",
            input_path.display()
        ))
    })? as u32;

    let height = stream.height.filter(|&h| h > 0).ok_or_else(|| {
        CoreError::FfprobeParse(format!(
            "missing video height for {}",
            input_path.display()
        ))
    })? as u32;

    let fps = parse_frame_rate(&stream.avg_frame_rate)
        .or_else(|| parse_frame_rate(&stream.r_frame_rate))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "could not parse frame rate for {}",
                input_path.display()
            ))
        })?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let frames = match stream.nb_frames.as_deref().and_then(|n| n.parse::<i64>().ok()) {
        Some(frames) if frames > 0 => frames,
        _ => {
            let estimate = (duration_secs * fps).round() as i64;
            log::warn!(
                "nb_frames unavailable for {}, estimating {} frames from duration",
                input_path.display(),
                estimate
            );
            estimate
        }
    };

    let input_bname = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(VideoMetadata {
        fps,
        frames,
        height,
        width,
        duration_secs,
        input_path: input_path.to_string_lossy().into_owned(),
        input_bname,
    })
}

/// Parses an ffprobe rational frame rate such as "30000/1001" or "25".
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num, den)) = rate.split_once('/') {
        let num = num.trim().parse::<f64>().ok()?;
        let den = den.trim().parse::<f64>().ok()?;
        if den == 0.0 || num <= 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        rate.trim().parse::<f64>().ok().filter(|&f| f > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_rational() {
        let fps = parse_frame_rate("30000/1001").unwrap();
        assert!((fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_plain() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
    }

    #[test]
    fn test_parse_frame_rate_invalid() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("N/A"), None);
        assert_eq!(parse_frame_rate(""), None);
    }
}
