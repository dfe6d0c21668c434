//! Frame decoding through an ffmpeg child process.
//!
//! Spawns ffmpeg with a rawvideo rgb24 pipe output and drains the
//! ffmpeg-sidecar event iterator one frame at a time. Decode problems close
//! to end of stream are logged and normalized into end-of-stream; the only
//! hard failures are spawn-time ones.

use std::path::Path;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;

use crate::error::{CoreError, CoreResult};
use crate::external::{ffprobe_executor::probe_video, FrameDecoder, VideoMetadata};

/// Production [`FrameDecoder`] backed by an ffmpeg child process.
pub struct SidecarDecoder {
    metadata: VideoMetadata,
    child: FfmpegChild,
    events: FfmpegIterator,
}

impl SidecarDecoder {
    /// Probes `input_path` and spawns the decoding process.
    pub fn open(input_path: &Path) -> CoreResult<Self> {
        let metadata = probe_video(input_path)?;

        log::debug!(
            "Spawning ffmpeg rawvideo decoder for {} ({}x{} @ {:.3} fps, {} frames)",
            input_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.frames
        );

        let mut child = FfmpegCommand::new()
            .input(input_path.to_string_lossy().as_ref())
            .args(["-an"])
            .rawvideo()
            .spawn()
            .map_err(|e| CoreError::Decoder(format!("failed to start ffmpeg: {e}")))?;

        let events = child
            .iter()
            .map_err(|e| CoreError::Decoder(format!("failed to get ffmpeg event iterator: {e}")))?;

        Ok(Self {
            metadata,
            child,
            events,
        })
    }
}

impl FrameDecoder for SidecarDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_frame(&mut self, dst: &mut [u8]) -> CoreResult<bool> {
        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    if frame.data.len() != dst.len() {
                        return Err(CoreError::Decoder(format!(
                            "unexpected frame size: got {} bytes, expected {}",
                            frame.data.len(),
                            dst.len()
                        )));
                    }
                    dst.copy_from_slice(&frame.data);
                    return Ok(true);
                }
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                    // ffmpeg reports truncated trailing packets here; the
                    // reader treats a short read as end of stream.
                    log::debug!("ffmpeg: {message}");
                }
                FfmpegEvent::Error(message) => {
                    log::warn!("ffmpeg: {message}");
                }
                FfmpegEvent::Done => break,
                _ => {}
            }
        }
        Ok(false)
    }
}

impl Drop for SidecarDecoder {
    fn drop(&mut self) {
        // The reader may stop mid-stream (cancellation); make sure the
        // child process does not linger.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
