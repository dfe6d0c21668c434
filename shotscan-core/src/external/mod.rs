//! Interactions with external media tools (ffmpeg and ffprobe).
//!
//! The batch reader depends only on the [`FrameDecoder`] trait, so tests can
//! drive it with a synthetic in-memory decoder. The default implementation,
//! [`SidecarDecoder`], spawns an ffmpeg process via ffmpeg-sidecar and reads
//! raw RGB24 frames from its stdout pipe; video-level metadata comes from
//! the ffprobe crate.

use serde::Serialize;

use crate::error::CoreResult;

pub mod ffprobe_executor;
pub mod sidecar_decoder;

pub use ffprobe_executor::probe_video;
pub use sidecar_decoder::SidecarDecoder;

/// Video-level metadata gathered by the probe step before decoding starts.
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    /// Frames per second.
    pub fps: f64,
    /// Total number of frames in the video.
    pub frames: i64,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Absolute path of the input file.
    pub input_path: String,
    /// Base name of the input file.
    pub input_bname: String,
}

impl VideoMetadata {
    /// Size in bytes of one decoded RGB24 frame.
    pub fn frame_len(&self) -> usize {
        self.height as usize * self.width as usize * 3
    }
}

/// A source of decoded video frames.
///
/// Implementations decode one frame per call in presentation order. A frame
/// is `height * width * 3` bytes of RGB24 pixel data, row-major.
pub trait FrameDecoder {
    /// Metadata for the video being decoded.
    fn metadata(&self) -> &VideoMetadata;

    /// Decodes the next frame into `dst`. Returns `Ok(false)` once the
    /// stream is exhausted; after that, every call returns `Ok(false)`.
    fn read_frame(&mut self, dst: &mut [u8]) -> CoreResult<bool>;
}
