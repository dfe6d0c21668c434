//! Streaming frame-batch buffer with one batch of lookahead.
//!
//! [`VideoBatchReader`] owns a ring buffer holding `2 * batch_size` decoded
//! frames: the left half is the current batch, the right half the lookahead
//! needed to compare the last frame of a batch against the first frame of
//! the next one. Each call to [`VideoBatchReader::next_batch`] shifts the
//! window left by one batch and refills the lookahead half from the
//! decoder, zero-filling once the stream is exhausted.
//!
//! The returned [`FrameBatch`] borrows the buffer, so it is valid only
//! until the next call to `next_batch` — the borrow checker enforces the
//! "extract your signals before advancing" contract.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::external::{FrameDecoder, SidecarDecoder, VideoMetadata};

/// A read-only view over a `2 * batch_size` window of decoded frames.
///
/// Indices `[0, batch_size)` are the current batch; `[batch_size,
/// 2 * batch_size)` are one batch of lookahead. At the ends of the stream
/// the window is padded with all-black (zero) frames.
pub struct FrameBatch<'a> {
    img: &'a [u8],
    width: u32,
    height: u32,
    bsize: usize,
    fnames: Vec<i64>,
    /// Time code (milliseconds) at the start of the current batch.
    pub start: f64,
    /// Time code (milliseconds) at the end of the current batch.
    pub end: f64,
    /// True for the terminal batch; the lookahead half is zero-filled.
    pub finished: bool,
    /// Batch sequence number; batch `n` covers frames `[n*B, (n+1)*B)`.
    pub bnum: i64,
}

impl<'a> FrameBatch<'a> {
    /// Number of frames in the current batch (half the window).
    pub fn bsize(&self) -> usize {
        self.bsize
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in bytes of one frame.
    pub fn frame_len(&self) -> usize {
        self.height as usize * self.width as usize * 3
    }

    /// Pixel data for the whole window, current batch plus lookahead.
    ///
    /// Use this when an annotator needs to look ahead of the current batch,
    /// such as the frame-difference computation.
    pub fn frames(&self) -> &'a [u8] {
        self.img
    }

    /// Pixel data for just the current batch.
    pub fn batch(&self) -> &'a [u8] {
        &self.img[..self.bsize * self.frame_len()]
    }

    /// Pixel data for one frame of the window, `idx` in `[0, 2 * bsize)`.
    pub fn frame(&self, idx: usize) -> &'a [u8] {
        let len = self.frame_len();
        &self.img[idx * len..(idx + 1) * len]
    }

    /// Global frame indices covered by the current batch.
    pub fn frame_names(&self) -> &[i64] {
        &self.fnames
    }
}

/// Pulls frames from a [`FrameDecoder`] and emits [`FrameBatch`] windows.
pub struct VideoBatchReader<D> {
    decoder: D,
    bsize: usize,
    frame_len: usize,
    width: u32,
    height: u32,
    fps: f64,
    buf: Vec<u8>,
    fcount: i64,
    decoded: i64,
    end_msec: f64,
    finished: bool,
    continue_read: bool,
    max_batch: i64,
}

impl VideoBatchReader<SidecarDecoder> {
    /// Opens a video file with the default ffmpeg-backed decoder.
    pub fn open(input_path: &Path, batch_size: usize) -> CoreResult<Self> {
        Self::from_decoder(SidecarDecoder::open(input_path)?, batch_size)
    }
}

impl<D: FrameDecoder> VideoBatchReader<D> {
    /// Wraps an already-open decoder.
    ///
    /// Primes the lookahead half of the buffer with one full batch, so the
    /// first `next_batch` call can deliver a fully populated current half.
    pub fn from_decoder(decoder: D, batch_size: usize) -> CoreResult<Self> {
        if batch_size == 0 {
            return Err(CoreError::Config("batch_size must be at least 1".into()));
        }

        let meta = decoder.metadata();
        let frame_len = meta.frame_len();
        let max_batch = (meta.frames as f64 / batch_size as f64).ceil() as i64;

        let mut reader = Self {
            width: meta.width,
            height: meta.height,
            fps: meta.fps,
            decoder,
            bsize: batch_size,
            frame_len,
            buf: vec![0u8; 2 * batch_size * frame_len],
            fcount: 0,
            decoded: 0,
            end_msec: 0.0,
            finished: false,
            continue_read: true,
            max_batch,
        };
        reader.fill_lookahead();
        Ok(reader)
    }

    /// Metadata of the underlying video.
    pub fn metadata(&self) -> &VideoMetadata {
        self.decoder.metadata()
    }

    /// Number of frames per batch.
    pub fn batch_size(&self) -> usize {
        self.bsize
    }

    /// Number of batches expected from the probed frame count. Used for
    /// progress reporting only; the terminal batch may follow it.
    pub fn max_batch(&self) -> i64 {
        self.max_batch
    }

    /// Advances the window by one batch and returns the new view, or `None`
    /// once the terminal batch has already been delivered.
    ///
    /// The returned batch borrows the internal buffer and is overwritten by
    /// the next call; extract any derived signals before advancing.
    pub fn next_batch(&mut self) -> Option<FrameBatch<'_>> {
        if self.finished {
            return None;
        }

        // Shift the window left by one batch, discarding the oldest frames.
        let half = self.bsize * self.frame_len;
        self.buf.copy_within(half.., 0);

        if self.continue_read {
            self.fill_lookahead();
        } else {
            self.finished = true;
            self.buf[half..].fill(0);
        }

        let frame_start = self.fcount;
        let start = self.end_msec;
        self.end_msec = if self.fps > 0.0 {
            self.decoded as f64 / self.fps * 1000.0
        } else {
            0.0
        };
        self.fcount += self.bsize as i64;

        let fnames: Vec<i64> = (frame_start..frame_start + self.bsize as i64).collect();

        Some(FrameBatch {
            img: &self.buf,
            width: self.width,
            height: self.height,
            bsize: self.bsize,
            fnames,
            start,
            end: self.end_msec,
            finished: self.finished,
            bnum: frame_start / self.bsize as i64,
        })
    }

    /// Reads one batch of frames into the lookahead half, zero-filling the
    /// rest once the decoder is exhausted. Decode errors are normalized to
    /// end of stream; no frame is ever retried.
    fn fill_lookahead(&mut self) {
        let half = self.bsize * self.frame_len;
        for idx in 0..self.bsize {
            let slot = half + idx * self.frame_len;
            match self
                .decoder
                .read_frame(&mut self.buf[slot..slot + self.frame_len])
            {
                Ok(true) => {
                    self.decoded += 1;
                }
                Ok(false) => {
                    self.continue_read = false;
                }
                Err(err) => {
                    log::warn!("decoder failure treated as end of stream: {err}");
                    self.continue_read = false;
                }
            }
            if !self.continue_read {
                self.buf[slot..].fill(0);
                break;
            }
        }
    }
}
