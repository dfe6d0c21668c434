//! Frame-difference signals: the inputs to cut detection.
//!
//! For each frame of the current batch the annotator compares frame `i`
//! against frame `i + 1` using the full two-batch window, so the last
//! frame of a batch is compared against the first lookahead frame. Two
//! families of signals are produced per configured quantile `q`:
//!
//! - `q{q}`: the q-th percentile of the absolute pixel-wise delta between
//!   downsampled HSV renditions of the two frames;
//! - `h{q}`: the q-th percentile (across histogram dimensions) of the
//!   absolute difference between the frames' full-resolution HSV
//!   histograms, normalized by pixel count x 100.
//!
//! A plain `avg_value` (mean pixel value of the raw frame) is included so
//! aggregation can ignore frames that are too dark to trust.

use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::annotate::imageops::{downsample_hsv, hsv_histogram};
use crate::annotate::{AnnotationTable, BatchAnnotator};
use crate::batch::FrameBatch;
use crate::config::DiffConfig;
use crate::error::CoreResult;
use crate::utils::{mean_u8, percentile};

/// Difference signals for one quantile.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileDiff {
    /// The percentile (0-100) these values were computed at.
    pub q: u8,
    /// Pixel-delta quantile (`q{q}` column).
    pub l1: f64,
    /// Histogram-delta quantile (`h{q}` column).
    pub hist: f64,
}

/// One record of difference signals per frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    /// Global frame index.
    pub frame: i64,
    /// Mean pixel value of the raw frame.
    pub avg_value: f64,
    /// Signals per configured quantile.
    pub quantiles: Vec<QuantileDiff>,
}

impl DiffRow {
    /// Looks up a signal by column name: `avg_value`, `q{q}`, or `h{q}`.
    pub fn value(&self, key: &str) -> Option<f64> {
        if key == "avg_value" {
            return Some(self.avg_value);
        }
        if let Some(num) = key.strip_prefix('q') {
            let q = num.parse::<u8>().ok()?;
            return self.quantiles.iter().find(|d| d.q == q).map(|d| d.l1);
        }
        if let Some(num) = key.strip_prefix('h') {
            let q = num.parse::<u8>().ok()?;
            return self.quantiles.iter().find(|d| d.q == q).map(|d| d.hist);
        }
        None
    }
}

// Serialized flat, one key per column, so the row round-trips as a record
// of the table: {"frame": 4, "avg_value": 101.2, "q40": 3.1, "h40": 0.2}.
impl Serialize for DiffRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + 2 * self.quantiles.len()))?;
        map.serialize_entry("frame", &self.frame)?;
        map.serialize_entry("avg_value", &self.avg_value)?;
        for diff in &self.quantiles {
            map.serialize_entry(&format!("q{}", diff.q), &diff.l1)?;
            map.serialize_entry(&format!("h{}", diff.q), &diff.hist)?;
        }
        map.end()
    }
}

/// Annotator computing the per-frame difference signals.
pub struct DiffAnnotator {
    config: DiffConfig,
}

impl DiffAnnotator {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }
}

impl BatchAnnotator for DiffAnnotator {
    fn annotate(&mut self, batch: &FrameBatch<'_>) -> CoreResult<Vec<(String, AnnotationTable)>> {
        let bsize = batch.bsize();
        let msize = bsize + 1;
        let width = batch.width();
        let height = batch.height();
        let size = self.config.size;
        let bins = self.config.bins;
        let pixel_count = batch.frame_len() as f64;

        // Per-frame precomputation over the first bsize+1 window frames.
        let small: Vec<Vec<f64>> = (0..msize)
            .into_par_iter()
            .map(|i| downsample_hsv(batch.frame(i), width, height, size))
            .collect();
        let hists: Vec<Vec<f64>> = (0..msize)
            .into_par_iter()
            .map(|i| hsv_histogram(batch.frame(i), bins))
            .collect();
        let avg: Vec<f64> = (0..bsize)
            .into_par_iter()
            .map(|i| mean_u8(batch.frame(i)))
            .collect();

        let mut rows = Vec::with_capacity(bsize);
        for i in 0..bsize {
            let pixel_deltas: Vec<f64> = small[i]
                .iter()
                .zip(&small[i + 1])
                .map(|(a, b)| (a - b).abs())
                .collect();
            let hist_deltas: Vec<f64> = hists[i]
                .iter()
                .zip(&hists[i + 1])
                .map(|(a, b)| ((a - b) / pixel_count * 100.0).abs())
                .collect();

            let quantiles = self
                .config
                .quantiles
                .iter()
                .map(|&q| QuantileDiff {
                    q,
                    l1: percentile(&pixel_deltas, f64::from(q)),
                    hist: percentile(&hist_deltas, f64::from(q)),
                })
                .collect();

            rows.push(DiffRow {
                frame: batch.frame_names()[i],
                avg_value: avg[i],
                quantiles,
            });
        }

        Ok(vec![("diff".to_string(), AnnotationTable::Diff(rows))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;
    use crate::external::{FrameDecoder, VideoMetadata};
    use crate::VideoBatchReader;

    struct FixedDecoder {
        meta: VideoMetadata,
        frames: Vec<Vec<u8>>,
        next: usize,
    }

    impl FixedDecoder {
        fn new(frames: Vec<Vec<u8>>) -> Self {
            let meta = VideoMetadata {
                fps: 10.0,
                frames: frames.len() as i64,
                height: 4,
                width: 4,
                duration_secs: frames.len() as f64 / 10.0,
                input_path: "fixed".into(),
                input_bname: "fixed".into(),
            };
            Self {
                meta,
                frames,
                next: 0,
            }
        }
    }

    impl FrameDecoder for FixedDecoder {
        fn metadata(&self) -> &VideoMetadata {
            &self.meta
        }

        fn read_frame(&mut self, dst: &mut [u8]) -> CoreResult<bool> {
            match self.frames.get(self.next) {
                Some(frame) => {
                    dst.copy_from_slice(frame);
                    self.next += 1;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn solid(value: u8) -> Vec<u8> {
        vec![value; 4 * 4 * 3]
    }

    fn annotate_all(frames: Vec<Vec<u8>>, bsize: usize, config: DiffConfig) -> Vec<DiffRow> {
        let mut reader =
            VideoBatchReader::from_decoder(FixedDecoder::new(frames), bsize).unwrap();
        let mut annotator = DiffAnnotator::new(config);
        let mut rows = Vec::new();
        while let Some(batch) = reader.next_batch() {
            let mut tables = annotator.annotate(&batch).unwrap();
            assert_eq!(tables.len(), 1);
            let (label, table) = tables.remove(0);
            assert_eq!(label, "diff");
            assert_eq!(table.len(), bsize);
            match table {
                AnnotationTable::Diff(mut batch_rows) => rows.append(&mut batch_rows),
                _ => unreachable!(),
            }
        }
        rows
    }

    #[test]
    fn test_one_row_per_current_frame_in_order() {
        let frames = (0..5).map(|i| solid(i * 10)).collect();
        let rows = annotate_all(frames, 2, DiffConfig::default());
        let frame_ids: Vec<i64> = rows.iter().map(|r| r.frame).collect();
        // Frame 5 is the padding slot of the terminal batch.
        assert_eq!(frame_ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_constant_video_has_zero_differences() {
        let frames = (0..4).map(|_| solid(90)).collect();
        let mut config = DiffConfig::default();
        config.quantiles = vec![50, 90];
        let rows = annotate_all(frames, 4, config);

        for row in &rows[..3] {
            // Pairs of identical real frames differ by nothing.
            assert_eq!(row.value("q50"), Some(0.0));
            assert_eq!(row.value("h90"), Some(0.0));
            assert_eq!(row.avg_value, 90.0);
        }
    }

    #[test]
    fn test_brightness_jump_shows_in_high_quantile() {
        // Dark frames 0..3, bright frames 3..6: the jump is at the pair
        // (2, 3). Gray solids keep H and S at zero, so only the V third of
        // the pixel deltas moves and a high quantile is needed to see it.
        let mut frames: Vec<Vec<u8>> = (0..3).map(|_| solid(10)).collect();
        frames.extend((0..3).map(|_| solid(200)));

        let mut config = DiffConfig::default();
        config.quantiles = vec![80];
        let rows = annotate_all(frames, 3, config);

        assert_eq!(rows[2].value("q80"), Some(190.0));
        assert_eq!(rows[0].value("q80"), Some(0.0));
        assert_eq!(rows[1].value("q80"), Some(0.0));
        assert_eq!(rows[3].value("q80"), Some(0.0));
    }

    #[test]
    fn test_histogram_diff_normalization() {
        // One dark and one bright solid frame, B=1: the V channel counts
        // move entirely between two bins. Each moved bin differs by the
        // full pixel count, normalized to 100 / 3 per histogram dimension.
        let frames = vec![solid(10), solid(200)];
        let mut config = DiffConfig::default();
        config.quantiles = vec![100];
        let rows = annotate_all(frames, 1, config);

        let expected = 100.0 / 3.0;
        let h100 = rows[0].value("h100").unwrap();
        assert!((h100 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_value_lookup_rejects_unknown_keys() {
        let row = DiffRow {
            frame: 0,
            avg_value: 1.0,
            quantiles: vec![QuantileDiff {
                q: 40,
                l1: 2.0,
                hist: 3.0,
            }],
        };
        assert_eq!(row.value("avg_value"), Some(1.0));
        assert_eq!(row.value("q40"), Some(2.0));
        assert_eq!(row.value("h40"), Some(3.0));
        assert_eq!(row.value("q50"), None);
        assert_eq!(row.value("brightness"), None);
        assert_eq!(row.value(""), None);
    }

    #[test]
    fn test_diff_row_serializes_flat() {
        let row = DiffRow {
            frame: 4,
            avg_value: 10.5,
            quantiles: vec![QuantileDiff {
                q: 40,
                l1: 2.0,
                hist: 0.25,
            }],
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["frame"], 4);
        assert_eq!(json["avg_value"], 10.5);
        assert_eq!(json["q40"], 2.0);
        assert_eq!(json["h40"], 0.25);
    }
}
