//! Per-frame metadata annotators: frame dimensions and HSV averages.

use rayon::prelude::*;
use serde::Serialize;

use crate::annotate::imageops::rgb_to_hsv;
use crate::annotate::{AnnotationTable, BatchAnnotator};
use crate::batch::FrameBatch;
use crate::error::CoreResult;

/// Height and width of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct SizeRow {
    pub frame: i64,
    pub height: u32,
    pub width: u32,
}

/// Mean HSV saturation and value of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct AverageRow {
    pub frame: i64,
    pub saturation: f64,
    pub val: f64,
}

/// Annotator recording the dimensions of every current-half frame.
#[derive(Debug, Default)]
pub struct SizeAnnotator;

impl BatchAnnotator for SizeAnnotator {
    fn annotate(&mut self, batch: &FrameBatch<'_>) -> CoreResult<Vec<(String, AnnotationTable)>> {
        let rows = batch
            .frame_names()
            .iter()
            .map(|&frame| SizeRow {
                frame,
                height: batch.height(),
                width: batch.width(),
            })
            .collect();
        Ok(vec![("size".to_string(), AnnotationTable::Size(rows))])
    }
}

/// Annotator recording mean saturation and value per current-half frame.
#[derive(Debug, Default)]
pub struct AverageAnnotator;

impl BatchAnnotator for AverageAnnotator {
    fn annotate(&mut self, batch: &FrameBatch<'_>) -> CoreResult<Vec<(String, AnnotationTable)>> {
        let rows: Vec<AverageRow> = (0..batch.bsize())
            .into_par_iter()
            .map(|i| {
                let mut saturation = 0.0;
                let mut val = 0.0;
                let pixels = batch.frame(i).chunks_exact(3);
                let count = pixels.len() as f64;
                for px in pixels {
                    let hsv = rgb_to_hsv(px[0], px[1], px[2]);
                    saturation += hsv[1];
                    val += hsv[2];
                }
                AverageRow {
                    frame: batch.frame_names()[i],
                    saturation: saturation / count,
                    val: val / count,
                }
            })
            .collect();
        Ok(vec![("average".to_string(), AnnotationTable::Average(rows))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{FrameDecoder, VideoMetadata};
    use crate::VideoBatchReader;

    struct GrayDecoder {
        meta: VideoMetadata,
        remaining: usize,
    }

    impl FrameDecoder for GrayDecoder {
        fn metadata(&self) -> &VideoMetadata {
            &self.meta
        }

        fn read_frame(&mut self, dst: &mut [u8]) -> CoreResult<bool> {
            if self.remaining == 0 {
                return Ok(false);
            }
            dst.fill(125);
            self.remaining -= 1;
            Ok(true)
        }
    }

    fn gray_reader(frames: usize, bsize: usize) -> VideoBatchReader<GrayDecoder> {
        let decoder = GrayDecoder {
            meta: VideoMetadata {
                fps: 10.0,
                frames: frames as i64,
                height: 3,
                width: 5,
                duration_secs: frames as f64 / 10.0,
                input_path: "gray".into(),
                input_bname: "gray".into(),
            },
            remaining: frames,
        };
        VideoBatchReader::from_decoder(decoder, bsize).unwrap()
    }

    #[test]
    fn test_size_rows_follow_frame_names() {
        let mut reader = gray_reader(3, 2);
        let batch = reader.next_batch().unwrap();
        let tables = SizeAnnotator.annotate(&batch).unwrap();
        match &tables[0].1 {
            AnnotationTable::Size(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].frame, 0);
                assert_eq!(rows[1].frame, 1);
                assert_eq!((rows[0].height, rows[0].width), (3, 5));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_average_of_gray_frame() {
        let mut reader = gray_reader(3, 2);
        let batch = reader.next_batch().unwrap();
        let tables = AverageAnnotator.annotate(&batch).unwrap();
        match &tables[0].1 {
            AnnotationTable::Average(rows) => {
                // Solid gray: zero saturation, value equal to the level.
                assert_eq!(rows[0].saturation, 0.0);
                assert_eq!(rows[0].val, 125.0);
            }
            _ => unreachable!(),
        }
    }
}
