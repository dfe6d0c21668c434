//! The pipeline driver: reader -> annotators -> report -> aggregation.
//!
//! Single-threaded and pull-based. The driver owns the loop over
//! `next_batch`, hands each batch to every registered annotator, and
//! accumulates their tables into a [`VideoReport`]. Batches are processed
//! strictly in sequence; a cancellation flag is checked between batches.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::CutAggregator;
use crate::annotate::{BatchAnnotator, DiffAnnotator};
use crate::batch::VideoBatchReader;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::FrameDecoder;
use crate::report::VideoReport;

/// Progress callback: `(batches_done, batches_expected)`.
pub type ProgressFn<'a> = &'a dyn Fn(i64, i64);

/// A set of annotators driven over one video.
#[derive(Default)]
pub struct Pipeline {
    annotators: Vec<Box<dyn BatchAnnotator>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_annotator(&mut self, annotator: Box<dyn BatchAnnotator>) -> &mut Self {
        self.annotators.push(annotator);
        self
    }

    /// Drains the reader, annotating every batch.
    ///
    /// `cancel` is checked between batches; a set flag aborts with
    /// [`CoreError::Cancelled`]. `progress` is invoked after each batch
    /// with the batch count expected from the probed frame count.
    pub fn run<D: FrameDecoder>(
        &mut self,
        reader: &mut VideoBatchReader<D>,
        cancel: Option<&AtomicBool>,
        progress: Option<ProgressFn<'_>>,
    ) -> CoreResult<VideoReport> {
        let mut report = VideoReport::new(reader.metadata().clone());
        let total = reader.max_batch();

        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(CoreError::Cancelled);
                }
            }

            let Some(batch) = reader.next_batch() else {
                break;
            };

            let bnum = batch.bnum;
            for annotator in &mut self.annotators {
                let tables = annotator.annotate(&batch)?;
                report.add_annotations(tables)?;
            }

            log::debug!("annotated batch {} of {total}", bnum + 1);
            if let Some(callback) = progress {
                callback(bnum + 1, total);
            }
        }

        Ok(report)
    }
}

/// Processes one video end to end: difference signals for every frame,
/// then cut aggregation over the whole-video signal table.
///
/// Rows for the zero-padded frame indices past the probed frame count are
/// dropped before aggregation, so the report covers exactly `[0, frames)`.
pub fn process_video(
    config: &CoreConfig,
    cancel: Option<&AtomicBool>,
    progress: Option<ProgressFn<'_>>,
) -> CoreResult<VideoReport> {
    config.validate()?;
    let mut reader = VideoBatchReader::open(&config.input_path, config.batch_size)?;
    process_with_reader(config, &mut reader, Vec::new(), cancel, progress)
}

/// As [`process_video`], but over an already-open reader and with extra
/// annotators beside the difference annotator. Used by the CLI (optional
/// frame-stat annotators) and by tests (synthetic decoders).
pub fn process_with_reader<D: FrameDecoder>(
    config: &CoreConfig,
    reader: &mut VideoBatchReader<D>,
    extra_annotators: Vec<Box<dyn BatchAnnotator>>,
    cancel: Option<&AtomicBool>,
    progress: Option<ProgressFn<'_>>,
) -> CoreResult<VideoReport> {
    let mut pipeline = Pipeline::new();
    pipeline.add_annotator(Box::new(DiffAnnotator::new(config.diff.clone())));
    for annotator in extra_annotators {
        pipeline.add_annotator(annotator);
    }

    let mut report = pipeline.run(reader, cancel, progress)?;
    report.truncate_to_frame_count();

    let aggregator = CutAggregator::new(config.cut.clone());
    let cuts = aggregator.aggregate(report.diff_rows().unwrap_or(&[]))?;
    log::info!(
        "detected {} cut(s) across {} frame(s)",
        cuts.len(),
        report.meta.frames
    );
    report.cuts = cuts;

    Ok(report)
}
