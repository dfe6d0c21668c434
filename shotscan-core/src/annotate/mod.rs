//! Annotators: per-batch consumers that turn frames into tabular signals.
//!
//! The pipeline depends only on the [`BatchAnnotator`] capability, never on
//! concrete annotator types. Each annotator returns zero or more labeled
//! tables per batch; tables with the same label are concatenated across
//! batches by the report accumulator.

use serde::Serialize;

use crate::batch::FrameBatch;
use crate::error::{CoreError, CoreResult};

pub mod diff;
pub mod frame_stats;
mod imageops;

pub use diff::{DiffAnnotator, DiffRow, QuantileDiff};
pub use frame_stats::{AverageAnnotator, AverageRow, SizeAnnotator, SizeRow};

/// A table of strongly-typed rows produced by an annotator.
///
/// Whole-video accumulation appends tables of the same label batch by
/// batch; generic columnar representations are deferred to the
/// serialization boundary (the CLI).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnnotationTable {
    Diff(Vec<DiffRow>),
    Size(Vec<SizeRow>),
    Average(Vec<AverageRow>),
}

impl AnnotationTable {
    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        match self {
            AnnotationTable::Diff(rows) => rows.len(),
            AnnotationTable::Size(rows) => rows.len(),
            AnnotationTable::Average(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends another table of the same kind.
    pub fn append(&mut self, other: AnnotationTable) -> CoreResult<()> {
        match (self, other) {
            (AnnotationTable::Diff(rows), AnnotationTable::Diff(mut more)) => {
                rows.append(&mut more);
            }
            (AnnotationTable::Size(rows), AnnotationTable::Size(mut more)) => {
                rows.append(&mut more);
            }
            (AnnotationTable::Average(rows), AnnotationTable::Average(mut more)) => {
                rows.append(&mut more);
            }
            _ => {
                return Err(CoreError::Annotation(
                    "cannot append tables of different kinds".into(),
                ));
            }
        }
        Ok(())
    }

    /// Drops rows whose frame index is at or past `frames`.
    pub(crate) fn retain_frames_below(&mut self, frames: i64) {
        match self {
            AnnotationTable::Diff(rows) => rows.retain(|r| r.frame < frames),
            AnnotationTable::Size(rows) => rows.retain(|r| r.frame < frames),
            AnnotationTable::Average(rows) => rows.retain(|r| r.frame < frames),
        }
    }
}

/// Capability for annotating one batch of frames.
pub trait BatchAnnotator {
    /// Annotates the batch and returns labeled tables. Row order must
    /// follow the batch's frame-name list where rows align to frames.
    fn annotate(&mut self, batch: &FrameBatch<'_>) -> CoreResult<Vec<(String, AnnotationTable)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_same_kind() {
        let mut table = AnnotationTable::Size(vec![SizeRow {
            frame: 0,
            height: 4,
            width: 4,
        }]);
        table
            .append(AnnotationTable::Size(vec![SizeRow {
                frame: 1,
                height: 4,
                width: 4,
            }]))
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_append_kind_mismatch_is_error() {
        let mut table = AnnotationTable::Size(vec![]);
        let result = table.append(AnnotationTable::Average(vec![]));
        assert!(matches!(result, Err(CoreError::Annotation(_))));
    }
}
