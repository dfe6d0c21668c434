//! Whole-video accumulation of annotation tables.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::Cut;
use crate::annotate::{AnnotationTable, DiffRow};
use crate::error::CoreResult;
use crate::external::VideoMetadata;

/// Results of processing one video: metadata, the accumulated annotation
/// tables keyed by label, and the detected cuts.
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub meta: VideoMetadata,
    #[serde(flatten)]
    tables: BTreeMap<String, AnnotationTable>,
    pub cuts: Vec<Cut>,
}

impl VideoReport {
    pub fn new(meta: VideoMetadata) -> Self {
        Self {
            meta,
            tables: BTreeMap::new(),
            cuts: Vec::new(),
        }
    }

    /// Folds one batch worth of labeled tables into the accumulated ones.
    pub fn add_annotations(
        &mut self,
        annotations: Vec<(String, AnnotationTable)>,
    ) -> CoreResult<()> {
        for (label, table) in annotations {
            match self.tables.get_mut(&label) {
                Some(existing) => existing.append(table)?,
                None => {
                    self.tables.insert(label, table);
                }
            }
        }
        Ok(())
    }

    /// Looks up an accumulated table by label.
    pub fn table(&self, label: &str) -> Option<&AnnotationTable> {
        self.tables.get(label)
    }

    /// Iterates over all accumulated tables.
    pub fn tables(&self) -> impl Iterator<Item = (&String, &AnnotationTable)> {
        self.tables.iter()
    }

    /// The accumulated difference rows, if a diff annotator ran.
    pub fn diff_rows(&self) -> Option<&[DiffRow]> {
        match self.tables.get("diff") {
            Some(AnnotationTable::Diff(rows)) => Some(rows),
            _ => None,
        }
    }

    /// Drops rows for the zero-padded frame indices past the end of the
    /// video, so tables cover exactly `[0, frames)`.
    pub fn truncate_to_frame_count(&mut self) {
        let frames = self.meta.frames;
        for table in self.tables.values_mut() {
            table.retain_frames_below(frames);
        }
    }
}
