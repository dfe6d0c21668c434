//! Cut-boundary aggregation: turns the whole-video difference signal table
//! into a list of detected shots.
//!
//! Single-pass, constant-memory greedy segmentation with a one-frame
//! lookahead. A threshold crossing only counts if the following frame is
//! trustworthy; transitions into an ignored region (a fade to black, the
//! phantom frame past the end of the video) always close the open shot.

use serde::Serialize;

use crate::annotate::DiffRow;
use crate::config::CutConfig;
use crate::error::{CoreError, CoreResult};

/// One detected shot: frames `frame_start` through `frame_end`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cut {
    pub frame_start: i64,
    pub frame_end: i64,
}

/// Detects cuts from the frame-ordered difference signal table.
pub struct CutAggregator {
    config: CutConfig,
}

impl CutAggregator {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    /// Runs the segmentation over `diff`, which must be ordered by strictly
    /// increasing frame index.
    ///
    /// An unset or empty `cut_vals` map is the degenerate configuration:
    /// no cuts are ever produced. A threshold naming a column the rows do
    /// not carry is a configuration error.
    pub fn aggregate(&self, diff: &[DiffRow]) -> CoreResult<Vec<Cut>> {
        let cut_vals = match &self.config.cut_vals {
            Some(vals) if !vals.is_empty() => vals,
            _ => return Ok(Vec::new()),
        };

        let mut ignore_this_frame = true;
        let mut current_cut_start = 0i64;
        let mut cuts = Vec::new();

        for ind in 0..diff.len() {
            let this_frame = diff[ind].frame;

            // Should the next frame be ignored? The phantom frame past the
            // end of the video always is.
            let mut ignore_next_frame = ind + 1 >= diff.len();
            if !ignore_next_frame {
                for (key, cutoff) in &self.config.ignore_vals {
                    if column_value(&diff[ind + 1], key)? < *cutoff {
                        ignore_next_frame = true;
                        break;
                    }
                }
            }

            // A cut may close here only once the open shot is long enough,
            // and this_frame is then the *last* frame of the closing shot.
            let long_flag = (this_frame - current_cut_start + 1) >= self.config.min_len;
            let mut cut_detect = long_flag && !ignore_next_frame;
            if cut_detect {
                for (key, cutoff) in cut_vals {
                    if column_value(&diff[ind], key)? < *cutoff {
                        cut_detect = false;
                        break;
                    }
                }
            }

            // Entering an ignored region always closes the current shot.
            if ignore_next_frame && !ignore_this_frame {
                cut_detect = true;
            }

            if cut_detect {
                cuts.push(Cut {
                    frame_start: current_cut_start,
                    frame_end: this_frame,
                });
            }
            if cut_detect || ignore_next_frame {
                current_cut_start = this_frame + 1;
            }

            ignore_this_frame = ignore_next_frame;
        }

        Ok(cuts)
    }
}

fn column_value(row: &DiffRow, key: &str) -> CoreResult<f64> {
    row.value(key).ok_or_else(|| {
        CoreError::Config(format!("unknown difference column '{key}' in threshold map"))
    })
}
