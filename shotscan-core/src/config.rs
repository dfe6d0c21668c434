//! Configuration structures and constants for the shotscan-core library.
//!
//! The configuration is split by pipeline stage: batch reading, difference
//! signal computation, and cut aggregation. All fields have defaults, so a
//! consumer only needs to set the input path and whatever thresholds it
//! cares about.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

// Default constants

/// Default number of frames per batch. The reader holds twice this many
/// frames in memory (one batch of lookahead).
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Default edge length of the square downsampled frame used for pixel-delta
/// quantiles. Bounds the cost of the per-pair comparison.
pub const DEFAULT_DOWNSAMPLE_SIZE: u32 = 32;

/// Default number of histogram bins per HSV channel.
pub const DEFAULT_HIST_BINS: usize = 16;

/// Default minimum shot length in frames before a cut can be declared.
pub const DEFAULT_MIN_LEN: i64 = 1;

/// Settings for the difference signal computation.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Percentiles (0-100) computed over pixel and histogram deltas. Each
    /// quantile `q` yields a `q{q}` and an `h{q}` column.
    pub quantiles: Vec<u8>,

    /// Edge length of the downsampled square frame.
    pub size: u32,

    /// Histogram bins per channel.
    pub bins: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            quantiles: vec![40],
            size: DEFAULT_DOWNSAMPLE_SIZE,
            bins: DEFAULT_HIST_BINS,
        }
    }
}

/// Settings for the cut-boundary aggregation state machine.
#[derive(Debug, Clone)]
pub struct CutConfig {
    /// Column -> minimum value a frame must reach to be considered a cut
    /// candidate. `None` (or an empty map) disables cut detection entirely
    /// and the aggregator returns no cuts.
    pub cut_vals: Option<BTreeMap<String, f64>>,

    /// Column -> minimum value a frame must reach to be trusted at all.
    /// Frames below any of these thresholds are ignored for the purpose of
    /// detecting cuts (typically frames that are too dark, e.g. fades).
    pub ignore_vals: BTreeMap<String, f64>,

    /// Minimum number of frames a shot must span before a cut can be
    /// declared there.
    pub min_len: i64,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            cut_vals: None,
            ignore_vals: BTreeMap::new(),
            min_len: DEFAULT_MIN_LEN,
        }
    }
}

/// Main configuration for processing one video.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Path to the input video file.
    pub input_path: PathBuf,

    /// Number of frames per batch.
    pub batch_size: usize,

    /// Difference signal settings.
    pub diff: DiffConfig,

    /// Cut aggregation settings.
    pub cut: CutConfig,
}

impl CoreConfig {
    /// Creates a configuration with defaults for everything but the input path.
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path,
            batch_size: DEFAULT_BATCH_SIZE,
            diff: DiffConfig::default(),
            cut: CutConfig::default(),
        }
    }

    /// Validates the configuration before any processing starts.
    pub fn validate(&self) -> CoreResult<()> {
        if self.batch_size == 0 {
            return Err(CoreError::Config("batch_size must be at least 1".into()));
        }
        if self.diff.size == 0 {
            return Err(CoreError::Config("downsample size must be at least 1".into()));
        }
        if self.diff.bins == 0 {
            return Err(CoreError::Config("histogram bins must be at least 1".into()));
        }
        if let Some(q) = self.diff.quantiles.iter().find(|&&q| q > 100) {
            return Err(CoreError::Config(format!("quantile {q} is out of range 0-100")));
        }
        if self.cut.min_len < 1 {
            return Err(CoreError::Config("min_len must be at least 1".into()));
        }
        if !self.input_path.is_file() {
            return Err(CoreError::InvalidPath(format!(
                "input file not found: {}",
                self.input_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = CoreConfig::new(PathBuf::from("missing.mp4"));
        config.batch_size = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quantile() {
        let mut config = CoreConfig::new(PathBuf::from("missing.mp4"));
        config.diff.quantiles = vec![40, 101];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let config = CoreConfig::new(PathBuf::from("does/not/exist.mkv"));
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidPath(_))
        ));
    }
}
