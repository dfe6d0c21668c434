//! Core library for streaming shot-boundary detection in video files.
//!
//! This crate provides the performance-sensitive middle of the pipeline:
//! a fixed-size lookahead frame-batch reader over an external decoder,
//! per-frame difference signal computation, and a single-pass cut
//! aggregation state machine. Decoding is delegated to ffmpeg (via
//! ffmpeg-sidecar and ffprobe) behind the [`FrameDecoder`] trait, and all
//! output is in-memory tables; serialization belongs to the consumer.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use shotscan_core::{process_video, CoreConfig};
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//!
//! let mut config = CoreConfig::new(PathBuf::from("/path/to/input.mkv"));
//! config.diff.quantiles = vec![40];
//! config.cut.cut_vals = Some(BTreeMap::from([("q40".to_string(), 3.0)]));
//! config.cut.ignore_vals = BTreeMap::from([("avg_value".to_string(), 30.0)]);
//! config.cut.min_len = 10;
//!
//! let report = process_video(&config, None, None).unwrap();
//! for cut in &report.cuts {
//!     println!("shot {} .. {}", cut.frame_start, cut.frame_end);
//! }
//! ```

pub mod aggregate;
pub mod annotate;
pub mod batch;
pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod report;
pub mod utils;

// Re-exports for public API
pub use aggregate::{Cut, CutAggregator};
pub use annotate::{
    AnnotationTable, AverageAnnotator, BatchAnnotator, DiffAnnotator, DiffRow, SizeAnnotator,
};
pub use batch::{FrameBatch, VideoBatchReader};
pub use config::{CoreConfig, CutConfig, DiffConfig};
pub use error::{CoreError, CoreResult};
pub use external::{probe_video, FrameDecoder, SidecarDecoder, VideoMetadata};
pub use processing::{process_video, process_with_reader, Pipeline};
pub use report::VideoReport;
