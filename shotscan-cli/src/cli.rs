// shotscan-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Shotscan: shot-boundary detection for video files",
    long_about = "Streams a video through a lookahead frame-batch window, computes \
                  per-frame difference signals, and detects shot boundaries (cuts)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects cuts in a video file
    Detect(DetectArgs),
    /// Prints probed metadata for a video file
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Input video file
    #[arg(required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Frames per batch (the reader holds two batches in memory)
    #[arg(short = 'b', long, value_name = "FRAMES", default_value_t = 256)]
    pub batch_size: usize,

    /// Comma-separated percentiles for the difference signals (e.g. 40,90)
    #[arg(short = 'q', long, value_delimiter = ',', value_name = "PCTS", default_value = "40")]
    pub quantiles: Vec<u8>,

    /// Edge length of the downsampled frame used for pixel deltas
    #[arg(long, value_name = "PIXELS", default_value_t = 32)]
    pub downsample_size: u32,

    /// Histogram bins per HSV channel
    #[arg(long, value_name = "BINS", default_value_t = 16)]
    pub hist_bins: usize,

    /// Cut threshold as COLUMN=MIN (e.g. q40=3); repeatable, all must pass.
    /// Without at least one, no cuts are ever reported.
    #[arg(short = 'c', long = "cut", value_name = "COLUMN=MIN", value_parser = parse_threshold)]
    pub cut_vals: Vec<(String, f64)>,

    /// Ignore threshold as COLUMN=MIN (e.g. avg_value=30); repeatable.
    /// Frames below any of these are not trusted for cut decisions.
    #[arg(long = "ignore", value_name = "COLUMN=MIN", value_parser = parse_threshold)]
    pub ignore_vals: Vec<(String, f64)>,

    /// Minimum shot length in frames
    #[arg(long, value_name = "FRAMES", default_value_t = 10)]
    pub min_len: i64,

    /// Also compute per-frame size and HSV-average tables
    #[arg(long)]
    pub frame_stats: bool,

    /// Write the full report to this file (cuts always print to stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output file format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Suppress the progress bar and summary styling
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Input video file
    #[arg(required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON document with all report tables
    Json,
    /// Cut list only, as comma-separated values
    Csv,
}

/// Parses a `COLUMN=MIN` threshold specification.
fn parse_threshold(spec: &str) -> Result<(String, f64), String> {
    let (column, value) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=MIN, got '{spec}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{spec}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{value}' is not a number in '{spec}'"))?;
    Ok((column.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("q40=3"), Ok(("q40".to_string(), 3.0)));
        assert_eq!(
            parse_threshold("avg_value = 30.5"),
            Ok(("avg_value".to_string(), 30.5))
        );
        assert!(parse_threshold("q40").is_err());
        assert!(parse_threshold("=3").is_err());
        assert!(parse_threshold("q40=three").is_err());
    }

    #[test]
    fn test_detect_args_parse() {
        let cli = Cli::try_parse_from([
            "shotscan",
            "detect",
            "input.mkv",
            "-b",
            "128",
            "-q",
            "40,90",
            "--cut",
            "q40=3",
            "--cut",
            "h40=0.5",
            "--ignore",
            "avg_value=30",
            "--min-len",
            "25",
        ])
        .unwrap();

        match cli.command {
            Commands::Detect(args) => {
                assert_eq!(args.batch_size, 128);
                assert_eq!(args.quantiles, vec![40, 90]);
                assert_eq!(args.cut_vals.len(), 2);
                assert_eq!(args.ignore_vals, vec![("avg_value".to_string(), 30.0)]);
                assert_eq!(args.min_len, 25);
                assert_eq!(args.format, OutputFormat::Json);
            }
            Commands::Info(_) => unreachable!(),
        }
    }
}
