// shotscan-cli/src/output.rs
//
// Serialization of the in-memory report: one JSON document with every
// table, or the cut list as CSV. The core deliberately leaves file formats
// to this layer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use shotscan_core::{CoreError, CoreResult, VideoReport};

use crate::cli::OutputFormat;

/// Writes the report to `path` in the requested format.
pub fn write_report(report: &VideoReport, format: OutputFormat, path: &Path) -> CoreResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Json => write_json(report, &mut writer)?,
        OutputFormat::Csv => write_cuts_csv(report, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_json(report: &VideoReport, writer: &mut impl Write) -> CoreResult<()> {
    serde_json::to_writer_pretty(writer, report)
        .map_err(|e| CoreError::Annotation(format!("failed to serialize report: {e}")))
}

fn write_cuts_csv(report: &VideoReport, writer: &mut impl Write) -> CoreResult<()> {
    writeln!(writer, "frame_start,frame_end")?;
    for cut in &report.cuts {
        writeln!(writer, "{},{}", cut.frame_start, cut.frame_end)?;
    }
    Ok(())
}
