// shotscan-cli/src/main.rs
//
// Command-line front end for the shotscan-core library.
//
// Responsibilities include:
// - Parsing command-line arguments (`Cli`, `Commands`, `DetectArgs`).
// - Setting up env_logger and ctrl-c cancellation.
// - Building the `shotscan_core::CoreConfig` from CLI arguments.
// - Invoking the core detection pipeline with a progress bar.
// - Printing the cut summary and writing the optional report file.
// - Managing process exit codes based on success or failure.

mod cli;
mod output;

use std::collections::BTreeMap;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use shotscan_core::{
    probe_video, process_with_reader, AverageAnnotator, BatchAnnotator, CoreConfig, CoreError,
    CoreResult, SizeAnnotator, VideoBatchReader, VideoReport,
};

use crate::cli::{Cli, Commands, DetectArgs, InfoArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        match e {
            CoreError::Cancelled => {
                eprintln!("{}", style("Interrupted.").yellow().bold());
                process::exit(130);
            }
            _ => {
                eprintln!("{} {e}", style("Error:").red().bold());
                process::exit(1);
            }
        }
    }
}

fn run_detect(args: DetectArgs) -> CoreResult<()> {
    let config = build_config(&args);
    config.validate()?;
    log::debug!("running detection with {config:?}");

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        ctrlc::set_handler(move || cancelled.store(true, Ordering::SeqCst))
            .map_err(|e| CoreError::Config(format!("failed to install ctrl-c handler: {e}")))?;
    }

    let mut reader = VideoBatchReader::open(&config.input_path, config.batch_size)?;

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(reader.max_batch() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} batches")
                .unwrap()
                .progress_chars("█▓▒░ "),
        );
        pb.set_message(config.input_path.display().to_string());
        pb
    };
    // The terminal batch can trail the probed batch count by one.
    let on_progress = |done: i64, total: i64| {
        progress.set_length(total as u64);
        progress.set_position(done.min(total) as u64);
    };

    let mut extra: Vec<Box<dyn BatchAnnotator>> = Vec::new();
    if args.frame_stats {
        extra.push(Box::new(SizeAnnotator));
        extra.push(Box::new(AverageAnnotator));
    }

    let result = process_with_reader(
        &config,
        &mut reader,
        extra,
        Some(&cancelled),
        Some(&on_progress),
    );
    progress.finish_and_clear();
    let report = result?;

    print_cut_summary(&report, args.quiet);

    if let Some(path) = &args.output {
        output::write_report(&report, args.format, path)?;
        if !args.quiet {
            println!("\nReport written to {}", style(path.display()).cyan());
        }
    }

    Ok(())
}

fn build_config(args: &DetectArgs) -> CoreConfig {
    let mut config = CoreConfig::new(args.input_path.clone());
    config.batch_size = args.batch_size;
    config.diff.quantiles = args.quantiles.clone();
    config.diff.size = args.downsample_size;
    config.diff.bins = args.hist_bins;
    config.cut.cut_vals = if args.cut_vals.is_empty() {
        None
    } else {
        Some(args.cut_vals.iter().cloned().collect::<BTreeMap<_, _>>())
    };
    config.cut.ignore_vals = args.ignore_vals.iter().cloned().collect();
    config.cut.min_len = args.min_len;
    config
}

fn print_cut_summary(report: &VideoReport, quiet: bool) {
    let fps = report.meta.fps;
    if quiet {
        for cut in &report.cuts {
            println!("{},{}", cut.frame_start, cut.frame_end);
        }
        return;
    }

    println!(
        "\n{} {} cut(s) in {} ({} frames @ {:.3} fps)",
        style("Detected").green().bold(),
        report.cuts.len(),
        report.meta.input_bname,
        report.meta.frames,
        fps
    );
    for cut in &report.cuts {
        let (start_s, end_s) = if fps > 0.0 {
            (cut.frame_start as f64 / fps, cut.frame_end as f64 / fps)
        } else {
            (0.0, 0.0)
        };
        println!(
            "  {:>8} ..= {:<8} ({:>8.3}s ..= {:<8.3}s)",
            cut.frame_start, cut.frame_end, start_s, end_s
        );
    }
}

fn run_info(args: InfoArgs) -> CoreResult<()> {
    let meta = probe_video(&args.input_path)?;

    println!("{}", style(&meta.input_bname).bold());
    print_field("Path", &meta.input_path);
    print_field("Resolution", format!("{}x{}", meta.width, meta.height));
    print_field("Frame rate", format!("{:.3} fps", meta.fps));
    print_field("Frames", meta.frames);
    print_field("Duration", format!("{:.3}s", meta.duration_secs));
    Ok(())
}

fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {}", style(label).cyan(), value);
}
