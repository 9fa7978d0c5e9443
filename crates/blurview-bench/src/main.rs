//! blurview-bench: CLI tool for timing the blur pipeline.
//!
//! Runs the same steps the desktop app runs for Open followed by Process
//! (decode, GUI raster bridge, Gaussian blur, PNG encode) on a given image
//! file and prints per-stage diagnostics. Useful for:
//!
//! - Seeing which kernel size a blur factor produces for an image
//! - Measuring per-stage durations on large images
//!
//! Nothing is written to disk.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin blurview-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use blurview_pipeline::BlurConfig;
use blurview_pipeline::diagnostics::{Clock, ProcessDiagnostics};
use clap::Parser;

/// Blur pipeline timing and diagnostics for blurview.
///
/// Decodes, bridges, blurs, and re-encodes the given image and prints
/// per-stage timings and the kernel size used.
#[derive(Parser)]
#[command(name = "blurview-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, GIF, BMP, WebP).
    image_path: PathBuf,

    /// Kernel size as a fraction of the image width.
    #[arg(long, default_value_t = BlurConfig::DEFAULT_BLUR_FACTOR)]
    blur_factor: f64,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full blur config as a JSON string.
    ///
    /// When provided, `--blur-factor` is ignored. The JSON must be a
    /// valid `BlurConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`BlurConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and
/// `--blur-factor` is ignored. Either way the result is validated.
fn config_from_cli(cli: &Cli) -> Result<BlurConfig, String> {
    let config = match cli.config_json {
        Some(ref json) => serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --config-json: {e}"))?,
        None => BlurConfig {
            blur_factor: cli.blur_factor,
        },
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    eprintln!("Config: {config:?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match blurview_pipeline::diagnostics::process_with_diagnostics(
            &image_bytes,
            &config,
            &StdClock,
        ) {
            Ok((_, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }
                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&ProcessDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ProcessDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
    if let Some(k) = all_diagnostics[0].kernel_size() {
        println!("Kernel: {k}x{k}");
    }

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| d.decode.duration),
        ("Bridge", |d| d.bridge.duration),
        ("Blur", |d| d.blur.duration),
        ("Encode", |d| d.encode.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("blurview-bench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_factor_is_used() {
        let cli = parse(&["pic.png"]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.blur_factor - BlurConfig::DEFAULT_BLUR_FACTOR).abs() < f64::EPSILON);
        assert_eq!(cli.runs, 1);
    }

    #[test]
    fn config_json_overrides_flag() {
        let cli = parse(&[
            "--blur-factor",
            "0.5",
            "--config-json",
            r#"{"blur_factor":0.25}"#,
            "pic.png",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.blur_factor - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_factor_is_rejected() {
        let cli = parse(&["--blur-factor", "0", "pic.png"]);
        assert!(config_from_cli(&cli).is_err());
    }

    #[test]
    fn zero_runs_is_rejected_by_parser() {
        let result =
            Cli::try_parse_from(["blurview-bench", "--runs", "0", "pic.png"].iter().copied());
        assert!(result.is_err());
    }
}
