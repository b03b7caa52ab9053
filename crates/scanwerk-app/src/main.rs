// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — document scanner command line.
//
// Entry point. Initialises logging, loads configuration, and dispatches to
// the detect / track / rectify commands.

mod services;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::human_errors::{Severity, humanize_error};
use scanwerk_core::types::{Point, TrackingState};
use scanwerk_vision::FrameProcessor;
use serde::Serialize;

use services::config_dir::load_config;
use services::session::{ScanSession, SourceKind};

#[derive(Parser)]
#[command(name = "scanwerk")]
#[command(about = "Find, track, and flatten documents in camera frames", long_about = None)]
struct Cli {
    /// Configuration file (JSON). Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Longest side of the working copy used for detection.
    #[arg(long, global = true, default_value_t = 1024)]
    max_side: u32,

    /// Detector that proposes document outlines.
    #[arg(long, global = true, value_enum, default_value_t = SourceKind::Hough)]
    source: SourceKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the document in a single image and print the result as JSON.
    Detect {
        image: PathBuf,
    },
    /// Feed frames in order and save the page once it is held steady.
    Track {
        /// Frames in capture order.
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Time between frames in milliseconds.
        #[arg(long, default_value_t = 100.0)]
        interval_ms: f64,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Flatten an image using manually placed corners.
    Rectify {
        image: PathBuf,

        /// Four corners as `x,y,x,y,x,y,x,y`, in any order.
        #[arg(long, value_parser = parse_corners, allow_hyphen_values = true)]
        corners: Corners,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone)]
struct Corners(Vec<Point>);

fn parse_corners(raw: &str) -> std::result::Result<Corners, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| format!("corner coordinates must be numbers: {err}"))?;
    if values.len() % 2 != 0 {
        return Err("corner coordinates must come in x,y pairs".into());
    }
    Ok(Corners(
        values.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1])).collect(),
    ))
}

#[derive(Serialize)]
struct TrackReport<'a> {
    frames_seen: usize,
    frames_processed: usize,
    state: TrackingState,
    output: &'a Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Scanwerk starting");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            match human.severity {
                Severity::Transient => ExitCode::from(2),
                Severity::ActionRequired | Severity::Permanent => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Detect { image } => {
            let session = ScanSession::open(config, cli.max_side, cli.source).await?;
            let frame = FrameProcessor::open(&image)?;
            let result = session
                .detect(&frame)
                .await?
                .ok_or_else(|| ScanError::Worker("detector unexpectedly busy".into()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Command::Track {
            frames,
            interval_ms,
            output,
        } => {
            let mut session = ScanSession::open(config, cli.max_side, cli.source).await?;
            let mut processed = 0;

            for (index, path) in frames.iter().enumerate() {
                let frame = FrameProcessor::open(path)?;
                let now_ms = index as f64 * interval_ms;
                let Some(update) = session.feed(&frame, now_ms).await? else {
                    continue;
                };
                processed += 1;

                if let (true, Some(quad)) = (update.stable, update.smoothed_quad) {
                    let page = session.capture(&frame, &quad.corners)?;
                    save(&page, &output)?;
                    let report = TrackReport {
                        frames_seen: index + 1,
                        frames_processed: processed,
                        state: update.state,
                        output: &output,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    return Ok(());
                }
            }

            tracing::warn!(frames = frames.len(), "document never held steady");
            Err(ScanError::NoCandidates)
        }

        Command::Rectify {
            image,
            corners,
            output,
        } => {
            let session = ScanSession::open(config, cli.max_side, cli.source).await?;
            let frame = FrameProcessor::open(&image)?;
            let page = session.capture(&frame, &corners.0)?;
            save(&page, &output)?;
            tracing::info!(output = %output.display(), "page saved");
            Ok(())
        }
    }
}

fn save(page: &image::DynamicImage, path: &Path) -> Result<()> {
    FrameProcessor::from_dynamic(page.clone()).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_corner_list() {
        let Corners(points) = parse_corners("10,20, 300,25,310,400,5,390").expect("valid");
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], Point::new(300.0, 25.0));
    }

    #[test]
    fn rejects_odd_or_garbage_corners() {
        assert!(parse_corners("1,2,3").is_err());
        assert!(parse_corners("1,2,x,4").is_err());
    }

    #[test]
    fn cli_shape_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn rectify_args_parse() {
        let cli = Cli::try_parse_from([
            "scanwerk",
            "rectify",
            "in.jpg",
            "--corners",
            "0,0,100,0,100,100,0,100",
            "-o",
            "out.png",
        ])
        .expect("parse");
        let Command::Rectify { corners, .. } = cli.command else {
            panic!("expected rectify");
        };
        assert_eq!(corners.0.len(), 4);
        assert_eq!(cli.source, SourceKind::Hough);
    }

    #[test]
    fn contour_source_is_selectable() {
        let cli = Cli::try_parse_from(["scanwerk", "detect", "in.jpg", "--source", "contour"])
            .expect("parse");
        assert_eq!(cli.source, SourceKind::Contour);
        assert!(Cli::try_parse_from(["scanwerk", "detect", "in.jpg", "--source", "sift"]).is_err());
    }
}
