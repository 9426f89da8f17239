// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Run a whole reduction group in one process.
//!
//! ```bash
//! frame-reducer --config configs/simulated.yaml --workers 4
//! frame-reducer --config configs/simulated.toml --workers 2 --json
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use frame_reducer::backends::simulated::{summarize_frame, FrameSummary, RunningStatistics};
use frame_reducer::backends::LayerFactory;
use frame_reducer::channel::LocalGroup;
use frame_reducer::config::{load_and_validate_config, Config, EngineSettings};
use frame_reducer::engine::{join_group, CoordinatorReport, Engine, MemberReport, WorkerReport};
use frame_reducer::extraction::ExtractedRecord;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Master-worker online data reduction over streaming detector frames
#[derive(Parser, Debug)]
#[command(name = "frame-reducer")]
#[command(version)]
#[command(about = "Reduce streaming detector frames with one coordinator and N workers", long_about = None)]
struct Args {
    /// Path to the YAML or TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Number of worker processes (the coordinator is extra)
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Print the final statistics as JSON
    #[arg(long)]
    json: bool,
}

/// Final output of a run.
#[derive(Debug, Serialize)]
struct RunSummary {
    coordinator: CoordinatorReport,
    statistics: RunningStatistics,
    mean_intensity: Option<f64>,
    workers: Vec<WorkerReport>,
}

fn init_tracing(cfg: &Config) {
    let fallback = if cfg.general.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.workers == 0 {
        bail!("at least one worker is required");
    }

    let cfg = load_and_validate_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    init_tracing(&cfg);

    let settings = EngineSettings::from(&cfg);
    let interrupt = CancellationToken::new();

    let ctrl_c = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let group = LocalGroup::<FrameSummary>::new(args.workers + 1)?;
    let abort = group.abort_signal();

    let mut handles = Vec::with_capacity(args.workers + 1);
    for endpoint in group.into_endpoints() {
        let (source, layers) = LayerFactory::from_config(&cfg)?;
        let engine = Engine::new(
            settings.clone(),
            source,
            layers,
            summarize_frame as fn(ExtractedRecord<Value>) -> FrameSummary,
            RunningStatistics::default(),
        )
        .with_interrupt(interrupt.clone());
        handles.push(tokio::spawn(engine.start(endpoint)));
    }

    let mut coordinator = None;
    let mut workers = Vec::new();
    let mut failures = 0usize;
    for (rank, result) in join_group(handles, &abort).await.into_iter().enumerate() {
        match result {
            Ok(MemberReport::Coordinator { report, reducer }) => {
                coordinator = Some((report, reducer))
            }
            Ok(MemberReport::Worker(report)) => workers.push(report),
            Err(error) => {
                failures += 1;
                tracing::error!(rank, error = %error, "Group member failed");
            }
        }
    }

    if let Some(code) = abort.code() {
        bail!("process group aborted with code {}", code);
    }

    let Some((report, statistics)) = coordinator else {
        bail!("coordinator did not produce a report");
    };

    let summary = RunSummary {
        coordinator: report,
        mean_intensity: statistics.mean_intensity(),
        statistics,
        workers,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if failures > 0 {
        bail!("{} group member(s) failed", failures);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let counters = &summary.coordinator.counters;
    println!("Run finished: {:?}", summary.coordinator.exit);
    println!("  workers completed: {}", counters.completed_workers);
    println!("  results reduced:   {}", counters.processed_count);
    println!(
        "  stale discarded:   {}",
        summary.coordinator.stale_discarded
    );
    match summary.mean_intensity {
        Some(mean) => println!("  mean intensity:    {:.3}", mean),
        None => println!("  mean intensity:    n/a"),
    }
    if let Some(peak) = summary.statistics.peak_intensity {
        println!("  peak intensity:    {:.3}", peak);
    }
    if let Some(energy) = summary.statistics.mean_beam_energy() {
        println!("  mean beam energy:  {:.3} keV", energy);
    }
    for (worker, frames) in &summary.statistics.frames_per_worker {
        println!("  worker {:>3}: {} frame(s)", worker, frames);
    }
}
