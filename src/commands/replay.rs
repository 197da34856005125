// Replay command - rebuild reports from recorded event logs

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::cli::args::ReplayArgs;
use crate::config::Config;
use crate::execution::{
    AggregatorOptions, Envelope, EventAggregator, EventBus, ReplayPlan, RunState, load_event_log,
    merge_event_logs, replay,
};
use crate::report::{self, ReportFormat};
use crate::utils::FileUtils;

const BUS_CAPACITY: usize = 256;

/// Replay event logs. Returns `Ok(false)` when the report contains failures.
pub async fn handle_replay(cli: &Cli, args: &ReplayArgs, config: &Config) -> Result<bool> {
    let parallel_jobs = cli.parallel_jobs(Some(&config.run.parallel));
    info!("Parallel jobs: {}", parallel_jobs);

    let mut log_files = Vec::new();
    for path in &args.paths {
        if !path.exists() {
            bail!("Path not found: {}", path.display());
        }
        log_files.extend(FileUtils::collect_event_logs(path));
    }
    FileUtils::sort_files(&mut log_files, &args.sort);

    if log_files.is_empty() {
        warn!("No event logs found");
        return Ok(true);
    }
    info!("Found {} event log(s)", log_files.len());

    let logs = log_files
        .iter()
        .map(|file| load_event_log(file))
        .collect::<Result<Vec<_>>>()?;
    let envelopes = merge_event_logs(logs);

    let formats: Vec<ReportFormat> = if args.format.is_empty() {
        config.formats()?
    } else {
        args.format
            .iter()
            .map(|f| f.parse())
            .collect::<Result<_>>()?
    };
    let output_dir: PathBuf = args.output_dir.clone().unwrap_or_else(|| config.output_dir());
    let reporters = report::build_reporters(
        &formats,
        &output_dir,
        &config.report.file_prefix,
        !cli.no_color,
    );

    let mut system_info = report::detected_system_info();
    system_info.extend(config.system_info.clone());
    system_info
        .entry("Event logs".to_string())
        .or_insert_with(|| log_files.len().to_string());

    let options = AggregatorOptions {
        run_name: config.report.name.clone(),
        title: config.report.title.clone(),
        system_info,
        open_after_flush: args.open || config.report.open_after_flush,
        parallel_jobs,
    };
    let aggregator = Arc::new(EventAggregator::new(options, reporters));

    if args.bus {
        replay_through_bus(aggregator.clone(), envelopes).await?;
    } else {
        replay(aggregator.clone(), ReplayPlan::from_envelopes(envelopes), parallel_jobs).await?;
    }

    if aggregator.state() != RunState::Finalized {
        warn!("Run was not finalized; no report written");
        return Ok(true);
    }

    Ok(aggregator
        .report()
        .is_none_or(|report| !report.status().is_failure()))
}

/// Publish every envelope, in delivery order, through a single consuming
/// loop
async fn replay_through_bus(
    aggregator: Arc<EventAggregator>,
    envelopes: Vec<Envelope>,
) -> Result<usize> {
    let (bus, handle) = EventBus::spawn(aggregator, BUS_CAPACITY);

    for Envelope { unit, event } in envelopes {
        if !bus.publish(unit, event).await {
            break;
        }
    }
    drop(bus);

    let processed = handle.await.context("Event loop task failed")??;
    info!("Event loop processed {} event(s)", processed);
    Ok(processed)
}
