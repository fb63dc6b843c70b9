//! Runs the generate -> load -> search workflow without a window.

use anyhow::{anyhow, bail, Result};
use numsearch_core::benchmark::BenchmarkResult;
use numsearch_core::controller::{Controller, Dispatch};
use numsearch_core::number_file::FileStatus;
use numsearch_core::SearchConfig;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write a fresh file even when one already exists.
    pub regenerate: bool,
    /// Search inputs, as typed by a user. Empty means [`default_targets`].
    pub targets: Vec<String>,
    /// Upper bound on waiting for each background generation or load.
    pub worker_timeout: Duration,
}

/// What happened to one search input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Measured(BenchmarkResult),
    Invalid { input: String, message: String },
}

impl TargetOutcome {
    pub fn measured(&self) -> Option<&BenchmarkResult> {
        match self {
            TargetOutcome::Measured(result) => Some(result),
            TargetOutcome::Invalid { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub config: SearchConfig,
    /// Whether this run wrote the number file.
    pub generated: bool,
    pub distinct_values: usize,
    pub source_lines: usize,
    /// Lines whose value already appeared earlier in the file.
    pub duplicates: usize,
    pub outcomes: Vec<TargetOutcome>,
}

/// Both bounds, zero, and the first value past each bound.
pub fn default_targets(config: &SearchConfig) -> Vec<String> {
    [
        Some(config.min),
        Some(0),
        Some(config.max),
        config.min.checked_sub(1),
        config.max.checked_add(1),
    ]
    .into_iter()
    .flatten()
    .map(|target| target.to_string())
    .collect()
}

pub fn run(config: SearchConfig, options: &RunOptions) -> Result<RunSummary> {
    let targets = if options.targets.is_empty() {
        default_targets(&config)
    } else {
        options.targets.clone()
    };

    let mut controller = Controller::new(config);

    let generated = options.regenerate || controller.file_status() != FileStatus::Available;
    if generated {
        let dispatch = controller.request_generate();
        finish_worker(&mut controller, dispatch, options.worker_timeout, "generation")?;
        log::info!("{}", controller.status());
    }

    let dispatch = controller.request_load();
    finish_worker(&mut controller, dispatch, options.worker_timeout, "load")?;
    let numbers = controller
        .number_set()
        .ok_or_else(|| anyhow!("load finished without a number set"))?;
    log::info!(
        "{} distinct values from {} lines ({} duplicates)",
        numbers.len(),
        numbers.source_lines(),
        numbers.duplicates()
    );

    let mut outcomes = Vec::with_capacity(targets.len());
    for input in targets {
        match controller.request_search(&input) {
            Dispatch::Completed(result) => outcomes.push(TargetOutcome::Measured(result)),
            Dispatch::Rejected => {
                let message = controller
                    .take_notifications()
                    .into_iter()
                    .map(|note| note.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                outcomes.push(TargetOutcome::Invalid { input, message });
            }
            other => bail!("search for {input:?} did not run synchronously: {other:?}"),
        }
    }

    Ok(RunSummary {
        config: controller.config().clone(),
        generated,
        distinct_values: numbers.len(),
        source_lines: numbers.source_lines(),
        duplicates: numbers.duplicates(),
        outcomes,
    })
}

/// Wait for the worker behind `dispatch` and turn any queued notification
/// into an error.
fn finish_worker(
    controller: &mut Controller,
    dispatch: Dispatch,
    timeout: Duration,
    what: &str,
) -> Result<()> {
    match dispatch {
        Dispatch::Started | Dispatch::Rejected => {}
        other => bail!("{what} did not start: {other:?}"),
    }

    if !controller.wait_idle(timeout) {
        bail!("{what} did not finish within {timeout:?}");
    }

    let notes = controller.take_notifications();
    if let Some(note) = notes.first() {
        bail!("{what} failed: {}", note.message);
    }
    Ok(())
}
