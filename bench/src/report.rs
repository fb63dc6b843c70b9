//! Report module: prints per-target results and a latency summary.

use crate::runner::{RunSummary, TargetOutcome};

/// Per-lookup latency statistics over every measured target, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub samples: usize,
    pub mean_ns: f64,
    pub p50_ns: f64,
    pub p95_ns: f64,
    pub max_ns: f64,
}

impl LatencySummary {
    pub fn from_outcomes(outcomes: &[TargetOutcome]) -> Option<Self> {
        let mut sorted: Vec<f64> = outcomes
            .iter()
            .filter_map(TargetOutcome::measured)
            .map(|r| r.latency_seconds * 1e9)
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let mean_ns = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            samples: sorted.len(),
            mean_ns,
            p50_ns: percentile(&sorted, 50.0),
            p95_ns: percentile(&sorted, 95.0),
            max_ns: sorted[sorted.len() - 1],
        })
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let idx = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn render_report(summary: &RunSummary) -> String {
    let mut out = String::new();
    let rule = "=".repeat(72);

    out.push_str(&format!("\n{rule}\n"));
    out.push_str("  Number Search Lookup Report\n");
    out.push_str(&format!(
        "  File: {}{}\n",
        summary.config.file_path.display(),
        if summary.generated {
            " (generated this run)"
        } else {
            ""
        }
    ));
    out.push_str(&format!(
        "  Values: {} lines, {} distinct, {} duplicates, range [{}, {}]\n",
        summary.source_lines,
        summary.distinct_values,
        summary.duplicates,
        summary.config.min,
        summary.config.max
    ));
    out.push_str(&format!(
        "  Trials per search: {}\n",
        summary.config.trials
    ));
    out.push_str(&format!("{rule}\n\n"));

    out.push_str(&format!(
        "  {:>16} {:>10} {:>14}\n",
        "Target", "Found", "Per lookup"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(42)));
    for outcome in &summary.outcomes {
        match outcome {
            TargetOutcome::Measured(result) => out.push_str(&format!(
                "  {:>16} {:>10} {:>12.3e} s\n",
                result.target,
                if result.found { "yes" } else { "no" },
                result.latency_seconds
            )),
            TargetOutcome::Invalid { input, message } => {
                out.push_str(&format!("  {:>16} {:>10} {}\n", input, "invalid", message))
            }
        }
    }

    if let Some(latency) = LatencySummary::from_outcomes(&summary.outcomes) {
        out.push_str(&format!("\n  Latency over {} targets:\n", latency.samples));
        out.push_str(&format!("  Mean:   {:>10.2} ns\n", latency.mean_ns));
        out.push_str(&format!("  p50:    {:>10.2} ns\n", latency.p50_ns));
        out.push_str(&format!("  p95:    {:>10.2} ns\n", latency.p95_ns));
        out.push_str(&format!("  Max:    {:>10.2} ns\n", latency.max_ns));
    }

    out.push_str(&format!("\n{rule}\n"));
    out
}

pub fn print_report(summary: &RunSummary) {
    println!("{}", render_report(summary));
}

pub fn to_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
