//! Standalone runner that prints the lookup report.
//!
//! Generates the number file when it is missing (or always, with
//! `--regenerate`), loads it, then benchmarks each target given on the
//! command line. Without targets it searches both bounds, zero, and the
//! values just outside each bound.
//!
//! Usage:
//!   numsearch-bench [--file PATH] [--count N] [--min N] [--max N]
//!                   [--trials N] [--seed N] [--regenerate] [--json] [TARGET...]
//!
//! Every flag except `--regenerate` and `--json` can also be set through the
//! matching `NUMSEARCH_*` environment variable or a `.env` file.

use anyhow::{bail, Result};
use numsearch_core::constants::ENV_LOG;
use numsearch_core::SearchConfig;
use numsearch_bench::report::{print_report, to_json};
use numsearch_bench::runner::{run, RunOptions};
use std::env;
use std::time::Duration;

/// Generation of the default ten million values takes a few seconds; this
/// only guards against a wedged worker.
const WORKER_TIMEOUT: Duration = Duration::from_secs(600);

fn parse_runner_args(rest: Vec<String>) -> Result<(RunOptions, bool)> {
    let mut options = RunOptions {
        worker_timeout: WORKER_TIMEOUT,
        ..Default::default()
    };
    let mut json = false;

    for arg in rest {
        match arg.as_str() {
            "--regenerate" => options.regenerate = true,
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ => options.targets.push(arg),
        }
    }

    Ok((options, json))
}

fn main() -> Result<()> {
    numsearch_core::initialize_logger(
        numsearch_core::parse_log_level(env::var(ENV_LOG).ok().as_deref()),
        None,
    )?;

    let mut config = SearchConfig::from_env()?;
    let rest = config.apply_args(env::args().skip(1))?;
    let (options, json) = parse_runner_args(rest)?;

    let summary = run(config, &options)?;

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print_report(&summary);
    }
    Ok(())
}
