//! Timed membership lookups against a loaded [`NumberSet`].

use crate::error::{SearchError, SearchResult};
use crate::number_set::NumberSet;
use serde::Serialize;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Outcome of one benchmark: whether the target is present and what a single
/// lookup costs on average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub target: i64,
    pub found: bool,
    pub trials: u32,
    pub elapsed: Duration,
    /// `elapsed / trials`, in seconds.
    pub latency_seconds: f64,
}

/// Semantic colour of a result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultTone {
    Found,
    NotFound,
}

impl BenchmarkResult {
    pub fn tone(&self) -> ResultTone {
        if self.found {
            ResultTone::Found
        } else {
            ResultTone::NotFound
        }
    }

    pub fn message(&self) -> String {
        if self.found {
            format!("Number found! ({:.3e} s)", self.latency_seconds)
        } else {
            format!("Number not found ({:.3e} s)", self.latency_seconds)
        }
    }
}

/// Parse the user's search text as a base-10 integer.
pub fn parse_query(input: &str) -> SearchResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| SearchError::InvalidInput {
            input: input.to_string(),
        })
}

/// Check `target` against `set` `trials` times and report the amortised cost.
///
/// The reported `found` is the answer of the last trial; the set is borrowed
/// immutably for the whole run, so every trial answers the same.
pub fn run(set: &NumberSet, target: i64, trials: u32) -> BenchmarkResult {
    let trials = trials.max(1);
    let mut found = false;

    let start = Instant::now();
    for _ in 0..trials {
        found = black_box(set).contains(black_box(target));
    }
    let elapsed = start.elapsed();

    BenchmarkResult {
        target,
        found: black_box(found),
        trials,
        elapsed,
        latency_seconds: elapsed.as_secs_f64() / f64::from(trials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> NumberSet {
        [3, 1, 4, 1, 5].into_iter().collect()
    }

    #[test]
    fn parse_query_accepts_signed_and_padded_input() {
        assert_eq!(parse_query("4").unwrap(), 4);
        assert_eq!(parse_query("  -50000000 ").unwrap(), -50_000_000);
        assert_eq!(parse_query("+12").unwrap(), 12);
    }

    #[test]
    fn parse_query_rejects_garbage() {
        for input in ["abc", "", "  ", "1.5", "4 2", "0x10"] {
            let err = parse_query(input).unwrap_err();
            assert!(
                matches!(err, SearchError::InvalidInput { .. }),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn run_reports_found_and_not_found() {
        let set = sample_set();

        let hit = run(&set, 4, 1_000);
        assert!(hit.found);
        assert_eq!(hit.tone(), ResultTone::Found);
        assert_eq!(hit.trials, 1_000);

        let miss = run(&set, 2, 1_000);
        assert!(!miss.found);
        assert_eq!(miss.tone(), ResultTone::NotFound);
    }

    #[test]
    fn latency_is_elapsed_over_trials() {
        let result = run(&sample_set(), 3, 10_000);
        let expected = result.elapsed.as_secs_f64() / 10_000.0;
        assert!((result.latency_seconds - expected).abs() <= f64::EPSILON);
        assert!(result.latency_seconds >= 0.0);
    }

    #[test]
    fn zero_trials_runs_once() {
        let result = run(&sample_set(), 5, 0);
        assert_eq!(result.trials, 1);
        assert!(result.found);
    }

    #[test]
    fn outcome_is_stable_across_runs() {
        let set = sample_set();
        let outcomes: Vec<bool> = (0..5).map(|_| run(&set, 1, 100).found).collect();
        assert!(outcomes.iter().all(|&found| found));
    }

    #[test]
    fn message_uses_scientific_notation() {
        let result = BenchmarkResult {
            target: 4,
            found: true,
            trials: 1,
            elapsed: Duration::from_nanos(25),
            latency_seconds: 2.5e-8,
        };
        assert_eq!(result.message(), "Number found! (2.500e-8 s)");

        let miss = BenchmarkResult {
            found: false,
            ..result
        };
        assert_eq!(miss.message(), "Number not found (2.500e-8 s)");
    }
}
