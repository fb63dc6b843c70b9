//! Headless Number Search Runner
//!
//! Drives the same [`numsearch_core::controller::Controller`] the window uses,
//! without a window: generate the number file when needed, load it, benchmark
//! a list of targets and summarise the per-lookup latency.
//!
//! Run the report: `cargo run --release -p numsearch-bench -- [TARGET...]`
//! Run criterion benches: `cargo bench -p numsearch-bench`

pub mod report;
pub mod runner;
