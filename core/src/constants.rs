//! Default workload constants and the environment variable names that override them.

/// File the generator writes and the loader reads, next to the executable.
pub const FILE_NAME: &str = "numeros.txt";

/// Number of values written per generation run.
pub const NUM_COUNT: usize = 10_000_000;

/// Inclusive lower bound of generated values.
pub const MIN_NUM: i64 = -50_000_000;
/// Inclusive upper bound of generated values.
pub const MAX_NUM: i64 = 50_000_000;

/// Membership checks per benchmark. A single hash lookup is far below the
/// resolution of most clocks, so the elapsed time is amortised over this many.
pub const BENCHMARK_TRIALS: u32 = 1_000_000;

/// Suffix of the scratch file the generator renames over the target on success.
pub const TEMP_SUFFIX: &str = "tmp";

pub const ENV_FILE: &str = "NUMSEARCH_FILE";
pub const ENV_COUNT: &str = "NUMSEARCH_COUNT";
pub const ENV_MIN: &str = "NUMSEARCH_MIN";
pub const ENV_MAX: &str = "NUMSEARCH_MAX";
pub const ENV_TRIALS: &str = "NUMSEARCH_TRIALS";
pub const ENV_SEED: &str = "NUMSEARCH_SEED";
pub const ENV_LOG: &str = "NUMSEARCH_LOG";
