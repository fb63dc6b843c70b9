//! Workload configuration.
//!
//! Defaults come from [`crate::constants`]. Each value can be overridden with a
//! `NUMSEARCH_*` environment variable, optionally read from a `.env` file in
//! the working directory.

use crate::constants::{
    BENCHMARK_TRIALS, ENV_COUNT, ENV_FILE, ENV_MAX, ENV_MIN, ENV_SEED, ENV_TRIALS, FILE_NAME,
    MAX_NUM, MIN_NUM, NUM_COUNT,
};
use crate::error::{SearchError, SearchResult};
use serde::Serialize;
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Where the number file lives.
    pub file_path: PathBuf,
    /// How many values a generation run writes.
    pub count: usize,
    pub min: i64,
    pub max: i64,
    /// Membership checks per benchmark.
    pub trials: u32,
    /// Fixed RNG seed for reproducible files; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            count: NUM_COUNT,
            min: MIN_NUM,
            max: MAX_NUM,
            trials: BENCHMARK_TRIALS,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Build a configuration from the process environment.
    ///
    /// A `.env` file is loaded first when one exists; variables already set in
    /// the environment take precedence over it.
    pub fn from_env() -> SearchResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment overrides from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration, resolving each override through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> SearchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_FILE).filter(|p| !p.trim().is_empty()) {
            config.file_path = PathBuf::from(path.trim());
        }
        if let Some(count) = parse_var(&lookup, ENV_COUNT)? {
            config.count = count;
        }
        if let Some(min) = parse_var(&lookup, ENV_MIN)? {
            config.min = min;
        }
        if let Some(max) = parse_var(&lookup, ENV_MAX)? {
            config.max = max;
        }
        if let Some(trials) = parse_var(&lookup, ENV_TRIALS)? {
            config.trials = trials;
        }
        config.seed = parse_var(&lookup, ENV_SEED)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SearchResult<()> {
        if self.min > self.max {
            return Err(SearchError::Config(format!(
                "minimum {} is greater than maximum {}",
                self.min, self.max
            )));
        }
        if self.trials == 0 {
            return Err(SearchError::Config(
                "benchmark trial count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn range(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }

    /// Apply `--file`, `--count`, `--min`, `--max`, `--trials` and `--seed`
    /// overrides from command-line arguments (program name already skipped).
    ///
    /// Unrecognised arguments are returned in order for the caller to handle.
    pub fn apply_args<I>(&mut self, args: I) -> SearchResult<Vec<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut rest = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            if !matches!(
                flag.as_str(),
                "--file" | "--count" | "--min" | "--max" | "--trials" | "--seed"
            ) {
                rest.push(arg);
                continue;
            }

            let value = inline
                .or_else(|| args.next())
                .ok_or_else(|| SearchError::Config(format!("{flag} needs a value")))?;
            let lookup = |_: &str| Some(value.clone());
            match flag.as_str() {
                "--file" => self.file_path = PathBuf::from(&value),
                "--count" => self.count = parse_var(&lookup, &flag)?.unwrap_or(self.count),
                "--min" => self.min = parse_var(&lookup, &flag)?.unwrap_or(self.min),
                "--max" => self.max = parse_var(&lookup, &flag)?.unwrap_or(self.max),
                "--trials" => self.trials = parse_var(&lookup, &flag)?.unwrap_or(self.trials),
                _ => self.seed = parse_var(&lookup, &flag)?.or(self.seed),
            }
        }

        self.validate()?;
        Ok(rest)
    }
}

/// `numeros.txt` in the directory of the running executable, or in the
/// current directory when the executable path cannot be determined.
pub fn default_file_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(FILE_NAME))
}

fn parse_var<F, T>(lookup: &F, key: &str) -> SearchResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim().replace('_', "");
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| SearchError::Config(format!("{key}={raw:?} is not a valid number")))
}
