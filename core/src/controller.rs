//! Interactive-thread controller for the generate / load / search workflow.
//!
//! The controller owns every piece of state the user interface shows: the
//! status line, the last result, pending error notifications and the resident
//! [`NumberSet`]. Generation and loading run on short-lived worker threads
//! that never touch this state. They report back through an `mpsc` queue
//! which the interactive loop drains with [`Controller::pump`].
//!
//! Search flow:
//!
//! ```text
//! Idle -> (no set resident) -> Loading -> Benchmarking -> Idle
//! Idle -> (set resident)    -> Benchmarking -> Idle
//! any  -> (error)           -> Idle, with a notification queued
//! ```
//!
//! Benchmarks run synchronously on the calling thread.

use crate::benchmark::{self, BenchmarkResult, ResultTone};
use crate::config::SearchConfig;
use crate::error::{SearchError, SearchResult};
use crate::number_file::{self, FileStatus, GenerationSpec};
use crate::number_set::NumberSet;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// What happened to a user request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A worker was started; its outcome arrives through [`Controller::pump`].
    Started,
    /// The benchmark ran synchronously.
    Completed(BenchmarkResult),
    /// The same operation is already running.
    Ignored,
    /// The request failed immediately and a notification was queued.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    /// Waiting for an on-demand load; the query runs when it completes.
    Loading { pending: Option<i64> },
}

/// The text and colour of the result line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub text: String,
    pub tone: ResultTone,
}

/// A blocking, user-visible error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Compare-and-set busy flag guarding one kind of worker.
#[derive(Debug, Clone, Default)]
struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one worker run. It travels inside the worker's
/// completion event, so the flag clears only once the interactive thread has
/// applied the outcome (or the event is lost).
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum WorkerEvent {
    Generated {
        outcome: SearchResult<usize>,
        elapsed: Duration,
        _guard: BusyGuard,
    },
    Loaded {
        outcome: SearchResult<NumberSet>,
        elapsed: Duration,
        _guard: BusyGuard,
    },
}

pub struct Controller {
    config: SearchConfig,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    generating: BusyFlag,
    loading: BusyFlag,
    numbers: Option<Arc<NumberSet>>,
    pending_query: Option<i64>,
    file_status: FileStatus,
    status: String,
    result: Option<ResultLine>,
    last_benchmark: Option<BenchmarkResult>,
    notifications: VecDeque<Notification>,
}

impl Controller {
    pub fn new(config: SearchConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let file_status = number_file::file_status(&config.file_path);
        log::debug!(
            "Number file {} is {:?}",
            config.file_path.display(),
            file_status
        );

        Self {
            config,
            events_tx,
            events_rx,
            generating: BusyFlag::default(),
            loading: BusyFlag::default(),
            numbers: None,
            pending_query: None,
            file_status,
            status: String::new(),
            result: None,
            last_benchmark: None,
            notifications: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn result(&self) -> Option<&ResultLine> {
        self.result.as_ref()
    }

    pub fn last_benchmark(&self) -> Option<&BenchmarkResult> {
        self.last_benchmark.as_ref()
    }

    pub fn number_set(&self) -> Option<Arc<NumberSet>> {
        self.numbers.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_set()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// True exactly while a generator or loader worker is running.
    pub fn is_busy(&self) -> bool {
        self.is_generating() || self.is_loading()
    }

    pub fn search_state(&self) -> SearchState {
        if self.is_loading() {
            SearchState::Loading {
                pending: self.pending_query,
            }
        } else {
            SearchState::Idle
        }
    }

    /// Availability of the number file as of the last refresh.
    pub fn file_status(&self) -> FileStatus {
        self.file_status
    }

    pub fn refresh_file_status(&mut self) -> FileStatus {
        self.file_status = number_file::file_status(&self.config.file_path);
        self.file_status
    }

    pub fn search_enabled(&self) -> bool {
        self.file_status.is_available() && !self.is_loading()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Start writing a fresh number file in the background.
    pub fn request_generate(&mut self) -> Dispatch {
        let Some(guard) = self.generating.try_acquire() else {
            log::debug!("Generate requested while a generation is running; ignoring");
            return Dispatch::Ignored;
        };

        let path = self.config.file_path.clone();
        let spec = GenerationSpec {
            count: self.config.count,
            range: self.config.range(),
            seed: self.config.seed,
        };
        log::info!(
            "Generating {} numbers in [{}, {}] into {}",
            spec.count,
            self.config.min,
            self.config.max,
            path.display()
        );
        self.status = "Generating numbers...".to_string();

        let spawned = spawn_worker(
            "numsearch-generate",
            self.events_tx.clone(),
            guard,
            move || number_file::generate(&path, &spec),
            |outcome, elapsed, guard| WorkerEvent::Generated {
                outcome,
                elapsed,
                _guard: guard,
            },
        );

        match spawned {
            Ok(()) => Dispatch::Started,
            Err(e) => {
                self.status = "Generation failed".to_string();
                self.notify(&e);
                Dispatch::Rejected
            }
        }
    }

    /// Search for the number typed by the user.
    ///
    /// The input is validated first. With a resident set the benchmark runs
    /// immediately; otherwise the file is loaded in the background and the
    /// query runs once the load completes.
    pub fn request_search(&mut self, input: &str) -> Dispatch {
        if self.is_loading() {
            log::debug!("Search requested while loading; ignoring");
            return Dispatch::Ignored;
        }

        let target = match benchmark::parse_query(input) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("Rejected search input: {e}");
                self.notify(&e);
                return Dispatch::Rejected;
            }
        };

        match self.numbers.clone() {
            Some(numbers) => Dispatch::Completed(self.run_benchmark(&numbers, target)),
            None => self.start_load(Some(target)),
        }
    }

    /// Reload the number file, replacing any resident set.
    pub fn request_load(&mut self) -> Dispatch {
        self.start_load(None)
    }

    fn start_load(&mut self, pending: Option<i64>) -> Dispatch {
        let Some(guard) = self.loading.try_acquire() else {
            log::debug!("Load requested while a load is running; ignoring");
            return Dispatch::Ignored;
        };

        let path = self.config.file_path.clone();
        log::info!("Loading numbers from {}", path.display());
        self.pending_query = pending;
        self.status = "Loading numbers into memory...".to_string();

        let spawned = spawn_worker(
            "numsearch-load",
            self.events_tx.clone(),
            guard,
            move || number_file::load(&path),
            |outcome, elapsed, guard| WorkerEvent::Loaded {
                outcome,
                elapsed,
                _guard: guard,
            },
        );

        match spawned {
            Ok(()) => Dispatch::Started,
            Err(e) => {
                self.pending_query = None;
                self.status = "Loading failed".to_string();
                self.notify(&e);
                Dispatch::Rejected
            }
        }
    }

    fn run_benchmark(&mut self, numbers: &NumberSet, target: i64) -> BenchmarkResult {
        let result = benchmark::run(numbers, target, self.config.trials);
        log::info!(
            "Searched {} over {} trials: found={} ({:.3e} s per lookup)",
            target,
            result.trials,
            result.found,
            result.latency_seconds
        );
        self.result = Some(ResultLine {
            text: result.message(),
            tone: result.tone(),
        });
        self.last_benchmark = Some(result);
        result
    }

    /// Apply every worker outcome that has arrived, without blocking.
    ///
    /// Returns the number of outcomes applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for a worker outcome, then drain the queue.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Pump until no worker is running or `timeout` elapses.
    ///
    /// Returns `true` when the controller went idle in time.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if !self.is_busy() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_blocking(deadline - now);
        }
    }

    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Generated {
                outcome, elapsed, ..
            } => match outcome {
                Ok(written) => {
                    log::info!("Generated {written} numbers in {elapsed:.2?}");
                    if self.numbers.is_some() {
                        log::debug!("Resident number set no longer matches the file");
                    }
                    self.status = format!("{written} numbers generated!");
                    self.refresh_file_status();
                }
                Err(e) => {
                    log::error!("Generation failed after {elapsed:.2?}: {e}");
                    self.status = "Generation failed".to_string();
                    self.refresh_file_status();
                    self.notify(&e);
                }
            },
            WorkerEvent::Loaded {
                outcome, elapsed, ..
            } => {
                let pending = self.pending_query.take();
                match outcome {
                    Ok(numbers) => {
                        log::info!(
                            "Loaded {} distinct numbers from {} lines in {elapsed:.2?}",
                            numbers.len(),
                            numbers.source_lines()
                        );
                        let numbers = Arc::new(numbers);
                        self.numbers = Some(Arc::clone(&numbers));
                        self.status = "Numbers loaded into memory".to_string();
                        if let Some(target) = pending {
                            self.run_benchmark(&numbers, target);
                        }
                    }
                    Err(e) => {
                        log::error!("Loading failed after {elapsed:.2?}: {e}");
                        self.status = "Loading failed".to_string();
                        self.refresh_file_status();
                        self.notify(&e);
                    }
                }
            }
        }
    }

    fn notify(&mut self, error: &SearchError) {
        let message = if error.is_not_found() {
            format!("{error}. Generate the numbers first.")
        } else {
            error.to_string()
        };
        self.notifications.push_back(Notification {
            title: "Error".to_string(),
            message,
        });
    }
}

/// Run `job` on a named thread and send its outcome, wrapped by `wrap`, back
/// through `tx` exactly once. A panic inside `job` becomes
/// [`SearchError::Worker`].
fn spawn_worker<T, F, W>(
    name: &str,
    tx: Sender<WorkerEvent>,
    guard: BusyGuard,
    job: F,
    wrap: W,
) -> SearchResult<()>
where
    T: Send + 'static,
    F: FnOnce() -> SearchResult<T> + Send + 'static,
    W: FnOnce(SearchResult<T>, Duration, BusyGuard) -> WorkerEvent + Send + 'static,
{
    let thread_name = name.to_string();
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let start = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                Err(SearchError::Worker(format!(
                    "{thread_name} failed: {}",
                    panic_message(payload.as_ref())
                )))
            });
            if tx.send(wrap(outcome, start.elapsed(), guard)).is_err() {
                log::warn!("{thread_name}: controller is gone, dropping outcome");
            }
        })
        .map(|_| ())
        .map_err(|e| SearchError::Worker(format!("failed to start {name}: {e}")))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}
