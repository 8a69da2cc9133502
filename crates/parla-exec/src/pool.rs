//! Persistent fixed-size thread pool
//!
//! Workers are spawned once and parked on their own slot between jobs. A
//! dispatch partitions `[0, total)` with [`WorkRange::partition`], hands one
//! range to each of the first `k` workers and blocks on a [`JoinGate`] until
//! all of them have finished. Only one dispatch may be in flight per pool.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::gate::JoinGate;
use crate::range::WorkRange;

/// Task signature seen by the workers: `(partition index, range)`
type Task<'t> = dyn Fn(usize, WorkRange) + Sync + 't;

/// One unit of work for one worker
struct Job {
    // Borrowed from the dispatching caller, which blocks on `gate` until the
    // worker has arrived. The worker never touches `task` after arriving.
    task: &'static Task<'static>,
    partition: usize,
    range: WorkRange,
    gate: Arc<JoinGate>,
}

#[derive(Default)]
struct SlotState {
    job: Option<Job>,
    busy: bool,
    shutdown: bool,
}

/// Mailbox through which the pool talks to one worker
#[derive(Default)]
struct WorkerSlot {
    state: Mutex<SlotState>,
    wake: Condvar,
}

impl WorkerSlot {
    fn assign(&self, worker: usize, job: Job) -> PoolResult<()> {
        let mut state = self.state.lock();
        if state.busy || state.job.is_some() {
            return Err(PoolError::ThreadMisuse { worker });
        }
        state.busy = true;
        state.job = Some(job);
        self.wake.notify_one();
        Ok(())
    }

    fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.wake.notify_one();
    }
}

struct Worker {
    id: usize,
    slot: Arc<WorkerSlot>,
    handle: Option<JoinHandle<()>>,
}

/// Clears the pool's busy flag when a dispatch ends, even on early return
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fixed set of persistent worker threads with synchronous dispatch
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use parla_exec::ThreadPool;
///
/// let pool = ThreadPool::new(4).unwrap();
/// let sum = AtomicUsize::new(0);
/// pool.execute(100, |i| {
///     sum.fetch_add(i, Ordering::Relaxed);
/// })
/// .unwrap();
/// assert_eq!(sum.into_inner(), 4950);
/// ```
pub struct ThreadPool {
    workers: Vec<Worker>,
    active: AtomicUsize,
    busy: AtomicBool,
    stopped: bool,
}

impl ThreadPool {
    /// Create a pool with `num_threads` workers and default naming
    pub fn new(num_threads: usize) -> PoolResult<Self> {
        Self::with_config(PoolConfig::default().with_num_threads(num_threads))
    }

    /// Create a pool from a full configuration
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for a zero worker count and
    /// [`PoolError::Spawn`] if a thread cannot be created. Workers spawned
    /// before a failure are stopped again.
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let mut pool = Self {
            workers: Vec::with_capacity(config.num_threads),
            active: AtomicUsize::new(config.num_threads),
            busy: AtomicBool::new(false),
            stopped: false,
        };

        for id in 0..config.num_threads {
            let slot = Arc::new(WorkerSlot::default());
            let worker_slot = Arc::clone(&slot);

            let mut builder =
                thread::Builder::new().name(format!("{}-{id}", config.thread_name_prefix));
            if let Some(bytes) = config.stack_size {
                builder = builder.stack_size(bytes);
            }
            let handle = builder.spawn(move || worker_loop(id, worker_slot))?;

            pool.workers.push(Worker {
                id,
                slot,
                handle: Some(handle),
            });
        }

        tracing::debug!(num_threads = config.num_threads, "thread pool started");
        Ok(pool)
    }

    /// Total number of worker threads owned by the pool
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers a dispatch may use
    pub fn active_threads(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Limit dispatches to the first `k` workers
    ///
    /// The value is clamped to `1..=num_threads()`; the clamped value is
    /// returned.
    pub fn set_active_threads(&self, k: usize) -> usize {
        let k = k.clamp(1, self.num_threads().max(1));
        self.active.store(k, Ordering::Release);
        k
    }

    /// Whether [`stop`](Self::stop) has been called
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The ranges a dispatch of `total` items would use right now
    pub fn partition(&self, total: usize) -> Vec<WorkRange> {
        WorkRange::partition(total, self.active_threads())
    }

    /// Run `task(i)` once for every `i` in `[0, total)`
    ///
    /// Blocks until every worker has finished. `total == 0` returns
    /// immediately without invoking `task`.
    ///
    /// # Errors
    ///
    /// * [`PoolError::Stopped`] after [`stop`](Self::stop)
    /// * [`PoolError::PoolBusy`] when another dispatch is in flight
    /// * [`PoolError::TaskPanicked`] when the task panics on any worker
    pub fn execute<F>(&self, total: usize, task: F) -> PoolResult<()>
    where
        F: Fn(usize) + Sync,
    {
        self.execute_ranges(total, |_, range| {
            for i in range {
                task(i);
            }
        })
    }

    /// Run `task(partition, range)` once per non-empty range of `[0, total)`
    pub fn execute_ranges<F>(&self, total: usize, task: F) -> PoolResult<()>
    where
        F: Fn(usize, WorkRange) + Sync,
    {
        let ranges = self.partition(total);
        self.run_partition(&ranges, &task)
    }

    /// Dispatch exactly the given ranges, one per worker, and wait
    pub(crate) fn run_partition(&self, ranges: &[WorkRange], task: &Task<'_>) -> PoolResult<()> {
        if self.stopped {
            return Err(PoolError::Stopped);
        }
        if ranges.is_empty() {
            return Ok(());
        }
        if ranges.len() > self.workers.len() {
            return Err(PoolError::invalid_config(format!(
                "{} ranges cannot be dispatched onto {} workers",
                ranges.len(),
                self.workers.len()
            )));
        }
        let _guard = self.acquire()?;

        tracing::trace!(partitions = ranges.len(), "dispatching job");

        // SAFETY: the erased reference is only reachable through the jobs
        // assigned below, and this function does not return before `gate`
        // has seen every assigned worker arrive. Workers drop their job
        // before arriving, so the borrow of `task` ends inside this call.
        let task: &'static Task<'static> =
            unsafe { mem::transmute::<&Task<'_>, &'static Task<'static>>(task) };

        let gate = Arc::new(JoinGate::new(ranges.len()));
        let mut assigned = 0;
        let mut misuse = None;

        for (partition, (range, worker)) in ranges.iter().zip(&self.workers).enumerate() {
            let job = Job {
                task,
                partition,
                range: *range,
                gate: Arc::clone(&gate),
            };
            match worker.slot.assign(worker.id, job) {
                Ok(()) => assigned += 1,
                Err(err) => {
                    misuse = Some(err);
                    break;
                }
            }
        }

        if assigned < ranges.len() {
            gate.abandon(ranges.len() - assigned);
        }
        let outcome = gate.wait();

        match misuse {
            Some(err) => Err(err),
            None => outcome,
        }
    }

    fn acquire(&self) -> PoolResult<DispatchGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| PoolError::PoolBusy)?;
        Ok(DispatchGuard(&self.busy))
    }

    /// Stop and join every worker
    ///
    /// Terminal: every later dispatch fails with [`PoolError::Stopped`].
    /// Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        for worker in &self.workers {
            worker.slot.shutdown();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    tracing::warn!(worker = worker.id, "worker thread terminated abnormally");
                }
            }
        }

        tracing::debug!(num_threads = self.workers.len(), "thread pool stopped");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads())
            .field("active_threads", &self.active_threads())
            .field("stopped", &self.stopped)
            .finish()
    }
}

fn worker_loop(id: usize, slot: Arc<WorkerSlot>) {
    loop {
        let job = {
            let mut state = slot.state.lock();
            loop {
                if let Some(job) = state.job.take() {
                    break job;
                }
                if state.shutdown {
                    return;
                }
                slot.wake.wait(&mut state);
            }
        };

        let Job {
            task,
            partition,
            range,
            gate,
        } = job;

        let failure = panic::catch_unwind(AssertUnwindSafe(|| task(partition, range)))
            .err()
            .map(|payload| PoolError::from_panic(id, payload.as_ref()));
        if let Some(err) = &failure {
            tracing::warn!(worker = id, %range, error = %err, "task panicked");
        }

        // Free the slot before arriving so the next dispatch sees it idle
        slot.state.lock().busy = false;
        gate.arrive(failure);
    }
}
