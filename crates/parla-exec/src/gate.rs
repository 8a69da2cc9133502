//! Counting join gate
//!
//! The caller of a dispatch blocks on the gate until every worker that
//! received a range has arrived. Workers report a captured failure on
//! arrival; the first one wins and is returned from [`JoinGate::wait`].

use parking_lot::{Condvar, Mutex};

use crate::error::{PoolError, PoolResult};

#[derive(Debug)]
struct GateState {
    remaining: usize,
    failure: Option<PoolError>,
}

/// Blocks a caller until a known number of workers report completion
#[derive(Debug)]
pub struct JoinGate {
    state: Mutex<GateState>,
    done: Condvar,
}

impl JoinGate {
    /// Create a gate expecting `count` arrivals
    pub fn new(count: usize) -> Self {
        Self {
            state: Mutex::new(GateState {
                remaining: count,
                failure: None,
            }),
            done: Condvar::new(),
        }
    }

    /// Record one arrival, optionally carrying the worker's failure
    pub fn arrive(&self, failure: Option<PoolError>) {
        let mut state = self.state.lock();
        if state.failure.is_none() {
            state.failure = failure;
        }
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            self.done.notify_all();
        }
    }

    /// Cancel `count` expected arrivals that will never happen
    ///
    /// Used when assignment stops partway through a dispatch.
    pub fn abandon(&self, count: usize) {
        let mut state = self.state.lock();
        state.remaining = state.remaining.saturating_sub(count);
        if state.remaining == 0 {
            self.done.notify_all();
        }
    }

    /// Number of arrivals still outstanding
    pub fn remaining(&self) -> usize {
        self.state.lock().remaining
    }

    /// Block until the count reaches zero, then surface the first failure
    pub fn wait(&self) -> PoolResult<()> {
        let mut state = self.state.lock();
        while state.remaining > 0 {
            self.done.wait(&mut state);
        }
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
