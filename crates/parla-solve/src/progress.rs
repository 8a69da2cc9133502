//! Per-iteration progress reporting
//!
//! The solver calls [`ProgressReporter::report`] once per iteration. Reporting
//! never influences the iteration itself.

use std::time::Duration;

/// Snapshot handed to a [`ProgressReporter`] after each iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// Residual norm `‖r‖` after the iteration
    pub residual: f64,
    /// Iterations completed so far (starts at 1)
    pub iteration: usize,
    /// Wall time since the solve started
    pub elapsed: Duration,
    /// Workers participating in each dispatch
    pub active_cores: usize,
}

/// Receiver of solver progress events
pub trait ProgressReporter {
    fn report(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressReporter for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Emits one `tracing` event per iteration
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&mut self, event: &ProgressEvent) {
        tracing::info!(
            residual = event.residual,
            iteration = event.iteration,
            elapsed_ms = event.elapsed.as_secs_f64() * 1e3,
            active_cores = event.active_cores,
            "solver_progress"
        );
    }
}

/// Records every event, for convergence plots and tests
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    events: Vec<ProgressEvent>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ProgressEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Residual history in iteration order
    pub fn residuals(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.residual).collect()
    }

    pub fn into_events(self) -> Vec<ProgressEvent> {
        self.events
    }
}

impl ProgressReporter for ProgressLog {
    fn report(&mut self, event: &ProgressEvent) {
        self.events.push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(iteration: usize) -> ProgressEvent {
        ProgressEvent {
            residual: 1.0 / iteration as f64,
            iteration,
            elapsed: Duration::from_millis(iteration as u64),
            active_cores: 2,
        }
    }

    #[test]
    fn test_log_records_in_order() {
        let mut log = ProgressLog::new();
        assert!(log.is_empty());
        for i in 1..=3 {
            log.report(&event(i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().map(|e| e.iteration), Some(3));
        assert_eq!(log.residuals(), vec![1.0, 0.5, 1.0 / 3.0]);
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = 0;
        {
            let mut reporter = |e: &ProgressEvent| seen += e.iteration;
            reporter.report(&event(4));
            reporter.report(&event(5));
        }
        assert_eq!(seen, 9);
    }

    #[test]
    fn test_tracing_and_no_progress_accept_events() {
        TracingProgress.report(&event(1));
        NoProgress.report(&event(1));
    }
}
