use std::thread;
use std::time::Duration;

use crate::scheduler::assigner::Assignment;
use crate::scheduler::process::ProcessRecord;

/// Runs one assignment to completion on a worker thread.
pub trait Executor: Clone + Send + 'static {
    fn execute(&self, assignment: Assignment) -> ProcessRecord;
}

/// Simulates running a process on one CPU core.
///
/// A run occupies the calling thread for `burst_time` ticks of real time
/// and then writes the record's results.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    tick: Duration,
}

impl ProcessExecutor {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Real time spent simulating a run of `burst_time` ticks.
    pub fn run_time(&self, burst_time: u64) -> Duration {
        let ticks = u32::try_from(burst_time).unwrap_or(u32::MAX);
        self.tick.saturating_mul(ticks)
    }

    /// Execute an assignment to completion and hand back the finished record.
    pub fn execute(&self, assignment: Assignment) -> ProcessRecord {
        let Assignment {
            mut record,
            worker,
            dispatched_at,
        } = assignment;

        tracing::debug!(
            process = %record.process.id,
            worker,
            burst = record.process.burst_time,
            "Executing process"
        );

        let run_time = self.run_time(record.process.burst_time);
        if !run_time.is_zero() {
            thread::sleep(run_time);
        }

        record.complete(worker, dispatched_at);

        tracing::info!(
            process = %record.process.id,
            worker,
            dispatched_at,
            waiting_time = record.waiting_time(),
            turnaround_time = record.turnaround_time(),
            "Process completed"
        );

        record
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, assignment: Assignment) -> ProcessRecord {
        ProcessExecutor::execute(self, assignment)
    }
}
