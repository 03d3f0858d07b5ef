use serde::{Deserialize, Serialize};

/// One unit of logical simulation time.
pub type Tick = u64;

/// A process definition as supplied by the workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    pub arrival_time: Tick,
    pub burst_time: Tick,
}

impl Process {
    pub fn new(id: impl Into<String>, arrival_time: Tick, burst_time: Tick) -> Self {
        Self {
            id: id.into(),
            arrival_time,
            burst_time,
        }
    }
}

/// A process travelling through the simulation.
///
/// The record is moved, never shared: the ready queue owns it while queued,
/// the executing worker owns it while it runs, and the dispatcher gets it
/// back on completion. Simulation outputs are written once, by [`complete`].
///
/// [`complete`]: ProcessRecord::complete
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub process: Process,
    /// Position in the workload definition.
    pub index: usize,
    dispatched_at: Option<Tick>,
    executed_on: Option<usize>,
    waiting_time: Tick,
    completed: bool,
    run_count: u32,
}

impl ProcessRecord {
    pub fn new(process: Process, index: usize) -> Self {
        Self {
            process,
            index,
            dispatched_at: None,
            executed_on: None,
            waiting_time: 0,
            completed: false,
            run_count: 0,
        }
    }

    /// Record the outcome of a run that was dispatched to `worker` at `dispatched_at`.
    pub fn complete(&mut self, worker: usize, dispatched_at: Tick) {
        debug_assert!(
            !self.completed,
            "Process {} completed twice",
            self.process.id
        );
        debug_assert!(
            dispatched_at >= self.process.arrival_time,
            "Process {} dispatched before it arrived",
            self.process.id
        );

        self.run_count += 1;
        self.dispatched_at = Some(dispatched_at);
        self.executed_on = Some(worker);
        self.waiting_time = dispatched_at.saturating_sub(self.process.arrival_time);
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn waiting_time(&self) -> Tick {
        self.waiting_time
    }

    pub fn turnaround_time(&self) -> Tick {
        self.waiting_time.saturating_add(self.process.burst_time)
    }

    pub fn dispatched_at(&self) -> Option<Tick> {
        self.dispatched_at
    }

    /// Logical tick at which the run finished.
    pub fn completion_time(&self) -> Option<Tick> {
        self.dispatched_at
            .map(|t| t.saturating_add(self.process.burst_time))
    }

    pub fn executed_on(&self) -> Option<usize> {
        self.executed_on
    }

    /// How many times a worker has executed this record.
    pub fn run_count(&self) -> u32 {
        self.run_count
    }
}
