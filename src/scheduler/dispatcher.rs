use std::collections::VecDeque;
use std::thread;

use serde::Serialize;

use crate::config::SimConfig;
use crate::error::Result;
use crate::scheduler::assigner::WorkerPool;
use crate::scheduler::process::{Process, ProcessRecord, Tick};
use crate::scheduler::queue::ReadyQueue;
use crate::scheduler::stats::Summary;
use crate::worker::{Executor, ProcessExecutor};

/// One assignment of a process to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEvent {
    pub tick: Tick,
    pub process: String,
    pub worker: usize,
}

/// Final state of a simulation run.
#[derive(Debug)]
pub struct SimulationOutcome {
    /// Completed records, in workload order.
    pub records: Vec<ProcessRecord>,
    /// Assignments in the order they were made.
    pub dispatch_log: Vec<DispatchEvent>,
}

impl SimulationOutcome {
    /// Logical tick at which the last process finished.
    pub fn makespan(&self) -> Tick {
        self.records
            .iter()
            .filter_map(ProcessRecord::completion_time)
            .max()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> Summary {
        Summary::from_records(&self.records)
    }
}

/// Drives the logical clock and hands queued processes to free workers.
///
/// Each tick admits the processes arriving at that tick, then offers every
/// free worker the shortest queued process, then advances the clock to the
/// next tick at which something can change: an arrival or the end of a run.
/// The loop ends once every process has completed, not merely been admitted.
pub struct Dispatcher {
    config: SimConfig,
    /// Records not yet admitted, in arrival order.
    arrivals: VecDeque<ProcessRecord>,
    queue: ReadyQueue,
    finished: Vec<Option<ProcessRecord>>,
    completed: usize,
    now: Tick,
}

impl Dispatcher {
    pub fn new(processes: Vec<Process>, config: SimConfig) -> Self {
        let mut arrivals: Vec<ProcessRecord> = processes
            .into_iter()
            .enumerate()
            .map(|(index, process)| ProcessRecord::new(process, index))
            .collect();
        // Stable sort: equal arrival times keep workload order
        arrivals.sort_by_key(|r| r.process.arrival_time);

        let total = arrivals.len();
        Self {
            config,
            arrivals: arrivals.into(),
            queue: ReadyQueue::new(),
            finished: vec![None; total],
            completed: 0,
            now: 0,
        }
    }

    /// Run the simulation to completion.
    ///
    /// Every worker thread is joined before this returns, so no worker can
    /// still be writing to a record the caller reads.
    pub fn run(self) -> Result<SimulationOutcome> {
        let executor = ProcessExecutor::new(self.config.tick);
        self.run_with(executor)
    }

    /// Run the simulation with every assignment executed by `executor`.
    pub fn run_with<E: Executor>(mut self, executor: E) -> Result<SimulationOutcome> {
        self.config.validate()?;
        let pool = WorkerPool::spawn(self.config.workers, executor)?;
        let result = self.drive(&pool);
        pool.shutdown();
        let dispatch_log = result?;

        Ok(SimulationOutcome {
            records: self.finished.into_iter().flatten().collect(),
            dispatch_log,
        })
    }

    fn drive(&mut self, pool: &WorkerPool) -> Result<Vec<DispatchEvent>> {
        let total = self.finished.len();
        let mut dispatch_log = Vec::with_capacity(total);

        tracing::info!(
            processes = total,
            workers = pool.size(),
            "Simulation started"
        );

        while self.completed < total {
            self.admit_arrivals();
            dispatch_log.extend(pool.assign_free(self.now, &self.queue)?);
            self.collect(pool.drain_completed());

            if self.completed == total {
                break;
            }

            let next = self.next_event(pool);
            if !self.config.tick.is_zero() {
                let ticks = u32::try_from(next - self.now).unwrap_or(u32::MAX);
                thread::sleep(self.config.tick.saturating_mul(ticks));
            }
            self.now = next;
        }

        tracing::info!(tick = self.now, "Simulation finished");
        Ok(dispatch_log)
    }

    /// Next tick at which an arrival is due or a busy worker frees up.
    ///
    /// Nothing is dispatched between those ticks, so the idle ones are skipped.
    fn next_event(&self, pool: &WorkerPool) -> Tick {
        let arrival = self.arrivals.front().map(|r| r.process.arrival_time);
        let next = match (arrival, pool.next_busy_until(self.now)) {
            (Some(a), Some(b)) => a.min(b),
            (Some(t), None) | (None, Some(t)) => t,
            (None, None) => self.now.saturating_add(1),
        };
        next.max(self.now.saturating_add(1))
    }

    fn admit_arrivals(&mut self) {
        while self
            .arrivals
            .front()
            .is_some_and(|r| r.process.arrival_time <= self.now)
        {
            if let Some(record) = self.arrivals.pop_front() {
                tracing::debug!(process = %record.process.id, tick = self.now, "Process arrived");
                self.queue.enqueue(record);
            }
        }
    }

    fn collect(&mut self, records: Vec<ProcessRecord>) {
        for record in records {
            let index = record.index;
            debug_assert!(
                self.finished[index].is_none(),
                "Process {} reported complete twice",
                record.process.id
            );
            self.finished[index] = Some(record);
            self.completed += 1;
        }
    }
}
