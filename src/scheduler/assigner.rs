use std::mem;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use parking_lot::{Condvar, Mutex};

use crate::error::{Result, SimError};
use crate::scheduler::dispatcher::DispatchEvent;
use crate::scheduler::process::{ProcessRecord, Tick};
use crate::scheduler::queue::ReadyQueue;
use crate::worker::{CpuWorker, Executor};

/// A record handed to a worker, stamped with the tick it was dispatched at.
#[derive(Debug)]
pub struct Assignment {
    pub record: ProcessRecord,
    pub worker: usize,
    pub dispatched_at: Tick,
}

impl Assignment {
    /// Logical tick at which this run ends and the worker becomes free again.
    pub fn due_at(&self) -> Tick {
        self.dispatched_at
            .saturating_add(self.record.process.burst_time)
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    /// Handed over, not yet picked up by the worker thread.
    Assigned(Assignment),
    Running,
    Stopped,
    Lost,
}

#[derive(Debug)]
struct SlotState {
    phase: Phase,
    /// Logical tick until which the worker counts as busy.
    busy_until: Tick,
}

impl SlotState {
    fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Assigned(_) | Phase::Running)
    }
}

/// Shared state of one simulated CPU core.
///
/// The dispatcher and the worker thread only touch the free/busy state
/// through this lock, so checking for "free" and flipping to "busy" can
/// never interleave with a completion.
#[derive(Debug)]
pub struct CpuSlot {
    id: usize,
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl CpuSlot {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: Mutex::new(SlotState {
                phase: Phase::Idle,
                busy_until: 0,
            }),
            changed: Condvar::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// True if the worker has no assignment and its last run has ended by `now`.
    pub fn is_free(&self, now: Tick) -> bool {
        let state = self.state.lock();
        matches!(state.phase, Phase::Idle) && state.busy_until <= now
    }

    /// Logical tick until which the worker is, or was last, busy.
    pub fn busy_until(&self) -> Tick {
        self.state.lock().busy_until
    }

    /// Dispatch the shortest queued record to this worker if it is free at `now`.
    ///
    /// A run that is logically over by `now` is waited for first, so the
    /// outcome depends on logical ticks only and never on how fast the worker
    /// thread happened to be.
    pub(crate) fn assign_if_free(
        &self,
        now: Tick,
        queue: &ReadyQueue,
    ) -> Result<Option<DispatchEvent>> {
        let mut state = self.state.lock();
        while state.is_busy() && state.busy_until <= now {
            self.changed.wait(&mut state);
        }

        match state.phase {
            Phase::Idle if state.busy_until <= now => {}
            Phase::Lost => return Err(SimError::WorkerLost(self.id)),
            _ => return Ok(None),
        }

        let Some(record) = queue.extract_shortest() else {
            return Ok(None);
        };

        let event = DispatchEvent {
            tick: now,
            process: record.process.id.clone(),
            worker: self.id,
        };
        let assignment = Assignment {
            record,
            worker: self.id,
            dispatched_at: now,
        };
        state.busy_until = assignment.due_at();
        state.phase = Phase::Assigned(assignment);
        self.changed.notify_all();

        tracing::info!(
            process = %event.process,
            worker = self.id,
            tick = now,
            busy_until = state.busy_until,
            "Process dispatched"
        );
        Ok(Some(event))
    }

    /// Block until an assignment arrives. Returns `None` once the slot is stopped.
    pub(crate) fn next_assignment(&self) -> Option<Assignment> {
        let mut state = self.state.lock();
        loop {
            match mem::replace(&mut state.phase, Phase::Running) {
                Phase::Assigned(assignment) => return Some(assignment),
                Phase::Stopped => {
                    state.phase = Phase::Stopped;
                    return None;
                }
                other => {
                    state.phase = other;
                    self.changed.wait(&mut state);
                }
            }
        }
    }

    /// Report the current run as finished.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock();
        if matches!(state.phase, Phase::Running) {
            state.phase = Phase::Idle;
        }
        self.changed.notify_all();
    }

    /// Mark the worker as gone while it held an assignment.
    pub(crate) fn mark_lost(&self) {
        let mut state = self.state.lock();
        state.phase = Phase::Lost;
        self.changed.notify_all();
    }

    /// Ask the worker thread to exit once it has no assignment left.
    pub(crate) fn stop(&self) {
        let mut state = self.state.lock();
        if !matches!(state.phase, Phase::Lost) {
            state.phase = Phase::Stopped;
        }
        self.changed.notify_all();
    }
}

/// Fixed pool of simulated CPU cores, one OS thread each.
#[derive(Debug)]
pub struct WorkerPool {
    slots: Vec<Arc<CpuSlot>>,
    handles: Vec<JoinHandle<()>>,
    completions: Receiver<ProcessRecord>,
}

impl WorkerPool {
    /// Spawn `workers` CPU threads, each running its assignments through `executor`.
    pub fn spawn<E: Executor>(workers: usize, executor: E) -> Result<Self> {
        if workers == 0 {
            return Err(SimError::NoWorkers);
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut slots: Vec<Arc<CpuSlot>> = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let slot = Arc::new(CpuSlot::new(id));
            let worker = CpuWorker::new(slot.clone(), executor.clone(), tx.clone());
            match worker.spawn() {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Don't leave the threads spawned so far waiting forever
                    for slot in &slots {
                        slot.stop();
                    }
                    return Err(SimError::Io(e));
                }
            }
            slots.push(slot);
        }

        tracing::debug!(workers, "Worker pool started");
        Ok(Self {
            slots,
            handles,
            completions: rx,
        })
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Ids of workers free at `now`, in ascending order.
    #[cfg(test)]
    pub(crate) fn free_workers(&self, now: Tick) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|s| s.is_free(now))
            .map(|s| s.id())
            .collect()
    }

    /// Earliest tick after `now` at which a busy worker becomes free.
    pub fn next_busy_until(&self, now: Tick) -> Option<Tick> {
        self.slots
            .iter()
            .map(|s| s.busy_until())
            .filter(|&t| t > now)
            .min()
    }

    /// Give every free worker the shortest queued record, visiting workers in id order.
    pub fn assign_free(&self, now: Tick, queue: &ReadyQueue) -> Result<Vec<DispatchEvent>> {
        let mut events = Vec::new();
        for slot in &self.slots {
            if let Some(event) = slot.assign_if_free(now, queue)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Records whose run has finished since the last call.
    pub fn drain_completed(&self) -> Vec<ProcessRecord> {
        self.completions.try_iter().collect()
    }

    /// Stop every worker thread and wait for it to exit.
    pub fn shutdown(self) {
        for slot in &self.slots {
            slot.stop();
        }
        for (id, handle) in self.handles.into_iter().enumerate() {
            if handle.join().is_err() {
                tracing::warn!(worker = id, "Worker thread panicked");
            }
        }
        tracing::debug!("Worker pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::scheduler::process::Process;
    use crate::worker::ProcessExecutor;

    fn queue_with(processes: &[(&str, Tick, Tick)]) -> ReadyQueue {
        let queue = ReadyQueue::new();
        for (i, (id, arrival, burst)) in processes.iter().enumerate() {
            queue.enqueue(ProcessRecord::new(Process::new(*id, *arrival, *burst), i));
        }
        queue
    }

    #[test]
    fn idle_slot_takes_shortest_record() {
        let slot = CpuSlot::new(0);
        let queue = queue_with(&[("A", 0, 5), ("B", 0, 2)]);

        let event = slot.assign_if_free(0, &queue).unwrap().unwrap();
        assert_eq!(event.process, "B");
        assert_eq!(event.worker, 0);
        assert_eq!(event.tick, 0);
        assert!(!slot.is_free(0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn busy_slot_is_skipped_before_due_tick() {
        let slot = CpuSlot::new(0);
        let queue = queue_with(&[("A", 0, 5), ("B", 0, 2)]);

        slot.assign_if_free(0, &queue).unwrap();
        assert!(slot.assign_if_free(1, &queue).unwrap().is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn finished_slot_stays_busy_until_due_tick() {
        let slot = CpuSlot::new(0);
        let queue = queue_with(&[("A", 0, 3), ("B", 0, 4)]);

        slot.assign_if_free(0, &queue).unwrap();
        let assignment = slot.next_assignment().unwrap();
        assert_eq!(assignment.due_at(), 3);
        slot.finish();

        // Finished early in wall time, but logically busy until tick 3
        assert!(slot.assign_if_free(2, &queue).unwrap().is_none());
        let event = slot.assign_if_free(3, &queue).unwrap().unwrap();
        assert_eq!(event.process, "B");
    }

    #[test]
    fn empty_queue_leaves_slot_idle() {
        let slot = CpuSlot::new(1);
        let queue = ReadyQueue::new();

        assert!(slot.assign_if_free(0, &queue).unwrap().is_none());
        assert!(slot.is_free(0));
    }

    #[test]
    fn lost_slot_reports_error() {
        let slot = CpuSlot::new(3);
        let queue = queue_with(&[("A", 0, 2)]);

        slot.assign_if_free(0, &queue).unwrap();
        slot.next_assignment().unwrap();
        slot.mark_lost();

        let err = slot.assign_if_free(5, &queue).unwrap_err();
        assert!(matches!(err, SimError::WorkerLost(3)));
    }

    #[test]
    fn stopped_slot_yields_no_assignment() {
        let slot = CpuSlot::new(0);
        slot.stop();
        assert!(slot.next_assignment().is_none());
    }

    fn instant_pool(workers: usize) -> WorkerPool {
        WorkerPool::spawn(workers, ProcessExecutor::new(Duration::ZERO)).unwrap()
    }

    /// Poll the pool until `expected` completions arrive or a second passes
    fn wait_for_completions(pool: &WorkerPool, expected: usize) -> Vec<ProcessRecord> {
        let deadline = Instant::now() + Duration::from_secs(1);
        let mut done = Vec::new();
        while done.len() < expected && Instant::now() < deadline {
            done.extend(pool.drain_completed());
            std::thread::sleep(Duration::from_millis(1));
        }
        done
    }

    #[test]
    fn pool_requires_workers() {
        let err = WorkerPool::spawn(0, ProcessExecutor::new(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, SimError::NoWorkers));
    }

    #[test]
    fn pool_starts_with_all_workers_free() {
        let pool = instant_pool(3);
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.free_workers(0), vec![0, 1, 2]);
        assert_eq!(pool.next_busy_until(0), None);
        pool.shutdown();
    }

    #[test]
    fn pool_assigns_shortest_jobs_in_worker_order() {
        let pool = instant_pool(2);
        let queue = queue_with(&[("long", 0, 9), ("short", 0, 1), ("mid", 0, 4)]);

        let events = pool.assign_free(0, &queue).unwrap();
        let assigned: Vec<(&str, usize)> = events
            .iter()
            .map(|e| (e.process.as_str(), e.worker))
            .collect();
        assert_eq!(assigned, vec![("short", 0), ("mid", 1)]);
        assert_eq!(queue.queued_ids(), vec!["long"]);

        // Both workers are logically busy at tick 0 whatever the threads have done
        assert!(pool.free_workers(0).is_empty());
        assert_eq!(pool.next_busy_until(0), Some(1));
        assert_eq!(pool.next_busy_until(1), Some(4));
        assert_eq!(pool.next_busy_until(4), None);

        let done = wait_for_completions(&pool, 2);
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|r| r.is_completed() && r.waiting_time() == 0));

        // A slot goes idle just after its record is sent
        let deadline = Instant::now() + Duration::from_secs(1);
        while pool.free_workers(4).len() < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        // Worker 0 is free again from tick 1, worker 1 from tick 4
        assert_eq!(pool.free_workers(1), vec![0]);
        assert_eq!(pool.free_workers(4), vec![0, 1]);
        pool.shutdown();
    }

    #[test]
    fn pool_waits_for_due_run_before_reassigning() {
        // Slow enough that the run is still in progress when its due tick is reached
        let pool = WorkerPool::spawn(1, ProcessExecutor::new(Duration::from_millis(5))).unwrap();
        let queue = queue_with(&[("first", 0, 2), ("second", 0, 3)]);

        pool.assign_free(0, &queue).unwrap();
        let events = pool.assign_free(2, &queue).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].process, "second");
        assert_eq!(events[0].tick, 2);

        let done = wait_for_completions(&pool, 2);
        assert_eq!(done.len(), 2);
        pool.shutdown();
    }
}
