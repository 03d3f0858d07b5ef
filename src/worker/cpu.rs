use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::scheduler::assigner::CpuSlot;
use crate::scheduler::process::ProcessRecord;
use crate::worker::executor::Executor;

/// One simulated CPU core running on its own OS thread.
pub struct CpuWorker<E> {
    slot: Arc<CpuSlot>,
    executor: E,
    completions: Sender<ProcessRecord>,
}

impl<E: Executor> CpuWorker<E> {
    pub fn new(
        slot: Arc<CpuSlot>,
        executor: E,
        completions: Sender<ProcessRecord>,
    ) -> Self {
        Self {
            slot,
            executor,
            completions,
        }
    }

    /// Start the worker thread, named `cpu-<id>`.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("cpu-{}", self.slot.id()))
            .spawn(move || self.run())
    }

    fn run(self) {
        let worker = self.slot.id();
        tracing::debug!(worker, "CPU worker started");

        while let Some(assignment) = self.slot.next_assignment() {
            let guard = LostOnPanic { slot: &self.slot };
            let record = self.executor.execute(assignment);

            // An idle slot means its record is already in the channel
            if self.completions.send(record).is_err() {
                tracing::debug!(worker, "Dispatcher gone, dropping completion");
            }
            drop(guard);
            self.slot.finish();
        }

        tracing::debug!(worker, "CPU worker stopped");
    }
}

/// Flags the slot as lost if the worker unwinds mid-assignment.
struct LostOnPanic<'a> {
    slot: &'a CpuSlot,
}

impl Drop for LostOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::warn!(worker = self.slot.id(), "CPU worker panicked during a run");
            self.slot.mark_lost();
        }
    }
}
