use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::scheduler::process::ProcessRecord;

/// Records that have arrived but are not yet assigned to a worker.
///
/// Every operation holds the queue lock for its whole duration, so the
/// shortest-job scan and the removal that follows it are one atomic step.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    records: Mutex<VecDeque<ProcessRecord>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the tail.
    pub fn enqueue(&self, record: ProcessRecord) {
        tracing::debug!(
            process = %record.process.id,
            burst = record.process.burst_time,
            "Process queued"
        );
        self.records.lock().push_back(record);
    }

    /// Remove and return the queued record with the smallest burst time.
    ///
    /// Ties go to the record enqueued first. Returns `None` when nothing is queued.
    pub fn extract_shortest(&self) -> Option<ProcessRecord> {
        let mut records = self.records.lock();
        // min_by_key keeps the first of several equal minimums
        let position = records
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| r.process.burst_time)
            .map(|(i, _)| i)?;
        records.remove(position)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Ids of the queued records, front to back.
    #[cfg(test)]
    pub(crate) fn queued_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.process.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::process::Process;

    #[test]
    fn enqueue_preserves_insertion_order() {
        let queue = ReadyQueue::new();
        for (i, id) in ["X", "Y", "Z"].into_iter().enumerate() {
            queue.enqueue(ProcessRecord::new(Process::new(id, 0, 1), i));
        }
        assert_eq!(queue.queued_ids(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn extract_leaves_remaining_records_in_order() {
        let queue = ReadyQueue::new();
        let processes = [("A", 4), ("B", 1), ("C", 4), ("D", 2)];
        for (i, (id, burst)) in processes.into_iter().enumerate() {
            queue.enqueue(ProcessRecord::new(Process::new(id, 0, burst), i));
        }

        assert_eq!(queue.extract_shortest().unwrap().process.id, "B");
        assert_eq!(queue.queued_ids(), vec!["A", "C", "D"]);
        assert_eq!(queue.extract_shortest().unwrap().process.id, "D");
        assert_eq!(queue.extract_shortest().unwrap().process.id, "A");
        assert_eq!(queue.queued_ids(), vec!["C"]);
    }
}
