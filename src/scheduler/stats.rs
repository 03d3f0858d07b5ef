use serde::Serialize;

use crate::scheduler::process::{ProcessRecord, Tick};

/// Per-process results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessStats {
    pub id: String,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub worker: Option<usize>,
    pub waiting_time: Tick,
    pub turnaround_time: Tick,
}

/// Aggregate results of a finished simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub processes: Vec<ProcessStats>,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
}

impl Summary {
    /// Summarize completed records. Averages are 0.0 for an empty run.
    pub fn from_records(records: &[ProcessRecord]) -> Self {
        let processes: Vec<ProcessStats> = records
            .iter()
            .map(|r| {
                debug_assert!(
                    r.is_completed(),
                    "Process {} aggregated before completion",
                    r.process.id
                );
                ProcessStats {
                    id: r.process.id.clone(),
                    arrival_time: r.process.arrival_time,
                    burst_time: r.process.burst_time,
                    worker: r.executed_on(),
                    waiting_time: r.waiting_time(),
                    turnaround_time: r.turnaround_time(),
                }
            })
            .collect();

        // Summed wide so no workload of u64 ticks can overflow
        let total_waiting: u128 = processes.iter().map(|p| u128::from(p.waiting_time)).sum();
        let total_turnaround: u128 = processes
            .iter()
            .map(|p| u128::from(p.turnaround_time))
            .sum();

        Self {
            average_waiting_time: average(total_waiting, processes.len()),
            average_turnaround_time: average(total_turnaround, processes.len()),
            processes,
        }
    }
}

fn average(total: u128, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
