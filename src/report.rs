//! Rendering of simulation results.

use serde::Serialize;

use crate::error::Result;
use crate::scheduler::dispatcher::DispatchEvent;
use crate::scheduler::stats::{ProcessStats, Summary};

#[derive(Serialize)]
struct JsonReport<'a> {
    processes: &'a [ProcessStats],
    average_waiting_time: f64,
    average_turnaround_time: f64,
    makespan: u64,
    dispatch_log: &'a [DispatchEvent],
}

/// Plain-text report: one line per process, then the two averages.
pub fn render_table(summary: &Summary) -> String {
    let mut out = String::new();
    for p in &summary.processes {
        let worker = p
            .worker
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "Process: {} Arrival: {} Burst: {} CPU: {} Waiting Time: {} Turnaround Time: {}\n",
            p.id, p.arrival_time, p.burst_time, worker, p.waiting_time, p.turnaround_time
        ));
    }
    out.push_str(&format!(
        "Average waiting time = {:.2}\n",
        summary.average_waiting_time
    ));
    out.push_str(&format!(
        "Average turnaround time = {:.2}\n",
        summary.average_turnaround_time
    ));
    out
}

/// Pretty-printed JSON with the summary and the dispatch order.
pub fn render_json(
    summary: &Summary,
    makespan: u64,
    dispatch_log: &[DispatchEvent],
) -> Result<String> {
    let report = JsonReport {
        processes: &summary.processes,
        average_waiting_time: summary.average_waiting_time,
        average_turnaround_time: summary.average_turnaround_time,
        makespan,
        dispatch_log,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
