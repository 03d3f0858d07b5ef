//! Workload input: loading, validation and generation of process tables.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SimError};
use crate::scheduler::process::{Process, Tick};

/// Largest arrival or burst time a workload may use.
///
/// Keeps every completion tick, and the wall-clock pacing of a run, well
/// inside the range of a [`Tick`].
pub const MAX_TICK: Tick = u32::MAX as Tick;

/// The five-process reference workload.
pub fn example_workload() -> Vec<Process> {
    vec![
        Process::new("P1", 0, 10),
        Process::new("P2", 1, 5),
        Process::new("P3", 2, 8),
        Process::new("P4", 3, 6),
        Process::new("P5", 4, 3),
    ]
}

/// Load and validate a workload file.
///
/// `.json` files hold an array of `{"id", "arrival_time", "burst_time"}`
/// objects; `.csv` files carry an `id,arrival_time,burst_time` header.
pub fn load_workload(path: &Path) -> Result<Vec<Process>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let processes: Vec<Process> = match extension.as_deref() {
        Some("json") => {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader)?
        }
        Some("csv") => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)?;
            reader
                .deserialize()
                .collect::<std::result::Result<Vec<Process>, csv::Error>>()?
        }
        _ => return Err(SimError::UnsupportedFormat(path.display().to_string())),
    };

    validate_workload(&processes)?;
    tracing::debug!(path = %path.display(), processes = processes.len(), "Workload loaded");
    Ok(processes)
}

/// Reject workloads the simulation cannot run: empty ids, zero bursts, times
/// beyond [`MAX_TICK`], duplicate ids.
pub fn validate_workload(processes: &[Process]) -> Result<()> {
    let mut seen = HashSet::with_capacity(processes.len());
    for process in processes {
        if process.id.trim().is_empty() {
            return Err(SimError::InvalidProcess {
                id: process.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        if process.burst_time == 0 {
            return Err(SimError::InvalidProcess {
                id: process.id.clone(),
                reason: "burst time must be positive".to_string(),
            });
        }
        if process.arrival_time > MAX_TICK || process.burst_time > MAX_TICK {
            return Err(SimError::InvalidProcess {
                id: process.id.clone(),
                reason: format!("arrival and burst time must not exceed {MAX_TICK}"),
            });
        }
        if !seen.insert(process.id.as_str()) {
            return Err(SimError::DuplicateProcess(process.id.clone()));
        }
    }
    Ok(())
}

/// Generate a reproducible pseudo-random workload.
///
/// Arrivals fall in `0..=max_arrival`, bursts in `1..=max_burst`, both capped
/// at [`MAX_TICK`]. Ids run `P1..Pn` in arrival order.
pub fn generate_workload(
    count: usize,
    seed: u64,
    max_arrival: Tick,
    max_burst: Tick,
) -> Vec<Process> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_arrival = max_arrival.min(MAX_TICK);
    let max_burst = max_burst.clamp(1, MAX_TICK);

    let mut shape: Vec<(Tick, Tick)> = (0..count)
        .map(|_| (rng.gen_range(0..=max_arrival), rng.gen_range(1..=max_burst)))
        .collect();
    shape.sort_by_key(|&(arrival, _)| arrival);

    shape
        .into_iter()
        .enumerate()
        .map(|(i, (arrival, burst))| Process::new(format!("P{}", i + 1), arrival, burst))
        .collect()
}
