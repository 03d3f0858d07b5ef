pub mod assigner;
pub mod dispatcher;
pub mod process;
pub mod queue;
pub mod stats;

pub use assigner::{Assignment, CpuSlot, WorkerPool};
pub use dispatcher::{DispatchEvent, Dispatcher, SimulationOutcome};
pub use process::{Process, ProcessRecord, Tick};
pub use queue::ReadyQueue;
pub use stats::{ProcessStats, Summary};

use crate::config::SimConfig;
use crate::error::Result;
use crate::workload::validate_workload;

/// Validate the inputs and run a full simulation.
pub fn run_simulation(processes: Vec<Process>, config: &SimConfig) -> Result<SimulationOutcome> {
    config.validate()?;
    validate_workload(&processes)?;
    Dispatcher::new(processes, config.clone()).run()
}
