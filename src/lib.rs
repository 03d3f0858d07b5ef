pub mod config;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod worker;
pub mod workload;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use scheduler::{run_simulation, Process, SimulationOutcome, Summary};
