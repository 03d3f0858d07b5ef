//! Simulated CPU cores.
//!
//! Each core is a [`CpuWorker`] running on its own OS thread:
//! - **Assignment**: the worker blocks on its [`CpuSlot`] until the
//!   dispatcher hands it a process
//! - **Execution**: [`ProcessExecutor`] holds the thread for the process's
//!   burst time and writes its waiting time
//! - **Completion**: the finished record goes back over a channel, then the
//!   slot is marked idle
//!
//! Free/busy state lives in the slot, not in the worker, so the dispatcher
//! can inspect it without talking to the thread.
//!
//! [`CpuSlot`]: crate::scheduler::assigner::CpuSlot

pub mod cpu;
pub mod executor;

pub use cpu::CpuWorker;
pub use executor::{Executor, ProcessExecutor};
