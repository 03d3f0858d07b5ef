use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid process {id:?}: {reason}")]
    InvalidProcess { id: String, reason: String },

    #[error("Duplicate process id: {0}")]
    DuplicateProcess(String),

    #[error("Worker pool must have at least one worker")]
    NoWorkers,

    #[error("Worker {0} stopped before finishing its assignment")]
    WorkerLost(usize),

    #[error("Unsupported workload format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
