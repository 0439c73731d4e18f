use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Workload inventory unavailable: no page could be retrieved from {0}")]
    Unavailable(String),

    #[error("Cannot write report to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
