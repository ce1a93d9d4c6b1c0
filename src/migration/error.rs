//! Migration log error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Migration log error.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to read migration log: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse migration log: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("entry dated {earlier} cannot come before {later}; the log is newest first")]
    OutOfOrder { earlier: NaiveDate, later: NaiveDate },
    #[error("invalid entry: {0}")]
    Invalid(String),
}
