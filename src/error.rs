//! Error type shared by the store, the aggregation engine and the exporters.

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum TrackerError {
    /// Rejected input: non-positive amount, bad date, missing field.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid category '{category}'. Valid categories: {valid}")]
    InvalidCategory { category: String, valid: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database schema version {found} is newer than this build supports ({supported})")]
    SchemaVersion { found: i32, supported: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Stored amounts too large to combine; only reachable with rows written
    /// outside the validated entry points.
    #[error("Stored amounts are too large to compute the {0}")]
    Overflow(&'static str),

    #[error("{0} is not supported in this build")]
    Unsupported(&'static str),
}

impl TrackerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn transaction_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Transaction",
            id,
        }
    }

    pub(crate) fn recurring_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Recurring transaction",
            id,
        }
    }

    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidCategory { .. })
    }
}

pub(crate) type Result<T> = std::result::Result<T, TrackerError>;
