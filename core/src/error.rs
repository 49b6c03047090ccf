use crate::model::TicketId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Update or delete referenced an id that is not in the table
    #[error("ticket {0} not found")]
    NotFound(TicketId),

    /// Intake policy rejected the ticket
    #[error("invalid ticket: {0}")]
    Validation(String),

    /// Stored table could not be parsed
    #[error("storage is corrupt: {0}")]
    Corrupt(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific write failure
    #[error("storage backend failed: {0}")]
    Backend(String),

    /// A money total or the id counter left its representable range
    #[error("value out of range: {0}")]
    Overflow(String),

    #[error("changes are not permitted for the current session")]
    Forbidden,
}

pub type StoreResult<T> = Result<T, StoreError>;
