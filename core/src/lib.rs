//! Core types and the ticket store for the repair desk.
//!
//! The store owns the in-memory table and writes the whole table through a
//! [`TicketBackend`] after every mutation. Search and the financial report
//! are pure functions over the current scan.

pub mod error;
pub mod gate;
pub mod labels;
pub mod memory;
pub mod model;
pub mod policy;
pub mod report;
pub mod schema;
pub mod search;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use gate::{AccessGate, OpenGate};
pub use labels::StatusLabels;
pub use memory::MemoryBackend;
pub use model::*;
pub use policy::IntakePolicy;
pub use report::FinancialReport;
pub use store::{Recovery, Snapshot, TicketBackend, TicketStore};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
