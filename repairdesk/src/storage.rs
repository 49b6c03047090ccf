use crate::config::{BackendKind, Config};
use anyhow::Result;
use repairdesk_core::{TicketBackend, TicketStore};
use std::path::Path;
use ticket_csv::CsvBackend;
use tracing::debug;

/// Open the configured backend and load the table. A corrupt file does not
/// fail here; the store records it in `recovery()`.
pub fn open_store(cfg: &Config, data_override: Option<&Path>) -> Result<TicketStore> {
    let (kind, path) = cfg.storage(data_override);
    debug!(backend = ?kind, path = %path.display(), "opening ticket store");
    let backend: Box<dyn TicketBackend> = match kind {
        BackendKind::Csv => Box::new(CsvBackend::new(path)),
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Box::new(ticket_sqlite::SqliteBackend::new(path)),
        #[cfg(not(feature = "sqlite"))]
        BackendKind::Sqlite => anyhow::bail!("sqlite storage requested but built without the `sqlite` feature"),
    };
    Ok(TicketStore::open_boxed(backend).with_policy(cfg.intake_policy()))
}
