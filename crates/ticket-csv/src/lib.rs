//! Flat CSV table for repair tickets.
//!
//! The table file holds one row per ticket under a header row; the id
//! counter lives next to it in `<file>.meta.json`. Every save rewrites the
//! whole file through a temporary sibling and a rename.

mod meta;
mod read;
mod write;

pub use read::read_tickets;
pub use write::write_tickets;

use repairdesk_core::{RepairTicket, Snapshot, StoreResult, TicketBackend, TicketId};
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

pub struct CsvBackend {
    path: PathBuf,
}

impl CsvBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn meta_path(&self) -> PathBuf { sibling(&self.path, ".meta.json") }
}

impl TicketBackend for CsvBackend {
    fn load(&mut self) -> StoreResult<Snapshot> {
        let last_id = meta::read_last_id(&self.meta_path()).unwrap_or(0);
        if !self.path.exists() {
            return Ok(Snapshot { last_id, tickets: Vec::new() });
        }
        let tickets = read_tickets(&self.path)?;
        Ok(Snapshot { last_id, tickets })
    }

    fn save(&mut self, last_id: TicketId, tickets: &[RepairTicket]) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // counter first: a counter ahead of the table only skips ids
        meta::write_last_id(&self.meta_path(), last_id)?;
        write_tickets(&self.path, tickets)
    }

    fn quarantine(&mut self) -> StoreResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp_fmt = format_description!("[year][month][day]-[hour][minute][second]");
        let stamp = OffsetDateTime::now_utc().format(&stamp_fmt).unwrap_or_else(|_| "unknown".into());
        let dest = sibling(&self.path, &format!(".corrupt-{stamp}"));
        fs::rename(&self.path, &dest)?;
        warn!(from = %self.path.display(), to = %dest.display(), "unreadable ticket table moved aside");
        Ok(Some(dest.display().to_string()))
    }

    /// The sidecar is not quarantined with the table, so its counter holds.
    fn last_known_id(&mut self) -> Option<TicketId> { meta::read_last_id(&self.meta_path()) }

    fn location(&self) -> String { self.path.display().to_string() }
}

/// `path` with `suffix` appended to the file name.
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
