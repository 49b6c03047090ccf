use crate::sibling;
use repairdesk_core::{StoreError, StoreResult, TicketId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    last_id: TicketId,
}

/// Missing or unreadable sidecars yield `None`; the store then derives
/// the counter from the ids in the table.
pub(crate) fn read_last_id(path: &Path) -> Option<TicketId> {
    let s = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Meta>(&s) {
        Ok(m) => Some(m.last_id),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable id counter");
            None
        }
    }
}

pub(crate) fn write_last_id(path: &Path, last_id: TicketId) -> StoreResult<()> {
    let body = serde_json::to_string(&Meta { last_id }).map_err(|e| StoreError::Backend(e.to_string()))?;
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
