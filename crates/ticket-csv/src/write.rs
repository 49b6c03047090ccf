use crate::sibling;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use repairdesk_core::schema::{self, column_names};
use repairdesk_core::{RepairTicket, StoreError, StoreResult};
use std::fs::{self, File};
use std::path::Path;

/// Rewrite the whole table at `path`. Readers never see a half-written file.
pub fn write_tickets(path: &Path, tickets: &[RepairTicket]) -> StoreResult<()> {
    let tmp = sibling(path, ".tmp");
    let mut wtr = csv::Writer::from_writer(File::create(&tmp)?);
    wtr.write_record(column_names()).map_err(backend_err)?;
    for t in tickets {
        wtr.write_record(encode(t)).map_err(backend_err)?;
    }
    let file = wtr.into_inner().map_err(|e| StoreError::Backend(e.to_string()))?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn encode(t: &RepairTicket) -> [String; 11] {
    [
        t.id.to_string(),
        t.customer_name.clone(),
        t.phone.clone(),
        t.brand.clone(),
        t.model.clone(),
        t.issue_description.clone(),
        t.agreed_cost.to_string(),
        t.parts_cost.to_string(),
        t.status.as_storage().to_string(),
        schema::format_date(t.created_date),
        if t.photo.is_empty() { String::new() } else { STANDARD.encode(&t.photo) },
    ]
}

fn backend_err(e: csv::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
