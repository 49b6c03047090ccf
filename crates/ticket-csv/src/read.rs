use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use csv::StringRecord;
use repairdesk_core::schema::{self, Column, COLUMNS};
use repairdesk_core::{RepairTicket, StoreError, StoreResult, TicketStatus};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Where each schema column sits in the file, if it is there at all.
struct Layout {
    slots: Vec<(Column, Option<usize>)>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Self {
        let slots = COLUMNS
            .iter()
            .map(|c| (*c, headers.iter().position(|h| h.trim_start_matches('\u{feff}').trim() == c.name)))
            .collect();
        Layout { slots }
    }

    fn recognised(&self) -> usize { self.slots.iter().filter(|(_, s)| s.is_some()).count() }

    fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().filter(|(_, s)| s.is_none()).map(|(c, _)| c.name)
    }

    fn cell<'r>(&self, rec: &'r StringRecord, name: &str) -> &'r str {
        match self.slots.iter().find(|(c, _)| c.name == name) {
            Some((c, slot)) => slot.and_then(|j| rec.get(j)).unwrap_or(c.default_text()),
            None => "",
        }
    }
}

pub fn read_tickets(path: &Path) -> StoreResult<Vec<RepairTicket>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = rdr.headers().map_err(|e| StoreError::Corrupt(e.to_string()))?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let layout = Layout::from_headers(&headers);
    if layout.recognised() == 0 {
        return Err(StoreError::Corrupt(format!("no ticket columns in header of {}", path.display())));
    }
    for name in layout.missing() {
        debug!(column = name, "column missing from table, using default");
    }

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        let t = decode(&layout, &rec).map_err(|e| match e {
            StoreError::Corrupt(msg) => StoreError::Corrupt(format!("line {line}: {msg}")),
            other => other,
        })?;
        out.push(t);
    }
    Ok(out)
}

fn decode(layout: &Layout, rec: &StringRecord) -> StoreResult<RepairTicket> {
    let cell = |name: &str| layout.cell(rec, name);
    let status = TicketStatus::from_storage(cell("status"))
        .ok_or_else(|| StoreError::Corrupt(format!("unknown status {:?}", cell("status"))))?;
    let photo = match cell("photo").trim() {
        "" => Vec::new(),
        b64 => STANDARD.decode(b64).map_err(|e| StoreError::Corrupt(format!("bad photo: {e}")))?,
    };
    Ok(RepairTicket {
        id: schema::parse_id(cell("id"))?,
        customer_name: cell("customer_name").to_string(),
        phone: cell("phone").to_string(),
        brand: cell("brand").to_string(),
        model: cell("model").to_string(),
        issue_description: cell("issue_description").to_string(),
        agreed_cost: schema::parse_money(cell("agreed_cost"))?,
        parts_cost: schema::parse_money(cell("parts_cost"))?,
        status,
        created_date: schema::parse_date(cell("created_date"))?,
        photo,
    })
}
