//! Column layout shared by every persistence backend.
//!
//! Backends heal older tables against [`COLUMNS`]: a column that is absent
//! from the stored table is read as its declared default instead of
//! rejecting the file.

use crate::error::{StoreError, StoreResult};
use crate::model::{TicketId, MAX_TICKET_ID};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::macros::format_description;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Id,
    Text,
    Money,
    Status,
    Date,
    Blob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self { Column { name, kind } }

    /// Text written for a missing cell: `0` for numeric columns, empty otherwise.
    pub fn default_text(&self) -> &'static str {
        match self.kind {
            ColumnKind::Id | ColumnKind::Money => "0",
            _ => "",
        }
    }

    pub fn sql_type(&self) -> &'static str {
        match self.kind {
            ColumnKind::Id => "INTEGER",
            ColumnKind::Blob => "BLOB",
            _ => "TEXT",
        }
    }

    pub fn sql_default(&self) -> &'static str {
        match self.kind {
            ColumnKind::Id => "0",
            ColumnKind::Money => "'0'",
            ColumnKind::Blob => "X''",
            _ => "''",
        }
    }
}

pub const COLUMNS: [Column; 11] = [
    Column::new("id", ColumnKind::Id),
    Column::new("customer_name", ColumnKind::Text),
    Column::new("phone", ColumnKind::Text),
    Column::new("brand", ColumnKind::Text),
    Column::new("model", ColumnKind::Text),
    Column::new("issue_description", ColumnKind::Text),
    Column::new("agreed_cost", ColumnKind::Money),
    Column::new("parts_cost", ColumnKind::Money),
    Column::new("status", ColumnKind::Status),
    Column::new("created_date", ColumnKind::Date),
    Column::new("photo", ColumnKind::Blob),
];

pub fn column_names() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|c| c.name)
}

/// Blank cells read as id 0, which the store replaces with a fresh id.
/// Ids above [`MAX_TICKET_ID`] are corrupt.
pub fn parse_id(s: &str) -> StoreResult<TicketId> {
    let t = s.trim();
    if t.is_empty() { return Ok(0); }
    let bad = || StoreError::Corrupt(format!("bad id {t:?}"));
    if let Ok(v) = t.parse::<TicketId>() {
        return if v <= MAX_TICKET_ID { Ok(v) } else { Err(bad()) };
    }
    // spreadsheet exports write integers as `1001.0`
    match t.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f < MAX_TICKET_ID as f64 => Ok(f as TicketId),
        _ => Err(bad()),
    }
}

pub fn parse_money(s: &str) -> StoreResult<Decimal> {
    let t = s.trim();
    if t.is_empty() { return Ok(Decimal::ZERO); }
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .map_err(|_| StoreError::Corrupt(format!("bad amount {t:?}")))
}

pub fn parse_date(s: &str) -> StoreResult<Option<Date>> {
    let t = s.trim();
    if t.is_empty() { return Ok(None); }
    let format = format_description!("[year]-[month]-[day]");
    // tolerate a trailing time component
    let day = t.get(..10).unwrap_or(t);
    Date::parse(day, &format).map(Some).map_err(|_| StoreError::Corrupt(format!("bad date {t:?}")))
}

pub fn format_date(date: Option<Date>) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.and_then(|d| d.format(&format).ok()).unwrap_or_default()
}
