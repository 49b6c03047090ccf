use crate::schema::SELECT_TICKETS;
use crate::{sql_err, Db};
use repairdesk_core::schema::{parse_date, parse_id, parse_money};
use repairdesk_core::{RepairTicket, StoreError, StoreResult, TicketId, TicketStatus};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row};
use rust_decimal::Decimal;

impl Db {
    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        crate::open::table_exists(&self.conn, name).map_err(sql_err)
    }

    pub fn last_id(&self) -> StoreResult<Option<TicketId>> {
        let v: Option<i64> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key='last_id'", [], |r| r.get(0))
            .optional()
            .map_err(sql_err)?;
        Ok(v.map(|v| v.max(0) as TicketId))
    }

    pub fn load_all(&self) -> StoreResult<Vec<RepairTicket>> {
        let mut stmt = self.conn.prepare(SELECT_TICKETS).map_err(sql_err)?;
        let mut rows = stmt.query([]).map_err(sql_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(sql_err)? {
            out.push(decode(row)?);
        }
        Ok(out)
    }
}

fn decode(row: &Row) -> StoreResult<RepairTicket> {
    let cell = |i: usize| row.get::<_, Value>(i).map_err(sql_err);
    let status = text(cell(8)?);
    Ok(RepairTicket {
        id: id(cell(0)?)?,
        customer_name: text(cell(1)?),
        phone: text(cell(2)?),
        brand: text(cell(3)?),
        model: text(cell(4)?),
        issue_description: text(cell(5)?),
        agreed_cost: money(cell(6)?)?,
        parts_cost: money(cell(7)?)?,
        status: TicketStatus::from_storage(&status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown status {status:?}")))?,
        created_date: parse_date(&text(cell(9)?))?,
        photo: match cell(10)? {
            Value::Blob(b) => b,
            Value::Text(s) => s.into_bytes(),
            _ => Vec::new(),
        },
    })
}

// Older databases may hold numbers in columns now declared TEXT.

fn text(v: Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

fn id(v: Value) -> StoreResult<TicketId> {
    match v {
        Value::Integer(i) if i >= 0 => Ok(i as TicketId),
        Value::Integer(i) => Err(StoreError::Corrupt(format!("negative id {i}"))),
        other => parse_id(&text(other)),
    }
}

fn money(v: Value) -> StoreResult<Decimal> {
    match v {
        Value::Integer(i) => Ok(Decimal::from(i)),
        Value::Real(f) => Decimal::try_from(f).map_err(|e| StoreError::Corrupt(format!("bad amount {f}: {e}"))),
        other => parse_money(&text(other)),
    }
}
