mod open;
mod query;
mod schema;
mod write;

pub use open::Db;

use repairdesk_core::{RepairTicket, Snapshot, StoreError, StoreResult, TicketBackend, TicketId};
use rusqlite::ErrorCode;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

/// SQLite-backed ticket table. The connection opens on first use so that
/// an unreadable file surfaces as a load error the store can recover from.
pub struct SqliteBackend {
    path: PathBuf,
    db: Option<Db>,
}

impl SqliteBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteBackend { path: path.into(), db: None }
    }

    fn db(&mut self) -> StoreResult<&mut Db> {
        if self.db.is_none() {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            self.db = Some(Db::open_or_create(&self.path)?);
        }
        self.db.as_mut().ok_or_else(|| StoreError::Backend("database not open".into()))
    }
}

impl TicketBackend for SqliteBackend {
    fn load(&mut self) -> StoreResult<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let db = self.db()?;
        let tickets = db.load_all()?;
        let last_id = db.last_id()?.unwrap_or(0);
        Ok(Snapshot { last_id, tickets })
    }

    fn save(&mut self, last_id: TicketId, tickets: &[RepairTicket]) -> StoreResult<()> {
        self.db()?.replace_all(last_id, tickets).map_err(sql_err)
    }

    fn quarantine(&mut self) -> StoreResult<Option<String>> {
        self.db = None;
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp_fmt = format_description!("[year][month][day]-[hour][minute][second]");
        let stamp = OffsetDateTime::now_utc().format(&stamp_fmt).unwrap_or_else(|_| "unknown".into());
        let suffix = format!(".corrupt-{stamp}");
        let dest = with_suffix(&self.path, &suffix);
        fs::rename(&self.path, &dest)?;
        for side in ["-wal", "-shm"] {
            let p = with_suffix(&self.path, side);
            if p.exists() {
                fs::rename(&p, with_suffix(&dest, side))?;
            }
        }
        warn!(from = %self.path.display(), to = %dest.display(), "unreadable ticket database moved aside");
        Ok(Some(dest.display().to_string()))
    }

    /// A database whose rows fail to decode may still have a readable counter.
    fn last_known_id(&mut self) -> Option<TicketId> {
        if !self.path.exists() {
            return None;
        }
        self.db().ok()?.last_id().ok().flatten()
    }

    fn location(&self) -> String { self.path.display().to_string() }
}

fn with_suffix(path: &std::path::Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

pub(crate) fn sql_err(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if matches!(f.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
            StoreError::Corrupt(e.to_string())
        }
        _ => StoreError::Backend(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairdesk_core::{NewTicket, TicketPatch, TicketStatus, TicketStore};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn ticket(id: TicketId, name: &str) -> RepairTicket {
        RepairTicket {
            id,
            customer_name: name.into(),
            phone: "0925550000".into(),
            brand: "Infinix".into(),
            model: "Hot 30".into(),
            issue_description: "speaker".into(),
            agreed_cost: dec!(35.75),
            parts_cost: dec!(12),
            status: TicketStatus::Delivered,
            created_date: Some(date!(2023-12-31)),
            photo: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = SqliteBackend::new(dir.path().join("repairs.db"));
        let mut other = ticket(1001, "Hana");
        other.status = TicketStatus::InRepair;
        other.photo.clear();
        let table = vec![ticket(1004, "Khaled"), other];
        b.save(1004, &table).unwrap();

        let mut fresh = SqliteBackend::new(dir.path().join("repairs.db"));
        let snap = fresh.load().unwrap();
        assert_eq!(snap.last_id, 1004);
        assert_eq!(snap.tickets, table);
    }

    #[test]
    fn missing_file_is_not_created_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.db");
        let mut b = SqliteBackend::new(&path);
        assert_eq!(b.load().unwrap(), Snapshot::default());
        assert!(!path.exists());
    }

    #[test]
    fn legacy_table_is_healed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tickets (id INTEGER PRIMARY KEY, customer_name TEXT, phone TEXT, agreed_cost REAL, status TEXT);
                 INSERT INTO tickets VALUES (1001, 'Ali', '0911', 80.0, 'delivered');
                 INSERT INTO tickets VALUES (1002, 'Mona', NULL, 25, NULL);",
            )
            .unwrap();
        }
        let mut b = SqliteBackend::new(&path);
        assert!(b.db().unwrap().table_exists("meta").unwrap());
        let snap = b.load().unwrap();
        assert_eq!(snap.last_id, 0);
        let t = &snap.tickets;
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].agreed_cost, dec!(80));
        assert_eq!(t[0].status, TicketStatus::Delivered);
        assert_eq!(t[0].parts_cost, Decimal::ZERO);
        assert_eq!(t[0].created_date, None);
        assert_eq!(t[1].phone, "");
        assert_eq!(t[1].status, TicketStatus::InRepair);

        let mut s = TicketStore::open(SqliteBackend::new(&path));
        let id = s.create(NewTicket { customer_name: "new".into(), ..Default::default() }).unwrap();
        assert_eq!(id, 1003);
    }

    #[test]
    fn garbage_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repairs.db");
        fs::write(&path, "this is definitely not a sqlite database ".repeat(40)).unwrap();

        let mut b = SqliteBackend::new(&path);
        assert!(matches!(b.load(), Err(StoreError::Corrupt(_))));

        let mut s = TicketStore::open(SqliteBackend::new(&path));
        let rec = s.recovery().cloned().expect("recovered");
        assert!(rec.quarantined.unwrap().contains(".corrupt-"));
        assert!(!path.exists());
        s.create(NewTicket { customer_name: "after".into(), ..Default::default() }).unwrap();
        assert_eq!(TicketStore::open(SqliteBackend::new(&path)).scan().len(), 1);
    }

    #[test]
    fn store_round_trip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repairs.db");
        let mut s = TicketStore::open(SqliteBackend::new(&path));
        let a = s.create(NewTicket { customer_name: "a".into(), agreed_cost: dec!(100), ..Default::default() }).unwrap();
        let b = s.create(NewTicket { customer_name: "b".into(), agreed_cost: dec!(50), ..Default::default() }).unwrap();
        let done = TicketPatch { status: Some(TicketStatus::Delivered), parts_cost: Some(dec!(30)), ..Default::default() };
        s.update(a, &done).unwrap();
        s.delete(b).unwrap();
        let before = s.scan().to_vec();
        drop(s);

        let mut s = TicketStore::open(SqliteBackend::new(&path));
        assert_eq!(s.scan(), before.as_slice());
        assert_eq!(s.report().unwrap().net_profit, dec!(70));
        assert_eq!(s.create(NewTicket { customer_name: "c".into(), ..Default::default() }).unwrap(), 1003);
    }

    #[test]
    fn undecodable_rows_keep_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repairs.db");
        let mut s = TicketStore::open(SqliteBackend::new(&path));
        for name in ["a", "b", "c"] {
            s.create(NewTicket { customer_name: name.into(), ..Default::default() }).unwrap();
        }
        drop(s);
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute("UPDATE tickets SET status='lost' WHERE id=1002", []).unwrap();
        }

        let mut s = TicketStore::open(SqliteBackend::new(&path));
        assert!(s.recovery().unwrap().reason.contains("unknown status"));
        assert_eq!(s.create(NewTicket { customer_name: "d".into(), ..Default::default() }).unwrap(), 1004);
    }
}
