use crate::schema::MIG_0001_INIT;
use crate::sql_err;
use repairdesk_core::schema::COLUMNS;
use repairdesk_core::StoreResult;
use rusqlite::Connection;
use tracing::{debug, info};

pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn open_or_create(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(sql_err)?;
        apply_pragmas(&conn).map_err(sql_err)?;
        migrate(&conn).map_err(sql_err)?;
        Ok(Db { conn })
    }
}

fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
    debug!(journal_mode = %mode, "sqlite journal mode");
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let fresh = !table_exists(conn, "tickets")?;
    conn.execute_batch(MIG_0001_INIT)?;
    if fresh {
        debug!("created tickets schema");
        return Ok(());
    }
    heal_columns(conn)
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let cnt: i64 = conn.query_row(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
        [name],
        |r| r.get(0),
    )?;
    Ok(cnt > 0)
}

/// Older databases get any missing ticket column added with its default.
fn heal_columns(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(tickets)")?;
    let present: Vec<String> = stmt.query_map([], |r| r.get::<_, String>(1))?.collect::<rusqlite::Result<_>>()?;
    for col in COLUMNS.iter().filter(|c| !present.iter().any(|p| p == c.name)) {
        conn.execute_batch(&format!(
            "ALTER TABLE tickets ADD COLUMN {} {} NOT NULL DEFAULT {}",
            col.name,
            col.sql_type(),
            col.sql_default()
        ))?;
        info!(column = col.name, "added missing column to tickets table");
    }
    Ok(())
}
