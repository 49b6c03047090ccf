use crate::Db;
use repairdesk_core::schema::format_date;
use repairdesk_core::{RepairTicket, TicketId};
use rusqlite::params;

impl Db {
    /// Swap the stored table for `tickets` in one transaction.
    pub fn replace_all(&mut self, last_id: TicketId, tickets: &[RepairTicket]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM tickets", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tickets(id,customer_name,phone,brand,model,issue_description,agreed_cost,parts_cost,status,created_date,photo)
                 VALUES (?,?,?,?,?,?,?,?,?,?,?)",
            )?;
            for t in tickets {
                stmt.execute(params![
                    t.id as i64,
                    t.customer_name,
                    t.phone,
                    t.brand,
                    t.model,
                    t.issue_description,
                    t.agreed_cost.to_string(),
                    t.parts_cost.to_string(),
                    t.status.as_storage(),
                    format_date(t.created_date),
                    t.photo,
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO meta(key,value) VALUES ('last_id',?) ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![last_id as i64],
        )?;
        tx.commit()
    }
}
