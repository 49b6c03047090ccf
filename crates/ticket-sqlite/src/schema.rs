pub const MIG_0001_INIT: &str = r#"
BEGIN;

-- rows keep table order through rowid; id is the ticket number
CREATE TABLE IF NOT EXISTS tickets (
  id                 INTEGER NOT NULL UNIQUE,
  customer_name      TEXT NOT NULL DEFAULT '',
  phone              TEXT NOT NULL DEFAULT '',
  brand              TEXT NOT NULL DEFAULT '',
  model              TEXT NOT NULL DEFAULT '',
  issue_description  TEXT NOT NULL DEFAULT '',
  agreed_cost        TEXT NOT NULL DEFAULT '0',
  parts_cost         TEXT NOT NULL DEFAULT '0',
  status             TEXT NOT NULL DEFAULT 'in_repair',
  created_date       TEXT NOT NULL DEFAULT '',
  photo              BLOB NOT NULL DEFAULT X''
);

CREATE TABLE IF NOT EXISTS meta (
  key                TEXT PRIMARY KEY,
  value              INTEGER NOT NULL
);

COMMIT;
"#
;

pub const SELECT_TICKETS: &str =
    "SELECT id, customer_name, phone, brand, model, issue_description, agreed_cost, parts_cost, status, created_date, photo FROM tickets ORDER BY rowid";
