//! SQLite connection and schema management

use std::path::Path;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

pub const DB_FILE_NAME: &str = "mail.sqlite";

// Bump when the schema below changes so `migrate` can tell old
// databases apart.
const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS user_account (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    date_joined TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE TABLE IF NOT EXISTS session (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES user_account(id),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE TABLE IF NOT EXISTS email (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES user_account(id),
    sender_id INTEGER NOT NULL REFERENCES user_account(id),
    subject TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    timestamp TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    archived INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS email_user_timestamp_idx
    ON email (user_id, timestamp DESC);

CREATE TABLE IF NOT EXISTS email_recipient (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email_id INTEGER NOT NULL REFERENCES email(id),
    user_id INTEGER NOT NULL REFERENCES user_account(id),
    UNIQUE (email_id, user_id)
);

CREATE INDEX IF NOT EXISTS email_recipient_user_idx
    ON email_recipient (user_id);
";

/// Open the database file inside `db_dir`. The directory must
/// already exist.
pub async fn async_db(db_dir: &str) -> Result<Connection, Error> {
    let path = Path::new(db_dir).join(DB_FILE_NAME);
    let db = Connection::open(path).await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Create all tables on a fresh database.
pub fn initialize_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    migrate_db(conn)
}

/// Apply the schema. Every statement is idempotent so this is safe to
/// run against an existing database.
pub fn migrate_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()
}
