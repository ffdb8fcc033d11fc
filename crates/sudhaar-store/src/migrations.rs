use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            seq     INTEGER PRIMARY KEY AUTOINCREMENT,
            key     TEXT NOT NULL UNIQUE,
            value   TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        ",
    )?;

    info!("Store migrations complete");
    Ok(())
}
