pub mod migrations;
pub mod repository;
pub mod store;

#[cfg(test)]
pub mod test_support;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use migrations::run_migrations;

/// Open (or create) the database file and bring the schema up to date.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Opening database at {:?}", path))?;

    // WAL for concurrent readers; cascades need foreign keys on per connection
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;
    log::debug!("database ready at {:?}", path);
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run_migrations(&conn)?;
    Ok(conn)
}
