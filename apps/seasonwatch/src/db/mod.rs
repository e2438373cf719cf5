//! Database module for seasonwatch.
//!
//! Provides database initialization, migrations, reset, and the show repository.

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

pub mod models;
pub mod repository;

pub use repository::ShowRepository;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("src/db/migrations");
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("Database directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure connection with recommended pragmas
fn configure_connection(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

/// Initialize database connection and run migrations.
///
/// Creates the parent directory of `db_path` if it does not exist yet.
pub fn init_db<P: AsRef<Path>>(db_path: P) -> Result<Connection, DbError> {
    let db_path = db_path.as_ref();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(db_path)?;
    configure_connection(&conn)?;
    embedded::migrations::runner().run(&mut conn)?;
    Ok(conn)
}

/// Initialize an in-memory database (useful for testing)
pub fn init_db_memory() -> Result<Connection, DbError> {
    let mut conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    embedded::migrations::runner().run(&mut conn)?;
    Ok(conn)
}

/// Drop every table and recreate the schema from scratch.
///
/// All tracked shows, seasons and library rows are lost. Foreign keys are
/// switched back on whether or not the drops succeed.
pub fn reset_db(conn: &mut Connection) -> Result<(), DbError> {
    // Has no effect inside a transaction, so it must precede the drops.
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    let dropped = drop_tables(conn);
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    dropped?;

    embedded::migrations::runner().run(conn)?;
    tracing::info!("Database reset, schema recreated");
    Ok(())
}

/// Drop all tables in one transaction. Rolled back on failure.
fn drop_tables(conn: &Connection) -> Result<(), DbError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "DROP TABLE IF EXISTS seasons;
         DROP TABLE IF EXISTS library_shows;
         DROP TABLE IF EXISTS shows;
         DROP TABLE IF EXISTS refinery_schema_history;",
    )?;
    tx.commit()?;
    Ok(())
}
