//! Database migrations
//!
//! Additive schema changes, each guarded by a `pragma_table_info` lookup so
//! they can run against every existing database.

use rusqlite::Connection;

use super::error::StorageError;

/// Run all database migrations for schema updates
pub(super) fn run_all(conn: &Connection) -> Result<(), StorageError> {
    // Rank store: global ordering column
    run_position_migration(conn)?;

    // Flag store: favorite and quick-access columns
    run_flags_migration(conn)?;

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get::<_, i32>(0).map(|c| c > 0),
    )
    .unwrap_or(false)
}

/// Migration: Add position column, backfilled in creation order
fn run_position_migration(conn: &Connection) -> Result<(), StorageError> {
    if !has_column(conn, "projects", "position") {
        conn.execute_batch(
            "ALTER TABLE projects ADD COLUMN position INTEGER NOT NULL DEFAULT 0;
             UPDATE projects SET position = id;",
        )?;
    }

    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_projects_position ON projects(position, id);")?;

    Ok(())
}

/// Migration: Add stared and quick_access columns
fn run_flags_migration(conn: &Connection) -> Result<(), StorageError> {
    if !has_column(conn, "projects", "stared") {
        conn.execute_batch("ALTER TABLE projects ADD COLUMN stared INTEGER NOT NULL DEFAULT 0;")?;
    }

    if !has_column(conn, "projects", "quick_access") {
        conn.execute_batch(
            "ALTER TABLE projects ADD COLUMN quick_access INTEGER NOT NULL DEFAULT 0;",
        )?;
    }

    Ok(())
}
