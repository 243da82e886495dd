//! Repository layer for database CRUD operations
//!
//! Project CRUD lives in `project`, the rank store in `ranks` and the flag
//! store (favorite / quick access, plus dashboard statistics) in `flags`.

mod flags;
mod project;
mod ranks;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::Serialize;

pub use super::error::StorageError;
use crate::models::{Project, ProjectId, ProjectStatus, DATE_FORMAT};

/// Column list matching [`row_to_project`]
pub(super) const PROJECT_COLUMNS: &str =
    "id, name, start_date, end_date, status, position, stared, quick_access, created_at, updated_at";

/// Outcome of one batch reorder
///
/// Rows are written independently, so a batch may be partially applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankBatchReport {
    /// Number of row updates that hit an existing project
    pub applied: usize,
    /// Ids that matched no row
    pub missing: Vec<ProjectId>,
    /// Ids whose update failed at the database level
    pub failed: Vec<ProjectId>,
}

impl RankBatchReport {
    /// True when every update in the batch landed
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| conversion_error(idx, format!("invalid date {:?}: {}", raw, e)))
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, format!("invalid timestamp {:?}: {}", raw, e)))
}

/// Map a row selected with [`PROJECT_COLUMNS`]
pub(super) fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let start_date: String = row.get(2)?;
    let end_date: String = row.get(3)?;
    let status: String = row.get(4)?;
    let stared: i32 = row.get(6)?;
    let quick_access: i32 = row.get(7)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: parse_date(2, &start_date)?,
        end_date: parse_date(3, &end_date)?,
        status: status
            .parse::<ProjectStatus>()
            .map_err(|e| conversion_error(4, e))?,
        rank: row.get(5)?,
        stared: stared != 0,
        quick_access: quick_access != 0,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: parse_timestamp(9, &updated_at)?,
    })
}
