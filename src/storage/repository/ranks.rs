//! Rank store operations
//!
//! Batch reorders are applied row by row in submission order. A row that
//! fails or matches nothing is recorded and the batch continues.

use chrono::Utc;
use rusqlite::params;

use super::{RankBatchReport, StorageError};
use crate::models::{RankUpdate, MAX_RANK};
use crate::storage::Database;

impl Database {
    /// Write a batch of `(id, rank)` pairs
    ///
    /// Updates are neither reordered nor coalesced: when an id appears twice
    /// the later pair wins. A rank outside `0..=MAX_RANK` rejects the whole
    /// batch before any write.
    pub fn set_ranks(&self, updates: &[RankUpdate]) -> Result<RankBatchReport, StorageError> {
        if let Some(bad) = updates.iter().find(|u| !(0..=MAX_RANK).contains(&u.rank)) {
            return Err(StorageError::InvalidInput(format!(
                "rank for project {} must be between 0 and {} (got {})",
                bad.id, MAX_RANK, bad.rank
            )));
        }

        let now = Utc::now().to_rfc3339();
        let mut report = RankBatchReport::default();

        for update in updates {
            let result = self.connection().execute(
                "UPDATE projects SET position = ?1, updated_at = ?2 WHERE id = ?3",
                params![update.rank, now, update.id],
            );

            match result {
                Ok(0) => report.missing.push(update.id),
                Ok(_) => report.applied += 1,
                Err(e) => {
                    tracing::warn!(project_id = update.id, error = %e, "rank update failed");
                    report.failed.push(update.id);
                }
            }
        }

        if !report.is_complete() {
            tracing::warn!(
                applied = report.applied,
                missing = ?report.missing,
                failed = ?report.failed,
                "rank batch partially applied"
            );
        }

        Ok(report)
    }

    /// Rank a newly created project would receive
    pub fn next_rank(&self) -> Result<i64, StorageError> {
        let max: Option<i64> =
            self.connection()
                .query_row("SELECT MAX(position) FROM projects", [], |row| row.get(0))?;

        max.unwrap_or(0).checked_add(1).ok_or_else(|| {
            StorageError::InvalidInput("no rank left above the last project".to_string())
        })
    }
}
