//! Flag store operations
//!
//! Favorite is a toggle. Quick access is add / remove so that a retried
//! request cannot flip membership back.

use chrono::Utc;
use rusqlite::params;

use super::{row_to_project, StorageError, PROJECT_COLUMNS};
use crate::models::{Project, ProjectId, ProjectStatistics, ProjectStatus};
use crate::storage::Database;

impl Database {
    /// Flip the favorite flag and return its new value
    pub fn toggle_favorite(&self, id: ProjectId) -> Result<bool, StorageError> {
        let changed = self.connection().execute(
            "UPDATE projects SET stared = 1 - stared, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;

        if changed == 0 {
            return Err(StorageError::ProjectNotFound(id));
        }

        let stared: i32 = self.connection().query_row(
            "SELECT stared FROM projects WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(stared != 0)
    }

    /// Put a project into quick access; repeated adds are harmless
    pub fn add_quick_access(&self, id: ProjectId) -> Result<(), StorageError> {
        let changed = self.connection().execute(
            "UPDATE projects SET quick_access = 1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;

        if changed == 0 {
            return Err(StorageError::ProjectNotFound(id));
        }
        Ok(())
    }

    /// Take a project out of quick access
    ///
    /// Returns whether it was a member. Non-members and unknown ids are a
    /// no-op.
    pub fn remove_quick_access(&self, id: ProjectId) -> Result<bool, StorageError> {
        let changed = self.connection().execute(
            "UPDATE projects SET quick_access = 0, updated_at = ?1 WHERE id = ?2 AND quick_access = 1",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(changed > 0)
    }

    /// Favorite projects ordered by rank
    pub fn favorite_projects(&self) -> Result<Vec<Project>, StorageError> {
        self.flagged_projects("stared")
    }

    /// Quick-access projects ordered by rank
    pub fn quick_access_projects(&self) -> Result<Vec<Project>, StorageError> {
        self.flagged_projects("quick_access")
    }

    fn flagged_projects(&self, column: &'static str) -> Result<Vec<Project>, StorageError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE {} = 1 ORDER BY position ASC, id ASC",
            PROJECT_COLUMNS, column
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Dashboard counters together with both derived views
    pub fn statistics(&self) -> Result<ProjectStatistics, StorageError> {
        let (total, completed, ongoing, pending): (i64, i64, i64, i64) =
            self.connection().query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = ?2 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = ?3 THEN 1 ELSE 0 END), 0)
                 FROM projects",
                params![
                    ProjectStatus::Completed.as_str(),
                    ProjectStatus::InProgress.as_str(),
                    ProjectStatus::Pending.as_str(),
                ],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        Ok(ProjectStatistics {
            total_projects: total as u64,
            completed_projects: completed as u64,
            ongoing_projects: ongoing as u64,
            pending_projects: pending as u64,
            favorite: self.favorite_projects()?,
            quick: self.quick_access_projects()?,
        })
    }
}
