//! Project CRUD operations
//!
//! Provides project management methods for the Database.

use chrono::Utc;
use rusqlite::params;

use super::{row_to_project, StorageError, PROJECT_COLUMNS};
use crate::models::{PageRequest, Project, ProjectId, ProjectInput, ProjectPage, DATE_FORMAT};
use crate::storage::Database;

impl Database {
    /// Create a project at the end of the current order with both flags cleared
    pub fn create_project(&self, input: &ProjectInput) -> Result<Project, StorageError> {
        let valid = input.validate().map_err(StorageError::Validation)?;
        let rank = self.next_rank()?;
        let now = Utc::now().to_rfc3339();

        self.connection().execute(
            "INSERT INTO projects (name, start_date, end_date, status, position, stared, quick_access, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)",
            params![
                valid.name,
                valid.start_date.format(DATE_FORMAT).to_string(),
                valid.end_date.format(DATE_FORMAT).to_string(),
                valid.status.as_str(),
                rank,
                now,
            ],
        )?;

        let id = self.connection().last_insert_rowid();
        tracing::debug!(project_id = id, "project created");
        self.get_project(id)?.ok_or(StorageError::ProjectNotFound(id))
    }

    /// Get a project by ID
    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StorageError> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
        let mut stmt = self.connection().prepare(&sql)?;

        match stmt.query_row(params![id], row_to_project) {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the editable fields of a project
    ///
    /// Rank and flags are left untouched.
    pub fn update_project(
        &self,
        id: ProjectId,
        input: &ProjectInput,
    ) -> Result<Project, StorageError> {
        let valid = input.validate().map_err(StorageError::Validation)?;

        let changed = self.connection().execute(
            "UPDATE projects SET name = ?1, start_date = ?2, end_date = ?3, status = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                valid.name,
                valid.start_date.format(DATE_FORMAT).to_string(),
                valid.end_date.format(DATE_FORMAT).to_string(),
                valid.status.as_str(),
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::ProjectNotFound(id));
        }

        self.get_project(id)?.ok_or(StorageError::ProjectNotFound(id))
    }

    /// Delete a project
    ///
    /// Rank, favorite and quick-access state live on the same row, so the
    /// project disappears from every view at once.
    pub fn delete_project(&self, id: ProjectId) -> Result<(), StorageError> {
        let deleted = self
            .connection()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;

        if deleted == 0 {
            return Err(StorageError::ProjectNotFound(id));
        }

        tracing::debug!(project_id = id, "project deleted");
        Ok(())
    }

    /// All projects ordered by rank, ties broken by storage order
    pub fn list_ranked_projects(&self) -> Result<Vec<Project>, StorageError> {
        let sql = format!(
            "SELECT {} FROM projects ORDER BY position ASC, id ASC",
            PROJECT_COLUMNS
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// One page of the ranked list, filtered by name or status
    ///
    /// Filtering runs in Rust so case folding covers non-ASCII names.
    pub fn list_projects(&self, request: &PageRequest) -> Result<ProjectPage, StorageError> {
        let request = request.clone().normalized();
        let mut projects = self.list_ranked_projects()?;

        if let Some(search) = request.search.as_deref() {
            projects.retain(|project| project.matches_search(search));
        }

        let total = projects.len() as u64;
        let data: Vec<Project> = projects
            .into_iter()
            .skip(request.offset())
            .take(request.per_page as usize)
            .collect();

        Ok(ProjectPage {
            data,
            current_page: request.page,
            last_page: ProjectPage::last_page_for(total, request.per_page),
            per_page: request.per_page,
            total,
        })
    }
}
