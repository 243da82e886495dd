//! HTTP route handlers
//!
//! Each request locks the shared database for the duration of one storage
//! call; no session state is kept between requests.

use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use super::extract::{JsonBody, PathParam, QueryParams};
use crate::error::{AppError, AppResult};
use crate::models::{
    FavoritesResponse, MessageResponse, PageRequest, Project, ProjectId, ProjectInput,
    ProjectPageResponse, ProjectResponse, ProjectStatistics, RankBatchRequest,
};
use crate::storage::{Database, StorageError};

/// Shared state
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    /// Static bearer token; `None` leaves project routes open
    pub api_token: Option<String>,
    pub default_page_size: u32,
}

impl AppState {
    /// Run one storage call under the database lock
    fn with_db<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> Result<T, StorageError>,
    {
        let guard = self.db.lock().map_err(|_| StorageError::LockError)?;
        Ok(f(&guard)?)
    }
}

/// Query string of `GET /projects`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<Json<ProjectPageResponse>> {
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(state.default_page_size),
        query.search,
    );
    let page = state.with_db(|db| db.list_projects(&request))?;
    Ok(Json(ProjectPageResponse { projects: page }))
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state.with_db(|db| db.create_project(&input))?;
    tracing::info!(project_id = project.id, rank = project.rank, "project created");
    Ok((StatusCode::CREATED, Json(ProjectResponse { project })))
}

/// GET /projects/{id}
pub async fn show_project(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = state
        .with_db(|db| db.get_project(id))?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;
    Ok(Json(ProjectResponse { project }))
}

/// PUT /projects/{id}
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> AppResult<Json<ProjectResponse>> {
    let project = state.with_db(|db| db.update_project(id, &input))?;
    Ok(Json(ProjectResponse { project }))
}

/// DELETE /projects/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<MessageResponse>> {
    state.with_db(|db| db.delete_project(id))?;
    tracing::info!(project_id = id, "project deleted");
    Ok(Json(MessageResponse::new("Project deleted")))
}

/// PUT /project/update-orders
///
/// Rows are committed one by one; ids that match nothing are logged and the
/// call still succeeds as a whole.
pub async fn update_orders(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RankBatchRequest>,
) -> AppResult<Json<MessageResponse>> {
    let report = state.with_db(|db| db.set_ranks(&request.projects))?;
    tracing::info!(
        submitted = request.projects.len(),
        applied = report.applied,
        "rank batch processed"
    );
    Ok(Json(MessageResponse::new("Project orders updated")))
}

/// PUT /project/{id}/changeFavorite
pub async fn change_favorite(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<MessageResponse>> {
    let stared = state.with_db(|db| db.toggle_favorite(id))?;
    let message = if stared {
        "Project added to favorites"
    } else {
        "Project removed from favorites"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// PUT /project/{id}/changeQuickAccess
pub async fn change_quick_access(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<MessageResponse>> {
    state.with_db(|db| db.add_quick_access(id))?;
    Ok(Json(MessageResponse::new("Project added to quick access")))
}

/// PUT /project/{id}/removeQuickAccess
pub async fn remove_quick_access(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<MessageResponse>> {
    let was_member = state.with_db(|db| db.remove_quick_access(id))?;
    let message = if was_member {
        "Project removed from quick access"
    } else {
        "Project was not in quick access"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// GET /project/myFavorites
pub async fn my_favorites(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<FavoritesResponse>> {
    let favorite = state.with_db(|db| db.favorite_projects())?;
    Ok(Json(FavoritesResponse { favorite }))
}

/// GET /project/quickAccess
pub async fn quick_access(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Project>>> {
    let projects = state.with_db(|db| db.quick_access_projects())?;
    Ok(Json(projects))
}

/// GET /project/statistics
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ProjectStatistics>> {
    let stats = state.with_db(|db| db.statistics())?;
    Ok(Json(stats))
}

/// GET /api/health
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "project-deck"
        })),
    )
}
