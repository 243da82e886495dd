//! In-memory `ProjectsApi` used by the client tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::api::ProjectsApi;
use crate::error::{AppError, AppResult};
use crate::models::{
    MessageResponse, PageRequest, Project, ProjectId, ProjectPage, ProjectStatistics,
    ProjectStatus, RankUpdate,
};

pub fn sample_project(id: ProjectId, rank: i64) -> Project {
    let now = Utc::now();
    Project {
        id,
        name: format!("project-{}", id),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        status: ProjectStatus::Pending,
        rank,
        stared: false,
        quick_access: false,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
struct FakeState {
    projects: Vec<Project>,
    calls: Vec<String>,
    batches: Vec<Vec<RankUpdate>>,
    failure: Option<fn() -> AppError>,
}

fn server_error() -> AppError {
    AppError::Server {
        status: 500,
        message: "boom".to_string(),
    }
}

fn validation_error() -> AppError {
    AppError::invalid("projects", "rejected")
}

/// Behaves like the server for the calls the client makes
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    /// Projects `1..=count`, ranked by id
    pub fn with_projects(count: i64) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().projects = (1..=count).map(|id| sample_project(id, id)).collect();
        api
    }

    /// Make every subsequent call fail with a server error
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failure = failing.then_some(server_error as fn() -> AppError);
    }

    /// Make every subsequent call fail validation
    pub fn reject_with_validation(&self) {
        self.state.lock().unwrap().failure = Some(validation_error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn batches(&self) -> Vec<Vec<RankUpdate>> {
        self.state.lock().unwrap().batches.clone()
    }

    pub fn project(&self, id: ProjectId) -> Option<Project> {
        let state = self.state.lock().unwrap();
        state.projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn set_flags(&self, id: ProjectId, stared: bool, quick_access: bool) {
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.projects.iter_mut().find(|p| p.id == id) {
            p.stared = stared;
            p.quick_access = quick_access;
        }
    }

    fn begin(&self, call: String) -> AppResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(failure) = state.failure {
            return Err(failure());
        }
        Ok(state)
    }

    fn ranked(state: &FakeState) -> Vec<Project> {
        let mut projects = state.projects.clone();
        projects.sort_by_key(|p| (p.rank, p.id));
        projects
    }
}

fn not_found(id: ProjectId) -> AppError {
    AppError::NotFound(format!("Project {} not found", id))
}

#[async_trait]
impl ProjectsApi for FakeApi {
    async fn list_projects(&self, request: &PageRequest) -> AppResult<ProjectPage> {
        let state = self.begin(format!("list:{}", request.page))?;
        let matching: Vec<Project> = Self::ranked(&state)
            .into_iter()
            .filter(|p| p.matches_search(request.search.as_deref().unwrap_or("")))
            .collect();
        let total = matching.len() as u64;
        Ok(ProjectPage {
            data: matching
                .into_iter()
                .skip(request.offset())
                .take(request.per_page as usize)
                .collect(),
            current_page: request.page,
            last_page: ProjectPage::last_page_for(total, request.per_page),
            per_page: request.per_page,
            total,
        })
    }

    async fn set_ranks(&self, updates: &[RankUpdate]) -> AppResult<MessageResponse> {
        let mut state = self.begin("set_ranks".to_string())?;
        state.batches.push(updates.to_vec());
        for update in updates {
            if let Some(p) = state.projects.iter_mut().find(|p| p.id == update.id) {
                p.rank = update.rank;
            }
        }
        Ok(MessageResponse::new("Project orders updated"))
    }

    async fn toggle_favorite(&self, id: ProjectId) -> AppResult<MessageResponse> {
        let mut state = self.begin(format!("toggle_favorite:{}", id))?;
        let project = state.projects.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found(id))?;
        project.stared = !project.stared;
        Ok(MessageResponse::new("ok"))
    }

    async fn add_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse> {
        let mut state = self.begin(format!("add_quick_access:{}", id))?;
        let project = state.projects.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found(id))?;
        project.quick_access = true;
        Ok(MessageResponse::new("ok"))
    }

    async fn remove_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse> {
        let mut state = self.begin(format!("remove_quick_access:{}", id))?;
        if let Some(project) = state.projects.iter_mut().find(|p| p.id == id) {
            project.quick_access = false;
        }
        Ok(MessageResponse::new("ok"))
    }

    async fn statistics(&self) -> AppResult<ProjectStatistics> {
        let state = self.begin("statistics".to_string())?;
        let ranked = Self::ranked(&state);
        let count = |status: ProjectStatus| ranked.iter().filter(|p| p.status == status).count() as u64;
        Ok(ProjectStatistics {
            total_projects: ranked.len() as u64,
            completed_projects: count(ProjectStatus::Completed),
            ongoing_projects: count(ProjectStatus::InProgress),
            pending_projects: count(ProjectStatus::Pending),
            favorite: ranked.iter().filter(|p| p.stared).cloned().collect(),
            quick: ranked.iter().filter(|p| p.quick_access).cloned().collect(),
        })
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<MessageResponse> {
        let mut state = self.begin(format!("delete:{}", id))?;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(not_found(id));
        }
        Ok(MessageResponse::new("Project deleted"))
    }
}
