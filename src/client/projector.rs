//! Derived favorites / quick-access views
//!
//! Both lists are patched locally before the server call goes out. Failed
//! calls are logged and the local state is kept until the next `refresh`.
//! A validation rejection is the exception: the change is undone and the
//! error handed back to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use super::api::ProjectsApi;
use super::collection::OrderedCollection;
use super::list_controller::FetchState;
use crate::error::{AppError, AppResult};
use crate::models::{MessageResponse, Project, ProjectId, ProjectStatistics};

/// Dashboard counters taken from the statistics endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounters {
    pub total: u64,
    pub completed: u64,
    pub ongoing: u64,
    pub pending: u64,
}

impl From<&ProjectStatistics> for DashboardCounters {
    fn from(stats: &ProjectStatistics) -> Self {
        Self {
            total: stats.total_projects,
            completed: stats.completed_projects,
            ongoing: stats.ongoing_projects,
            pending: stats.pending_projects,
        }
    }
}

/// Server answer to an optimistic view change
#[derive(Debug)]
pub enum Ack {
    Confirmed,
    /// The call failed; the local change was kept
    Failed(AppError),
    /// The server refused the change as invalid; the local change was undone
    Rejected(AppError),
}

impl Ack {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Ack::Confirmed)
    }
}

type ViewSnapshot = (OrderedCollection<Project>, OrderedCollection<Project>);

pub struct DerivedViewProjector<A: ProjectsApi + ?Sized> {
    api: Arc<A>,
    favorites: OrderedCollection<Project>,
    quick_access: OrderedCollection<Project>,
    counters: DashboardCounters,
    fetch_state: FetchState,
}

impl<A: ProjectsApi + ?Sized> DerivedViewProjector<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            favorites: OrderedCollection::new(),
            quick_access: OrderedCollection::new(),
            counters: DashboardCounters::default(),
            fetch_state: FetchState::Idle,
        }
    }

    pub fn favorites(&self) -> &[Project] {
        self.favorites.items()
    }

    pub fn quick_access(&self) -> &[Project] {
        self.quick_access.items()
    }

    pub fn counters(&self) -> DashboardCounters {
        self.counters
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }

    pub fn needs_fetch(&self) -> bool {
        matches!(self.fetch_state, FetchState::Idle | FetchState::Error(_))
    }

    pub fn is_favorite(&self, id: ProjectId) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_quick_access(&self, id: ProjectId) -> bool {
        self.quick_access.contains(id)
    }

    /// Replace both views and the counters from the statistics endpoint
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.fetch_state = FetchState::Loading;
        match self.api.statistics().await {
            Ok(stats) => {
                self.counters = DashboardCounters::from(&stats);
                self.favorites.replace_all(stats.favorite);
                self.quick_access.replace_all(stats.quick);
                self.fetch_state = FetchState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load project statistics");
                self.fetch_state = FetchState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Flip favorite membership locally, then tell the server
    pub async fn toggle_favorite(&mut self, project: &Project) -> Ack {
        let id = project.id;
        let before = self.snapshot();
        let now_favorite = if self.favorites.remove(id).is_some() {
            false
        } else {
            let mut favorite = project.clone();
            favorite.stared = true;
            favorite.quick_access = self.quick_access.contains(id);
            self.favorites.push_unique(favorite);
            true
        };
        if let Some(pinned) = self.quick_access.find_mut(id) {
            pinned.stared = now_favorite;
        }
        debug!(project_id = id, favorite = now_favorite, "toggled favorite locally");

        let result = self.api.toggle_favorite(id).await;
        self.settle("toggle favorite", id, result, before)
    }

    /// Pin a project; a project already pinned is not duplicated
    pub async fn add_quick_access(&mut self, project: &Project) -> Ack {
        let before = self.snapshot();
        self.pin_locally(project);
        let result = self.api.add_quick_access(project.id).await;
        self.settle("add quick access", project.id, result, before)
    }

    pub async fn remove_quick_access(&mut self, id: ProjectId) -> Ack {
        let before = self.snapshot();
        self.quick_access.remove(id);
        if let Some(favorite) = self.favorites.find_mut(id) {
            favorite.quick_access = false;
        }
        let result = self.api.remove_quick_access(id).await;
        self.settle("remove quick access", id, result, before)
    }

    /// Handle a favorite dropped onto the quick-access zone
    ///
    /// Returns `None` when the id is not in the favorites view.
    pub async fn drop_into_quick_access(&mut self, id: ProjectId) -> Option<Ack> {
        let Some(project) = self.favorites.find(id).cloned() else {
            debug!(project_id = id, "dropped project is not a favorite");
            return None;
        };
        Some(self.add_quick_access(&project).await)
    }

    /// Forget a deleted project
    pub fn purge(&mut self, id: ProjectId) -> bool {
        let in_favorites = self.favorites.remove(id).is_some();
        let in_quick = self.quick_access.remove(id).is_some();
        in_favorites || in_quick
    }

    fn snapshot(&self) -> ViewSnapshot {
        (self.favorites.clone(), self.quick_access.clone())
    }

    fn settle(
        &mut self,
        operation: &str,
        id: ProjectId,
        result: AppResult<MessageResponse>,
        before: ViewSnapshot,
    ) -> Ack {
        match result {
            Ok(_) => Ack::Confirmed,
            Err(e) if e.is_swallowable() => {
                warn!(error = %e, project_id = id, "{} failed; keeping local state", operation);
                Ack::Failed(e)
            }
            Err(e) => {
                warn!(error = %e, project_id = id, "{} rejected; undoing local change", operation);
                (self.favorites, self.quick_access) = before;
                Ack::Rejected(e)
            }
        }
    }

    fn pin_locally(&mut self, project: &Project) {
        let mut pinned = project.clone();
        pinned.quick_access = true;
        pinned.stared = self.favorites.contains(project.id);
        if self.quick_access.push_unique(pinned) {
            debug!(project_id = project.id, "pinned project locally");
        }
        if let Some(favorite) = self.favorites.find_mut(project.id) {
            favorite.quick_access = true;
        }
    }
}
