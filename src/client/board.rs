//! Dashboard state: the ranked page plus both derived views
//!
//! The board owns one list controller and one projector over a shared API
//! handle and routes every drag-end event to exactly one of them.

use std::sync::Arc;

use tracing::{info, warn};

use super::api::ProjectsApi;
use super::dnd::{route_drop, DragEnd, DropRoute};
use super::list_controller::{
    ControllerOptions, DragError, DragState, DropOutcome, ListController, RankBatch,
    ReconcileOutcome, ReconcileTask,
};
use super::projector::{Ack, DerivedViewProjector};
use crate::error::{AppError, AppResult};
use crate::models::{Project, ProjectId};

/// What a drag-end event ended up doing
#[derive(Debug)]
pub enum BoardAction {
    Ignored,
    /// Reorder released on its own slot or outside the list
    Unchanged,
    /// The list was reordered locally and the rank write is in flight;
    /// hand the task's output to [`ProjectBoard::complete_reorder`]
    ReorderPending(ReconcileTask),
    QuickAccessAdded(Ack),
    /// The dragged id was not in the favorites view
    NotInFavorites,
}

pub struct ProjectBoard<A: ProjectsApi + ?Sized> {
    api: Arc<A>,
    list: ListController<A>,
    views: DerivedViewProjector<A>,
}

impl<A: ProjectsApi + ?Sized + 'static> ProjectBoard<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_options(api, ControllerOptions::default())
    }

    pub fn with_options(api: Arc<A>, options: ControllerOptions) -> Self {
        Self {
            list: ListController::with_options(Arc::clone(&api), options),
            views: DerivedViewProjector::new(Arc::clone(&api)),
            api,
        }
    }

    pub fn list(&self) -> &ListController<A> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListController<A> {
        &mut self.list
    }

    pub fn views(&self) -> &DerivedViewProjector<A> {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut DerivedViewProjector<A> {
        &mut self.views
    }

    /// Load a list page and refresh both views
    pub async fn load(&mut self, page: u32, search: Option<String>) -> AppResult<()> {
        self.list.load(page, search).await?;
        self.views.refresh().await
    }

    /// Route a finished drag to the list controller or the projector
    pub async fn handle_drag_end(&mut self, end: &DragEnd) -> Result<BoardAction, DragError> {
        match route_drop(end) {
            DropRoute::Reorder { from, to } => {
                if !matches!(self.list.drag_state(), DragState::Dragging { .. }) {
                    self.list.begin_drag(from)?;
                }
                match self.list.drop_at(Some(to))? {
                    DropOutcome::Reordered(batch) => {
                        Ok(BoardAction::ReorderPending(self.list.spawn_reconcile(batch)))
                    }
                    DropOutcome::Cancelled | DropOutcome::Unchanged => Ok(BoardAction::Unchanged),
                }
            }
            DropRoute::AddToQuickAccess { id } => {
                match self.views.drop_into_quick_access(id).await {
                    Some(ack) => {
                        self.list.patch(id, |p| p.quick_access = true);
                        Ok(BoardAction::QuickAccessAdded(ack))
                    }
                    None => Ok(BoardAction::NotInFavorites),
                }
            }
            DropRoute::Ignore => {
                self.list.cancel_drag();
                Ok(BoardAction::Ignored)
            }
        }
    }

    /// Apply the answer to a rank write started by `handle_drag_end`
    pub fn complete_reorder(
        &mut self,
        batch: RankBatch,
        result: AppResult<()>,
    ) -> ReconcileOutcome {
        self.list.complete(batch, result)
    }

    /// Toggle favorite for a project visible anywhere on the board
    ///
    /// Returns `None` when the id is not shown in any list.
    pub async fn toggle_favorite(&mut self, id: ProjectId) -> Option<Ack> {
        let project = self.lookup(id)?;
        let ack = self.views.toggle_favorite(&project).await;
        let now_favorite = self.views.is_favorite(id);
        self.list.patch(id, |p| p.stared = now_favorite);
        Some(ack)
    }

    pub async fn add_quick_access(&mut self, id: ProjectId) -> Option<Ack> {
        let project = self.lookup(id)?;
        let ack = self.views.add_quick_access(&project).await;
        self.list.patch(id, |p| p.quick_access = true);
        Some(ack)
    }

    pub async fn remove_quick_access(&mut self, id: ProjectId) -> Ack {
        let ack = self.views.remove_quick_access(id).await;
        self.list.patch(id, |p| p.quick_access = false);
        ack
    }

    /// Delete a project on the server and purge it from every local list
    ///
    /// A project the server no longer knows is purged as well.
    pub async fn delete_project(&mut self, id: ProjectId) -> AppResult<()> {
        match self.api.delete_project(id).await {
            Ok(_) => info!(project_id = id, "project deleted"),
            Err(AppError::NotFound(message)) => {
                warn!(project_id = id, %message, "project already gone; purging locally");
            }
            Err(e) => return Err(e),
        }
        self.list.purge(id);
        self.views.purge(id);
        Ok(())
    }

    fn lookup(&self, id: ProjectId) -> Option<Project> {
        self.list
            .find(id)
            .or_else(|| self.views.favorites().iter().find(|p| p.id == id))
            .or_else(|| self.views.quick_access().iter().find(|p| p.id == id))
            .cloned()
    }
}
