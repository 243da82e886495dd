//! Optimistic list controller
//!
//! Mirrors one page of the ranked project list. A drop is applied to the
//! local sequence immediately and turned into a [`RankBatch`]; the batch is
//! then reconciled against the server, possibly after newer state has
//! arrived, so every batch carries the generation it was produced under.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::api::ProjectsApi;
use super::collection::OrderedCollection;
use crate::error::{AppError, AppResult};
use crate::models::{global_rank, PageRequest, Project, ProjectId, RankUpdate, DEFAULT_PAGE_SIZE};

/// Progress of the page fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// Drag lifecycle: `Idle -> Dragging -> Reconciling -> Idle`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: usize,
        snapshot: Vec<Project>,
    },
    Reconciling {
        generation: u64,
    },
}

/// What to do with the local order when a rank batch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Keep the optimistic order; the next refetch corrects any drift
    #[default]
    KeepOptimistic,
    /// Restore the order captured when the drag began
    Rollback,
}

/// Which positions get fresh ranks after a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankScope {
    /// Every item on the visible page
    #[default]
    Page,
    /// Only the contiguous range between source and destination
    Moved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub policy: ReconcilePolicy,
    pub scope: RankScope,
    /// Allow a new drag to start while the previous batch is in flight.
    /// The older batch is then treated as superseded.
    pub allow_overlapping_drags: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            policy: ReconcilePolicy::default(),
            scope: RankScope::default(),
            allow_overlapping_drags: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragError {
    #[error("a reorder is still being reconciled")]
    Busy,

    #[error("no drag in progress")]
    NotDragging,

    #[error("index {index} is out of range for a list of {len}")]
    OutOfRange { index: usize, len: usize },
}

/// A pending rank write plus the order it replaced
#[derive(Debug, Clone, PartialEq)]
pub struct RankBatch {
    generation: u64,
    updates: Vec<RankUpdate>,
    snapshot: Vec<Project>,
}

impl RankBatch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn updates(&self) -> &[RankUpdate] {
        &self.updates
    }

    /// Local order before the move
    pub fn snapshot(&self) -> &[Project] {
        &self.snapshot
    }
}

/// Result of releasing a drag
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Released outside the list
    Cancelled,
    /// Released on its own slot
    Unchanged,
    Reordered(RankBatch),
}

/// Result of applying a batch completion
#[derive(Debug)]
pub enum ReconcileOutcome {
    Confirmed,
    KeptOptimistic(AppError),
    RolledBack(AppError),
    /// The server refused the batch as invalid; the previous order is back
    Rejected(AppError),
    /// A newer load or drag superseded this batch
    Stale,
}

/// Background rank write started by [`ListController::spawn_reconcile`]
pub type ReconcileTask = JoinHandle<(RankBatch, AppResult<()>)>;

pub struct ListController<A: ProjectsApi + ?Sized> {
    api: Arc<A>,
    items: OrderedCollection<Project>,
    options: ControllerOptions,
    page: u32,
    per_page: u32,
    last_page: u32,
    total: u64,
    search: Option<String>,
    fetch_state: FetchState,
    drag_state: DragState,
    generation: u64,
}

impl<A: ProjectsApi + ?Sized> ListController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_options(api, ControllerOptions::default())
    }

    pub fn with_options(api: Arc<A>, options: ControllerOptions) -> Self {
        Self {
            api,
            items: OrderedCollection::new(),
            per_page: options.page_size.max(1),
            options,
            page: 1,
            last_page: 1,
            total: 0,
            search: None,
            fetch_state: FetchState::Idle,
            drag_state: DragState::Idle,
            generation: 0,
        }
    }

    pub fn items(&self) -> &[Project] {
        self.items.items()
    }

    pub fn collection(&self) -> &OrderedCollection<Project> {
        &self.items
    }

    pub fn find(&self, id: ProjectId) -> Option<&Project> {
        self.items.find(id)
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag_state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True until a page has loaded successfully
    pub fn needs_fetch(&self) -> bool {
        matches!(self.fetch_state, FetchState::Idle | FetchState::Error(_))
    }

    pub fn is_reconciling(&self) -> bool {
        matches!(self.drag_state, DragState::Reconciling { .. })
    }

    /// Fetch a page and reset the controller around it
    pub async fn load(&mut self, page: u32, search: Option<String>) -> AppResult<()> {
        let request = PageRequest::new(page, self.options.page_size, search);
        self.fetch_state = FetchState::Loading;
        // anything still in flight now refers to a page we no longer show
        self.generation += 1;
        self.drag_state = DragState::Idle;

        match self.api.list_projects(&request).await {
            Ok(page) => {
                debug!(
                    page = page.current_page,
                    count = page.data.len(),
                    total = page.total,
                    "loaded project page"
                );
                self.items.replace_all(page.data);
                self.page = page.current_page.max(1);
                self.per_page = page.per_page.max(1);
                self.last_page = page.last_page.max(1);
                self.total = page.total;
                self.search = request.search;
                self.fetch_state = FetchState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, page = request.page, "failed to load project page");
                self.fetch_state = FetchState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Reload the current page with the current search
    pub async fn refresh(&mut self) -> AppResult<()> {
        let search = self.search.clone();
        self.load(self.page, search).await
    }

    /// Start dragging the item at `source`
    pub fn begin_drag(&mut self, source: usize) -> Result<(), DragError> {
        if self.is_reconciling() {
            if !self.options.allow_overlapping_drags {
                return Err(DragError::Busy);
            }
            self.generation += 1;
        }
        if source >= self.items.len() {
            return Err(DragError::OutOfRange {
                index: source,
                len: self.items.len(),
            });
        }

        self.drag_state = DragState::Dragging {
            source,
            snapshot: self.items.snapshot(),
        };
        Ok(())
    }

    /// Abandon the current drag without touching the list
    pub fn cancel_drag(&mut self) {
        if matches!(self.drag_state, DragState::Dragging { .. }) {
            self.drag_state = DragState::Idle;
        }
    }

    /// Release the dragged item at `destination`
    pub fn drop_at(&mut self, destination: Option<usize>) -> Result<DropOutcome, DragError> {
        let (source, snapshot) = match std::mem::take(&mut self.drag_state) {
            DragState::Dragging { source, snapshot } => (source, snapshot),
            other => {
                self.drag_state = other;
                return Err(DragError::NotDragging);
            }
        };

        let Some(destination) = destination else {
            debug!(source, "drag released outside the list");
            return Ok(DropOutcome::Cancelled);
        };
        if destination >= self.items.len() {
            return Err(DragError::OutOfRange {
                index: destination,
                len: self.items.len(),
            });
        }

        let Some(moved) = self.items.move_item(source, destination) else {
            return Ok(DropOutcome::Unchanged);
        };

        let range = match self.options.scope {
            RankScope::Page => 0..=self.items.len() - 1,
            RankScope::Moved => moved,
        };

        let (page, per_page) = (self.page, self.per_page);
        let updates: Vec<RankUpdate> = range
            .filter_map(|index| {
                let item = self.items.get_mut(index)?;
                item.rank = global_rank(index, page, per_page);
                Some(RankUpdate::new(item.id, item.rank))
            })
            .collect();

        self.generation += 1;
        self.drag_state = DragState::Reconciling {
            generation: self.generation,
        };
        info!(
            generation = self.generation,
            from = source,
            to = destination,
            updates = updates.len(),
            "reordered project list locally"
        );

        Ok(DropOutcome::Reordered(RankBatch {
            generation: self.generation,
            updates,
            snapshot,
        }))
    }

    /// Send the batch and apply its completion
    pub async fn reconcile(&mut self, batch: RankBatch) -> ReconcileOutcome {
        let result = self.api.set_ranks(&batch.updates).await.map(|_| ());
        self.complete(batch, result)
    }

    /// Send the batch on a background task
    ///
    /// The caller feeds the task's output back through [`Self::complete`].
    pub fn spawn_reconcile(&self, batch: RankBatch) -> ReconcileTask
    where
        A: 'static,
    {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = api.set_ranks(&batch.updates).await.map(|_| ());
            (batch, result)
        })
    }

    /// Apply a server answer for `batch`
    pub fn complete(&mut self, batch: RankBatch, result: AppResult<()>) -> ReconcileOutcome {
        if batch.generation != self.generation {
            debug!(
                generation = batch.generation,
                current = self.generation,
                "ignoring superseded rank batch"
            );
            if let Err(e) = &result {
                warn!(error = %e, generation = batch.generation, "superseded rank batch failed");
            }
            return ReconcileOutcome::Stale;
        }

        if matches!(self.drag_state, DragState::Reconciling { generation } if generation == batch.generation)
        {
            self.drag_state = DragState::Idle;
        }

        let error = match result {
            Ok(()) => return ReconcileOutcome::Confirmed,
            Err(e) => e,
        };

        if !error.is_swallowable() {
            warn!(
                error = %error,
                generation = batch.generation,
                "rank batch rejected; restoring previous order"
            );
            self.restore(batch.snapshot);
            return ReconcileOutcome::Rejected(error);
        }

        match self.options.policy {
            ReconcilePolicy::KeepOptimistic => {
                warn!(
                    error = %error,
                    generation = batch.generation,
                    "rank batch failed; keeping local order until next refetch"
                );
                ReconcileOutcome::KeptOptimistic(error)
            }
            ReconcilePolicy::Rollback => {
                warn!(
                    error = %error,
                    generation = batch.generation,
                    "rank batch failed; restoring previous order"
                );
                self.restore(batch.snapshot);
                ReconcileOutcome::RolledBack(error)
            }
        }
    }

    fn restore(&mut self, snapshot: Vec<Project>) {
        // projects purged since the drag began stay purged
        let restored: Vec<Project> = snapshot
            .into_iter()
            .filter(|project| self.items.contains(project.id))
            .collect();
        self.items.replace_all(restored);
    }

    /// Patch a project in place; returns false when it is not on this page
    pub fn patch<F>(&mut self, id: ProjectId, apply: F) -> bool
    where
        F: FnOnce(&mut Project),
    {
        match self.items.find_mut(id) {
            Some(project) => {
                apply(project);
                true
            }
            None => false,
        }
    }

    /// Drop a deleted project from the local page
    pub fn purge(&mut self, id: ProjectId) -> bool {
        if self.items.remove(id).is_none() {
            return false;
        }
        self.total = self.total.saturating_sub(1);
        // indices captured by an in-progress drag are no longer valid
        self.cancel_drag();
        true
    }
}
