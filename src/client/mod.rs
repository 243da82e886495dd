//! Client-side ordering state
//!
//! This module provides:
//! - `api`: the `ProjectsApi` seam and its reqwest implementation
//! - `collection`: id-keyed ordered collections
//! - `list_controller`: optimistic reordering of one ranked page
//! - `projector`: the favorites and quick-access views
//! - `dnd`: routing of drag-end events between zones
//! - `board`: all of the above wired together

pub mod api;
pub mod board;
pub mod collection;
pub mod dnd;
pub mod list_controller;
pub mod projector;

#[cfg(test)]
pub(crate) mod testing;


pub use api::{HttpProjectsApi, ProjectsApi};
pub use board::{BoardAction, ProjectBoard};
pub use collection::{Keyed, OrderedCollection};
pub use dnd::{route_drop, DragEnd, DropLocation, DropRoute, ListZone};
pub use list_controller::{
    ControllerOptions, DragError, DragState, DropOutcome, FetchState, ListController, RankBatch,
    RankScope, ReconcileOutcome, ReconcilePolicy, ReconcileTask,
};
pub use projector::{Ack, DashboardCounters, DerivedViewProjector};
