//! Drag-and-drop routing between the three list zones
//!
//! A single drag-end event is routed to exactly one handler, so the reorder
//! controller and the quick-access projector never both react to it.

use crate::models::ProjectId;

/// A droppable list on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListZone {
    /// The paginated, ranked project list
    AllProjects,
    /// The favorites view
    Favorites,
    /// The quick-access view
    QuickAccess,
}

impl ListZone {
    /// Identifier used by the UI's droppable containers
    pub fn droppable_id(&self) -> &'static str {
        match self {
            ListZone::AllProjects => "all-projects",
            ListZone::Favorites => "favorite-projects",
            ListZone::QuickAccess => "quick-access",
        }
    }

    pub fn from_droppable_id(id: &str) -> Option<Self> {
        match id {
            "all-projects" => Some(ListZone::AllProjects),
            "favorite-projects" => Some(ListZone::Favorites),
            "quick-access" => Some(ListZone::QuickAccess),
            _ => None,
        }
    }
}

/// Where an item sits inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub zone: ListZone,
    pub index: usize,
}

impl DropLocation {
    pub fn new(zone: ListZone, index: usize) -> Self {
        Self { zone, index }
    }
}

/// A finished drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub dragged_id: ProjectId,
    pub source: DropLocation,
    /// `None` when the item was released outside any zone
    pub destination: Option<DropLocation>,
}

/// What a drag-end event should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRoute {
    /// Reorder inside the ranked list
    Reorder { from: usize, to: usize },
    /// Add the dragged favorite to quick access
    AddToQuickAccess { id: ProjectId },
    /// Nothing to do
    Ignore,
}

/// Decide which handler owns a drag-end event
pub fn route_drop(end: &DragEnd) -> DropRoute {
    let Some(destination) = end.destination else {
        return DropRoute::Ignore;
    };

    match (end.source.zone, destination.zone) {
        (ListZone::AllProjects, ListZone::AllProjects) => {
            if end.source.index == destination.index {
                DropRoute::Ignore
            } else {
                DropRoute::Reorder {
                    from: end.source.index,
                    to: destination.index,
                }
            }
        }
        (ListZone::Favorites, ListZone::QuickAccess) => DropRoute::AddToQuickAccess {
            id: end.dragged_id,
        },
        _ => DropRoute::Ignore,
    }
}
