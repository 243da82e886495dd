// Project Deck
// Ranked project list with favorites and quick access: SQLite-backed HTTP
// server plus the optimistic client state that drives the dashboard.

pub mod client;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod storage;

pub use error::{AppError, AppResult};
pub use models::{Project, ProjectId, ProjectStatus, RankUpdate};
