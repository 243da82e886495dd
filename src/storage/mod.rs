//! Local storage module
//!
//! SQLite persistence for projects: the rank store (`position` column) and
//! the flag store (`stared` / `quick_access` columns) share one table so a
//! delete removes a project from every view in a single statement.

mod database;
mod error;
mod migrations;
mod repository;

pub use database::Database;
pub use error::StorageError;
pub use repository::RankBatchReport;
