//! Storage module error types
//!
//! Provides error types for database operations.

use thiserror::Error;

use crate::models::{FieldErrors, ProjectId};

/// Storage operation error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error while preparing the database location
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Project not found
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Lock error when accessing database
    #[error("database lock poisoned")]
    LockError,

    /// Payload failed field validation
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Invalid input parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
