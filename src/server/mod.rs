//! HTTP server module
//!
//! Exposes the ordering service (list, batch reorder, favorite and
//! quick-access toggles, statistics) plus supporting project CRUD.

mod auth;
mod config;
mod extract;
mod handlers;
mod server;

pub use auth::extract_bearer_token;
pub use config::{ConfigError, ServerConfig, DEFAULT_PORT};
pub use extract::{JsonBody, PathParam, QueryParams};
pub use handlers::AppState;
pub use server::{build_router, ProjectServer, ServerError, ServerHandle};

#[cfg(test)]
mod tests;
