//! Project tracker data models
//!
//! This module defines the project record and the request / response
//! payloads shared by the server and the client.

pub mod project;

pub use project::*;
