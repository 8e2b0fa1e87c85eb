//! # Registry Client
//!
//! Request/response access to the Robin frontend registry. Every call is a
//! single attempt: nothing is retried and nothing is cached.

pub mod http;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::FrontendRecord;

pub use http::{ClientConfig, RobinClient};
#[cfg(test)]
pub use memory::MemoryRegistry;

/// Errors returned by a registry call
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// The registry answered with a non-success status
    #[error("registry responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The registry answered but the body was not a frontend record
    #[error("failed to decode registry response: {0}")]
    Decode(String),

    /// No frontend with the given id exists
    #[error("frontend not found")]
    NotFound,
}

/// Operations the Robin registry exposes for frontends
#[async_trait]
pub trait FrontendRegistry: Send + Sync {
    /// Create or replace the frontend stored under `id`
    async fn add(&self, id: &str, record: &FrontendRecord) -> Result<(), RegistryError>;

    /// Fetch a single frontend
    async fn get(&self, id: &str) -> Result<FrontendRecord, RegistryError>;

    /// Fetch every frontend keyed by id. Iteration order carries no meaning.
    async fn all(&self) -> Result<HashMap<String, FrontendRecord>, RegistryError>;

    /// Delete the frontend stored under `id`
    async fn remove(&self, id: &str) -> Result<(), RegistryError>;
}
