//! # robinctl
//!
//! Command-line client for the frontend registry of a Robin load-balancer.
//! Frontends are routing rules (domain/path/port selectors pointing at a
//! backend service) stored by the Robin API.
//!
//! ## Architecture
//!
//! ```text
//! CLI (clap) ──► Registration Session ──► Registry Client (reqwest) ──► Robin API
//!     │                                         ▲
//!     └────────► Field Projection ──────────────┘
//! ```
//!
//! ## Core Components
//!
//! - **Registry Client** ([`registry`]): `add`/`get`/`all`/`remove`, one attempt each
//! - **Registration Session** ([`session`]): add, wait for SIGINT/SIGTERM, remove exactly once
//! - **Field Projection** ([`projection`]): operator-selected columns, one row per selector
//! - **CLI** ([`cli`]): `add`, `get`, `ls`, `rm` and `config` verbs

pub mod cli;
pub mod domain;
pub mod errors;
pub mod projection;
pub mod registry;
pub mod session;

// Re-export commonly used types and traits
pub use domain::{FrontendMode, FrontendRecord, FrontendSelectorRecord};
pub use errors::{Error, Result};
pub use registry::FrontendRegistry;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
