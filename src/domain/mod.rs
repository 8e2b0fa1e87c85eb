//! Domain types shared by the registry client, the projection engine and the CLI.

pub mod frontend;

pub use frontend::{FrontendMode, FrontendRecord, FrontendSelectorRecord, DEFAULT_MODE, MAX_WEIGHT};
