//! The central domain logic and interface definitions for the shared
//! event-planning core: entities, the error taxonomy, port traits, and
//! field validation.

pub mod error;
pub mod models;
pub mod ports;
pub mod validate;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
