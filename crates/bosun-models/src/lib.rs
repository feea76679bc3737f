//! Bosun Configuration Entity Models
//!
//! This crate defines the load-balancer configuration entities managed by
//! bosun, the record protocol they share with the engine dump format, and
//! the schema validation applied to write payloads.

pub mod error;
pub mod models;
pub mod record;

pub use error::ValidationError;
pub use models::*;
pub use record::EngineObject;
