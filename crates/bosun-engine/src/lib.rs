//! Bosun Engine Invocation Layer
//!
//! This crate provides the seam between bosun and the external control
//! binary that owns the authoritative load-balancer configuration, plus a
//! subprocess-backed implementation of that seam.

pub mod engine;
pub mod error;
pub mod exec;

pub use engine::ConfigEngine;
pub use error::EngineError;
pub use exec::{ExecEngine, ExecEngineConfig};
