//! Bosun Core Business Logic
//!
//! This crate provides the transactional configuration layer of bosun:
//! dump-record parsing, scope resolution, the transaction-scoped
//! configuration cache and the CRUD orchestration over the engine.

pub mod cache;
pub mod client;
pub mod error;
pub mod parse;
pub mod scope;

pub use cache::{ConfigCache, EntityCache, ItemKey};
pub use client::{ConfigClient, Versioned, WriteToken};
pub use error::ClientError;
pub use scope::{ParentType, RuleType, Scope};
