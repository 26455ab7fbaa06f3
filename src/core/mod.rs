//! core
//!
//! Domain types and pure logic, with no network access.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName, RefNamespace, Repository
//! - [`version`] - Semantic version parsing and coercion
//! - [`event`] - The triggering event and its classifier predicates
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Unparseable versions are values (`None`), not errors
//! - Everything here is deterministic and testable without a remote

pub mod config;
pub mod event;
pub mod types;
pub mod version;
