//! forge
//!
//! Abstraction for the remote ref store (GitHub).
//!
//! # Architecture
//!
//! The `Forge` trait defines the four remote calls the engine needs: a
//! paged ref listing, a prefix lookup, and ref create/update. The engine
//! only ever sees `&dyn Forge`, so tests drive it with [`mock::MockForge`].
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using REST and GraphQL APIs
//! - [`mock`]: Mock implementation for deterministic testing

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
