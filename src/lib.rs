//! tagtrack - keep floating version tags in step with releases
//!
//! tagtrack runs as a CI step. It classifies the GitHub event that
//! triggered the run, works out the semantic version it announces, and
//! moves floating tags (`v1`, and optionally `latest`) on the remote to
//! the released commit when that version is the newest of its line.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Gate → Resolve → Enumerate → Plan → Upsert lifecycle
//! - [`core`] - Domain types, version resolution, event classification, config
//! - [`forge`] - Abstraction for the remote ref store (GitHub)
//! - [`ui`] - User-facing output and step outputs
//!
//! # Correctness Invariants
//!
//! 1. Only refs whose names parse as semantic versions are ever compared
//! 2. A floating tag always converges to the requested commit, or the run fails
//! 3. Nothing is persisted between runs; the remote is the source of truth

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod ui;
