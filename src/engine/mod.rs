//! engine
//!
//! Everything that talks to the remote ref store.
//!
//! # Architecture
//!
//! ```text
//! Gate -> Resolve -> Enumerate -> Plan -> Upsert -> Report
//! ```
//!
//! - [`enumerate`]: paged, lazy listing of the semver refs in a namespace
//! - [`upsert`]: create-or-update of one named ref
//! - [`plan`]: pure decisions over the event and the enumerated versions
//! - [`runner`]: wires the above together for one triggering event
//!
//! The engine only ever holds a `&dyn Forge`, so every path can be driven
//! by [`crate::forge::mock::MockForge`].

pub mod enumerate;
pub mod plan;
pub mod runner;
pub mod upsert;

pub use enumerate::{PagerState, RefEnumerator};
pub use plan::{EventVersion, MovementReason, RefMovement};
pub use runner::{run, RunError, RunOutcome};
pub use upsert::{upsert_ref, UpsertError, UpsertOutcome};

use std::path::PathBuf;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Explicit config file.
    pub config: Option<PathBuf>,
    /// Debug output enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Directory config lookups are relative to.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}
