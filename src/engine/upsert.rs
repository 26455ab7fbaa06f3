//! engine::upsert
//!
//! Create-or-update for a single named ref.
//!
//! # Invariants
//!
//! - The existence check completes before any mutation
//! - An existing ref is updated with `force = true`; floating tags move
//!   non-linearly
//! - The outcome depends only on whether the exact ref exists, never on
//!   where it currently points
//! - Any remote error aborts; there is no partial success

use std::fmt;

use thiserror::Error;

use crate::core::types::{Oid, RefName, RefRecord, TypeError};
use crate::forge::{Forge, ForgeError};
use crate::ui::output::{Reporter, Verbosity};

/// Errors from an upsert.
#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("invalid ref name: {0}")]
    InvalidRefName(#[from] TypeError),

    #[error(transparent)]
    Forge(#[from] ForgeError),
}

/// What the upsert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(RefRecord),
    Updated(RefRecord),
}

impl UpsertOutcome {
    /// The ref as the remote reported it after the mutation.
    pub fn record(&self) -> &RefRecord {
        match self {
            UpsertOutcome::Created(r) | UpsertOutcome::Updated(r) => r,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        let action = if self.was_created() {
            "Created"
        } else {
            "Updated"
        };
        write!(f, "{} {} at {}", action, record.name, record.oid)
    }
}

/// Point `ref_name` (namespace-relative, e.g. `tags/v1`) at `oid`.
///
/// Creates the ref when no ref with exactly that name exists, otherwise
/// force-updates it.
pub async fn upsert_ref(
    forge: &dyn Forge,
    ref_name: &str,
    oid: &Oid,
    reporter: &Reporter,
) -> Result<UpsertOutcome, UpsertError> {
    let name = RefName::from_relative(ref_name)?;

    // The lookup is a prefix match: `tags/v1` also finds `tags/v1.2.0`.
    let candidates = forge.matching_refs(name.relative()).await?;
    let exists = candidates.iter().any(|r| r.name == name);
    tracing::debug!(
        ref_name = %name,
        candidates = candidates.len(),
        exists,
        "looked up ref"
    );

    let outcome = if exists {
        UpsertOutcome::Updated(forge.update_ref(&name, oid, true).await?)
    } else {
        UpsertOutcome::Created(forge.create_ref(&name, oid).await?)
    };

    reporter.notice(&outcome);
    if reporter.verbosity() == Verbosity::Debug {
        reporter.debug(format!("{:?}", outcome.record()));
    }

    Ok(outcome)
}
