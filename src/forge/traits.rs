//! forge::traits
//!
//! Forge trait definition for reading and moving refs on a remote host.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result`; every error is fatal to the run; retries,
//! if any, belong to the implementation's transport.
//!
//! # Example
//!
//! ```ignore
//! use tagtrack::core::types::{Oid, RefName};
//! use tagtrack::forge::{Forge, ForgeError};
//!
//! async fn move_tag(forge: &dyn Forge, oid: &Oid) -> Result<(), ForgeError> {
//!     let name = RefName::from_relative("tags/v1").unwrap();
//!     let record = forge.update_ref(&name, oid, true).await?;
//!     println!("{}", record);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Oid, RefName, RefNamespace, RefRecord};

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Request for one page of refs under a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPageRequest {
    /// Namespace to list (`refs/tags/` or `refs/heads/`)
    pub namespace: RefNamespace,
    /// Continuation cursor from the previous page; `None` for the first page
    pub cursor: Option<String>,
    /// Maximum refs to return
    pub page_size: u32,
}

/// A ref as listed in a page: its name relative to the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Name with the namespace prefix removed (`v1.2.3`)
    pub name: String,
    /// Commit the ref points to
    pub oid: Oid,
}

/// One page of refs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefPage {
    pub refs: Vec<RemoteRef>,
    /// Cursor to pass for the next page
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// The Forge trait for interacting with the remote ref store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Fetch one page of refs under a namespace, in the remote's order.
    async fn list_refs_page(&self, request: RefPageRequest) -> Result<RefPage, ForgeError>;

    /// List refs whose namespace-relative name starts with `prefix`.
    ///
    /// `tags/v1` matches `refs/tags/v1`, `refs/tags/v1.0.0` and
    /// `refs/tags/v10`; callers filter for the exact name they want.
    async fn matching_refs(&self, prefix: &str) -> Result<Vec<RefRecord>, ForgeError>;

    /// Point an existing ref at `oid`.
    ///
    /// With `force`, the move need not be a fast-forward.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ref does not exist
    /// - `ApiError` with status 422 if the update is rejected
    async fn update_ref(
        &self,
        name: &RefName,
        oid: &Oid,
        force: bool,
    ) -> Result<RefRecord, ForgeError>;

    /// Create a new ref pointing at `oid`.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the ref already exists
    async fn create_ref(&self, name: &RefName, oid: &Oid) -> Result<RefRecord, ForgeError>;
}
