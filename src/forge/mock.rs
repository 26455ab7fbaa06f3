//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps refs in memory, in insertion order, and serves
//! them in pages the way GitHub does. Tests can instead script the exact
//! pages returned, and can make any operation fail. Every call is recorded
//! so tests can assert on what was asked of the remote.
//!
//! # Example
//!
//! ```
//! use tagtrack::core::types::{Oid, RefName};
//! use tagtrack::forge::mock::MockForge;
//! use tagtrack::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let oid = Oid::new("a".repeat(40)).unwrap();
//! let forge = MockForge::new().with_ref("refs/tags/v1.0.0", &oid);
//!
//! let found = forge.matching_refs("tags/v1").await.unwrap();
//! assert_eq!(found.len(), 1);
//!
//! let name = RefName::from_relative("tags/v1").unwrap();
//! forge.create_ref(&name, &oid).await.unwrap();
//! assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{Forge, ForgeError, RefPage, RefPageRequest, RemoteRef};
use crate::core::types::{Oid, RefName, RefNamespace, RefRecord};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Stored refs, in the order they were added.
    refs: Vec<RefRecord>,
    /// Pages to serve instead of paging `refs`.
    scripted_pages: Option<VecDeque<RefPage>>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_refs_page with the given error.
    ListRefsPage(ForgeError),
    /// Fail matching_refs with the given error.
    MatchingRefs(ForgeError),
    /// Fail update_ref with the given error.
    UpdateRef(ForgeError),
    /// Fail create_ref with the given error.
    CreateRef(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListRefsPage {
        namespace: RefNamespace,
        cursor: Option<String>,
    },
    MatchingRefs {
        prefix: String,
    },
    UpdateRef {
        name: String,
        oid: String,
        force: bool,
    },
    CreateRef {
        name: String,
        oid: String,
    },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Add a ref. Panics if `name` is not a valid full ref name.
    pub fn with_ref(self, name: &str, oid: &Oid) -> Self {
        {
            let record = RefRecord {
                name: RefName::new(name).expect("mock ref name must be valid"),
                oid: oid.clone(),
            };
            let mut inner = self.inner.lock().unwrap();
            inner.refs.push(record);
        }
        self
    }

    /// Serve these pages, in order, from `list_refs_page`.
    ///
    /// Requests past the last page get an empty final page.
    pub fn with_ref_pages(self, pages: Vec<RefPage>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.scripted_pages = Some(pages.into());
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use tagtrack::forge::mock::{MockForge, FailOn};
    /// use tagtrack::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreateRef(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Count recorded operations matching a predicate.
    pub fn count(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|op| pred(op)).count()
    }

    /// Current target of a ref (for test verification).
    pub fn ref_oid(&self, name: &str) -> Option<Oid> {
        let inner = self.inner.lock().unwrap();
        inner
            .refs
            .iter()
            .find(|r| r.name.as_str() == name)
            .map(|r| r.oid.clone())
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail<T>(&self, expected: &str) -> Option<Result<T, ForgeError>> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::ListRefsPage(e)) if expected == "list_refs_page" => Some(Err(e.clone())),
            Some(FailOn::MatchingRefs(e)) if expected == "matching_refs" => Some(Err(e.clone())),
            Some(FailOn::UpdateRef(e)) if expected == "update_ref" => Some(Err(e.clone())),
            Some(FailOn::CreateRef(e)) if expected == "create_ref" => Some(Err(e.clone())),
            _ => None,
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursors are the offset of the next ref, wrapped to look opaque.
fn encode_cursor(offset: usize) -> String {
    format!("mock-cursor:{}", offset)
}

fn decode_cursor(cursor: &str) -> Result<usize, ForgeError> {
    cursor
        .strip_prefix("mock-cursor:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| ForgeError::ApiError {
            status: 200,
            message: format!("invalid cursor '{}'", cursor),
        })
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_refs_page(&self, request: RefPageRequest) -> Result<RefPage, ForgeError> {
        self.record(MockOperation::ListRefsPage {
            namespace: request.namespace,
            cursor: request.cursor.clone(),
        });

        if let Some(result) = self.check_fail("list_refs_page") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(pages) = inner.scripted_pages.as_mut() {
            return Ok(pages.pop_front().unwrap_or_default());
        }

        let offset = match request.cursor.as_deref() {
            Some(cursor) => decode_cursor(cursor)?,
            None => 0,
        };
        let prefix = request.namespace.prefix();
        let matching: Vec<&RefRecord> = inner
            .refs
            .iter()
            .filter(|r| r.name.as_str().starts_with(prefix))
            .collect();

        let end = (offset + request.page_size.max(1) as usize).min(matching.len());
        let refs = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|r| RemoteRef {
                name: r.name.as_str()[prefix.len()..].to_string(),
                oid: r.oid.clone(),
            })
            .collect();
        let has_next_page = end < matching.len();

        Ok(RefPage {
            refs,
            end_cursor: Some(encode_cursor(end)),
            has_next_page,
        })
    }

    async fn matching_refs(&self, prefix: &str) -> Result<Vec<RefRecord>, ForgeError> {
        self.record(MockOperation::MatchingRefs {
            prefix: prefix.to_string(),
        });

        if let Some(result) = self.check_fail("matching_refs") {
            return result;
        }

        let full_prefix = format!("refs/{}", prefix);
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .refs
            .iter()
            .filter(|r| r.name.as_str().starts_with(&full_prefix))
            .cloned()
            .collect())
    }

    async fn update_ref(
        &self,
        name: &RefName,
        oid: &Oid,
        force: bool,
    ) -> Result<RefRecord, ForgeError> {
        self.record(MockOperation::UpdateRef {
            name: name.to_string(),
            oid: oid.to_string(),
            force,
        });

        if let Some(result) = self.check_fail("update_ref") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .refs
            .iter_mut()
            .find(|r| &r.name == name)
            .ok_or_else(|| ForgeError::NotFound(name.to_string()))?;
        record.oid = oid.clone();
        Ok(record.clone())
    }

    async fn create_ref(&self, name: &RefName, oid: &Oid) -> Result<RefRecord, ForgeError> {
        self.record(MockOperation::CreateRef {
            name: name.to_string(),
            oid: oid.to_string(),
        });

        if let Some(result) = self.check_fail("create_ref") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.refs.iter().any(|r| &r.name == name) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Reference already exists".into(),
            });
        }
        let record = RefRecord {
            name: name.clone(),
            oid: oid.clone(),
        };
        inner.refs.push(record.clone());
        Ok(record)
    }
}
