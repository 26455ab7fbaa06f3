//! engine::enumerate
//!
//! Lazy enumeration of the semver refs under a namespace.
//!
//! # Design
//!
//! [`RefEnumerator`] is an explicit two-state machine, `Fetching` with the
//! current cursor or `Done`. Each [`RefEnumerator::next_batch`] call fetches
//! exactly one page, so pages are requested strictly in sequence and a
//! caller that stops early never pays for pages it did not ask for.
//!
//! Ref names that do not parse as semantic versions are dropped with a
//! debug log; they never end the enumeration or surface as errors.
//! Output keeps the remote's order; callers needing a total order sort.
//!
//! # Example
//!
//! ```
//! use tagtrack::core::types::{Oid, RefNamespace};
//! use tagtrack::engine::enumerate::RefEnumerator;
//! use tagtrack::forge::mock::MockForge;
//!
//! # tokio_test::block_on(async {
//! let oid = Oid::new("a".repeat(40)).unwrap();
//! let forge = MockForge::new()
//!     .with_ref("refs/tags/v1.0.0", &oid)
//!     .with_ref("refs/tags/latest", &oid);
//!
//! let mut refs = RefEnumerator::new(&forge, RefNamespace::Tags);
//! while let Some(batch) = refs.next_batch().await.unwrap() {
//!     for (version, oid) in batch {
//!         println!("{} at {}", version, oid);
//!     }
//! }
//! assert!(refs.is_done());
//! # });
//! ```

use semver::Version;

use crate::core::config::MAX_PAGE_SIZE;
use crate::core::types::{Oid, RefNamespace};
use crate::core::version;
use crate::forge::{Forge, ForgeError, RefPageRequest};

/// Pagination state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerState {
    /// More pages may exist; `cursor` is `None` before the first page.
    Fetching { cursor: Option<String> },
    /// No more pages will be requested.
    Done,
}

/// Pull-based enumerator over `(version, commit)` pairs.
pub struct RefEnumerator<'a> {
    forge: &'a dyn Forge,
    namespace: RefNamespace,
    page_size: u32,
    state: PagerState,
    pages_fetched: usize,
}

impl<'a> RefEnumerator<'a> {
    /// Start a fresh enumeration of `namespace`.
    pub fn new(forge: &'a dyn Forge, namespace: RefNamespace) -> Self {
        Self {
            forge,
            namespace,
            page_size: MAX_PAGE_SIZE,
            state: PagerState::Fetching { cursor: None },
            pages_fetched: 0,
        }
    }

    /// Request `page_size` refs per page (clamped to 1..=100).
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn is_done(&self) -> bool {
        self.state == PagerState::Done
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page and return its semver refs.
    ///
    /// Returns `Ok(None)` once the enumeration is done. A batch may be
    /// empty when every ref on the page was filtered out. A remote error
    /// ends the enumeration.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<(Version, Oid)>>, ForgeError> {
        let cursor = match &self.state {
            PagerState::Done => return Ok(None),
            PagerState::Fetching { cursor } => cursor.clone(),
        };

        let request = RefPageRequest {
            namespace: self.namespace,
            cursor,
            page_size: self.page_size,
        };
        self.pages_fetched += 1;
        let page = match self.forge.list_refs_page(request).await {
            Ok(page) => page,
            Err(e) => {
                self.state = PagerState::Done;
                return Err(e);
            }
        };

        let mut batch = Vec::with_capacity(page.refs.len());
        for remote in page.refs {
            match version::parse(&remote.name) {
                Some(v) => batch.push((v, remote.oid)),
                None => tracing::debug!(
                    name = %remote.name,
                    namespace = %self.namespace,
                    "skipping ref that is not a semantic version"
                ),
            }
        }

        self.state = match (page.has_next_page, page.end_cursor) {
            (true, Some(cursor)) => PagerState::Fetching {
                cursor: Some(cursor),
            },
            (true, None) => {
                // A next page without a cursor would loop on page one.
                tracing::warn!("remote reported more pages without a cursor; stopping");
                PagerState::Done
            }
            (false, _) => PagerState::Done,
        };

        Ok(Some(batch))
    }

    /// Drain the remaining pages into one list, in remote order.
    pub async fn collect_all(mut self) -> Result<Vec<(Version, Oid)>, ForgeError> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_batch().await? {
            all.extend(batch);
        }
        Ok(all)
    }
}

impl std::fmt::Debug for RefEnumerator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefEnumerator")
            .field("forge", &self.forge.name())
            .field("namespace", &self.namespace)
            .field("page_size", &self.page_size)
            .field("state", &self.state)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
