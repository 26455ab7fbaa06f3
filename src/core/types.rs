//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Validated, fully-qualified Git reference name
//! - [`RefNamespace`] - The `heads/` or `tags/` namespace a ref lives in
//! - [`RefRecord`] - A ref name paired with the commit it points to
//! - [`Repository`] - Owner/name pair identifying a remote repository
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use tagtrack::core::types::{Oid, RefName};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = RefName::from_relative("tags/v1").unwrap();
//! assert_eq!(refname.as_str(), "refs/tags/v1");
//!
//! // Invalid constructions fail at creation time
//! assert!(RefName::from_relative("tags/bad..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid repository: {0}")]
    InvalidRepository(String),
}

/// A Git object identifier (SHA-1 or SHA-256 hex string).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use tagtrack::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().trim().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ref namespaces a version can be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefNamespace {
    /// Branches (`refs/heads/`)
    Heads,
    /// Tags (`refs/tags/`)
    #[default]
    Tags,
}

impl RefNamespace {
    /// Fully-qualified prefix, e.g. `refs/tags/`.
    pub fn prefix(self) -> &'static str {
        match self {
            RefNamespace::Heads => "refs/heads/",
            RefNamespace::Tags => "refs/tags/",
        }
    }

    /// Namespace-relative prefix, e.g. `tags/`.
    pub fn relative_prefix(self) -> &'static str {
        match self {
            RefNamespace::Heads => "heads/",
            RefNamespace::Tags => "tags/",
        }
    }

    /// Pick the namespace a run watches for releases.
    pub fn preferred(prefer_branches: bool) -> Self {
        if prefer_branches {
            RefNamespace::Heads
        } else {
            RefNamespace::Tags
        }
    }
}

impl std::fmt::Display for RefNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefNamespace::Heads => write!(f, "heads"),
            RefNamespace::Tags => write!(f, "tags"),
        }
    }
}

impl std::str::FromStr for RefNamespace {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('/') {
            "heads" | "branches" => Ok(RefNamespace::Heads),
            "tags" => Ok(RefNamespace::Tags),
            other => Err(TypeError::InvalidRefName(format!(
                "unknown ref namespace '{other}', expected 'heads' or 'tags'"
            ))),
        }
    }
}

/// A validated, fully-qualified Git reference name (`refs/...`).
///
/// # Example
///
/// ```
/// use tagtrack::core::types::RefName;
///
/// let refname = RefName::new("refs/tags/v2").unwrap();
/// assert_eq!(refname.relative(), "tags/v2");
/// assert_eq!(refname.short(), "v2");
///
/// // Refs must live under refs/
/// assert!(RefName::new("tags/v2").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname
    /// rules or does not start with `refs/`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if !name.starts_with("refs/") {
            return Err(TypeError::InvalidRefName(format!(
                "'{name}' must start with 'refs/'"
            )));
        }
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Build a ref name from its namespace-relative form (`tags/v1`).
    pub fn from_relative(relative: &str) -> Result<Self, TypeError> {
        Self::new(format!("refs/{}", relative))
    }

    /// Build a ref name for `name` under the given namespace.
    pub fn in_namespace(namespace: RefNamespace, name: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}{}", namespace.prefix(), name))
    }

    /// The namespace-relative form (`tags/v1`).
    pub fn relative(&self) -> &str {
        &self.0["refs/".len()..]
    }

    /// The name with its namespace stripped (`v1` for `refs/tags/v1`).
    pub fn short(&self) -> &str {
        self.0
            .strip_prefix(RefNamespace::Tags.prefix())
            .or_else(|| self.0.strip_prefix(RefNamespace::Heads.prefix()))
            .unwrap_or_else(|| self.relative())
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{pattern}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidRefName(format!(
                "ref name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ref and the commit it currently points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefRecord {
    pub name: RefName,
    pub oid: Oid,
}

impl std::fmt::Display for RefRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.name, self.oid)
    }
}

/// A remote repository, identified by owner and name.
///
/// # Example
///
/// ```
/// use tagtrack::core::types::Repository;
///
/// let repo: Repository = "octocat/hello-world".parse().unwrap();
/// assert_eq!(repo.owner, "octocat");
/// assert_eq!(repo.name, "hello-world");
///
/// let repo: Repository = "git@github.com:octocat/hello-world.git".parse().unwrap();
/// assert_eq!(repo.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::str::FromStr for Repository {
    type Err = TypeError;

    /// Accepts `owner/name` as well as SSH and HTTPS GitHub remote URLs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = s
            .strip_prefix("git@github.com:")
            .or_else(|| s.strip_prefix("https://github.com/"))
            .or_else(|| s.strip_prefix("http://github.com/"))
            .unwrap_or(s);
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        match rest.split_once('/') {
            Some((owner, name))
                if !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/')
                    && !owner.contains(':') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(TypeError::InvalidRepository(format!(
                "expected 'owner/name', got '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
