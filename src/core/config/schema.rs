//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! prefer_branch_releases = false
//! publish_latest = true
//! latest_tag = "latest"
//! page_size = 100
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: `latest_tag` must be usable as a tag
//! name and `page_size` must fit GitHub's 1..=100 page bounds.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{RefName, RefNamespace};

/// Largest page GitHub's GraphQL connections return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default name of the tag tracking the newest release.
pub const DEFAULT_LATEST_TAG: &str = "latest";

/// Contents of a `tagtrack.toml` file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Watch branches (`refs/heads/`) instead of tags for releases
    pub prefer_branch_releases: Option<bool>,

    /// Also move the latest tag when the release is the newest overall
    pub publish_latest: Option<bool>,

    /// Name of the latest tag
    pub latest_tag: Option<String>,

    /// Refs requested per page while enumerating
    pub page_size: Option<u32>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tag) = &self.latest_tag {
            validate_tag_name(tag)?;
        }

        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(ConfigError::InvalidValue(format!(
                    "page_size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
        }

        Ok(())
    }
}

/// A tag name is valid if `refs/tags/<name>` is a valid ref.
pub(crate) fn validate_tag_name(tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() {
        return Err(ConfigError::InvalidValue(
            "latest_tag cannot be empty".to_string(),
        ));
    }
    RefName::in_namespace(RefNamespace::Tags, tag)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid latest_tag: {}", e)))
}
