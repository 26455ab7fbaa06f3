//! core::event
//!
//! The triggering event and the predicates that classify it.
//!
//! # Design
//!
//! [`EventContext`] is built once per invocation, from the event name and
//! the JSON payload the CI runner hands us, and is never mutated. The
//! classifier functions are pure predicates over it, so every branch of
//! the orchestrator can be tested with synthetic contexts.
//!
//! # Example
//!
//! ```
//! use tagtrack::core::event::{is_branch_push, is_public_release, is_tag_push, EventContext};
//!
//! let release = EventContext::release("2.0.0", false);
//! assert!(is_public_release(&release));
//!
//! let push = EventContext::push("refs/heads/main", true);
//! assert!(is_branch_push(&push));
//! assert!(!is_tag_push(&push));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::types::{Oid, RefNamespace};

/// Errors from building or reading the event context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A field the current event kind requires is absent.
    #[error("missing required context: {field} (on '{event}' event)")]
    MissingField { event: String, field: &'static str },

    #[error("failed to read event payload '{path}': {source}")]
    ReadPayload {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse event payload: {0}")]
    ParsePayload(String),

    #[error("invalid commit id: {0}")]
    InvalidSha(String),
}

/// Kind of event that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Release,
    Push,
    /// Any other event name, kept verbatim for messages.
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "release" => EventKind::Release,
            "push" => EventKind::Push,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Release => "release",
            EventKind::Push => "push",
            EventKind::Other(name) => name,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a `release` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
}

/// Fields of a `push` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushInfo {
    /// Fully-qualified ref that was pushed (`refs/tags/v1.2.3`).
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Whether the push created the ref.
    #[serde(default)]
    pub created: bool,
}

/// Subset of the webhook payload we read.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    release: Option<ReleaseInfo>,
    #[serde(flatten)]
    push: PushInfo,
}

/// Immutable description of the event that triggered this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    kind: EventKind,
    release: Option<ReleaseInfo>,
    push: Option<PushInfo>,
    sha: Option<Oid>,
}

impl EventContext {
    /// A `release` event for `tag_name`.
    pub fn release(tag_name: impl Into<String>, prerelease: bool) -> Self {
        Self {
            kind: EventKind::Release,
            release: Some(ReleaseInfo {
                tag_name: Some(tag_name.into()),
                prerelease,
            }),
            push: None,
            sha: None,
        }
    }

    /// A `push` event for a fully-qualified ref.
    pub fn push(git_ref: impl Into<String>, created: bool) -> Self {
        Self {
            kind: EventKind::Push,
            release: None,
            push: Some(PushInfo {
                git_ref: Some(git_ref.into()),
                created,
            }),
            sha: None,
        }
    }

    /// Any other event, carrying no payload fields.
    pub fn other(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            kind: EventKind::from_name(&name),
            release: None,
            push: None,
            sha: None,
        }
    }

    /// Attach the commit id of the triggering event.
    pub fn with_sha(mut self, sha: Oid) -> Self {
        self.sha = Some(sha);
        self
    }

    /// Build a context from an event name and its JSON payload.
    ///
    /// Fields that do not belong to the event kind are ignored. Absent
    /// fields are not an error here; they are reported when something
    /// needs them.
    pub fn from_payload(
        name: &str,
        payload: &str,
        sha: Option<&str>,
    ) -> Result<Self, ContextError> {
        let raw: RawPayload = if payload.trim().is_empty() {
            RawPayload::default()
        } else {
            serde_json::from_str(payload).map_err(|e| ContextError::ParsePayload(e.to_string()))?
        };

        let kind = EventKind::from_name(name);
        let (release, push) = match kind {
            EventKind::Release => (Some(raw.release.unwrap_or_default()), None),
            EventKind::Push => (None, Some(raw.push)),
            EventKind::Other(_) => (None, None),
        };
        let sha = sha
            .filter(|s| !s.trim().is_empty())
            .map(|s| Oid::new(s).map_err(|e| ContextError::InvalidSha(e.to_string())))
            .transpose()?;

        Ok(Self {
            kind,
            release,
            push,
            sha,
        })
    }

    /// Read the payload file at `path` and build a context from it.
    pub fn load(name: &str, path: &Path, sha: Option<&str>) -> Result<Self, ContextError> {
        let payload = std::fs::read_to_string(path).map_err(|source| ContextError::ReadPayload {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_payload(name, &payload, sha)
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn push_info(&self) -> Option<&PushInfo> {
        self.push.as_ref()
    }

    pub fn sha(&self) -> Option<&Oid> {
        self.sha.as_ref()
    }

    /// The commit id, or a `MissingField` error.
    pub fn require_sha(&self) -> Result<&Oid, ContextError> {
        self.sha.as_ref().ok_or_else(|| self.missing("sha"))
    }

    /// The release tag name, or a `MissingField` error.
    pub fn require_tag_name(&self) -> Result<&str, ContextError> {
        self.release
            .as_ref()
            .and_then(|r| r.tag_name.as_deref())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| self.missing("release.tag_name"))
    }

    /// The pushed ref, or a `MissingField` error.
    pub fn require_push_ref(&self) -> Result<&str, ContextError> {
        self.push
            .as_ref()
            .and_then(|p| p.git_ref.as_deref())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| self.missing("ref"))
    }

    /// Check the fields this kind of event cannot do without.
    ///
    /// A release needs its tag name and a push needs its ref, whether or
    /// not the event ends up being acted on.
    pub fn validate(&self) -> Result<(), ContextError> {
        match self.kind {
            EventKind::Release => self.require_tag_name().map(drop),
            EventKind::Push => self.require_push_ref().map(drop),
            EventKind::Other(_) => Ok(()),
        }
    }

    fn missing(&self, field: &'static str) -> ContextError {
        ContextError::MissingField {
            event: self.kind.to_string(),
            field,
        }
    }
}

pub fn is_release(ctx: &EventContext) -> bool {
    ctx.kind == EventKind::Release
}

pub fn is_pre_release(ctx: &EventContext) -> bool {
    ctx.release.as_ref().is_some_and(|r| r.prerelease)
}

pub fn is_public_release(ctx: &EventContext) -> bool {
    is_release(ctx) && !is_pre_release(ctx)
}

pub fn is_push(ctx: &EventContext) -> bool {
    ctx.kind == EventKind::Push
}

/// A push that created its ref.
pub fn is_new_ref_push(ctx: &EventContext) -> bool {
    is_push(ctx) && ctx.push.as_ref().is_some_and(|p| p.created)
}

pub fn is_branch_push(ctx: &EventContext) -> bool {
    is_new_ref_push(ctx) && pushed_ref_starts_with(ctx, RefNamespace::Heads.prefix())
}

pub fn is_tag_push(ctx: &EventContext) -> bool {
    is_new_ref_push(ctx) && pushed_ref_starts_with(ctx, RefNamespace::Tags.prefix())
}

fn pushed_ref_starts_with(ctx: &EventContext, prefix: &str) -> bool {
    ctx.push
        .as_ref()
        .and_then(|p| p.git_ref.as_deref())
        .is_some_and(|r| r.starts_with(prefix))
}
