//! engine::plan
//!
//! Deciding which floating tags an event moves.
//!
//! # Invariants
//!
//! - Planner does not perform I/O
//! - Pre-release versions never move a floating tag
//! - The major tag is always planned before the latest tag
//!
//! # Example
//!
//! ```
//! use semver::Version;
//! use tagtrack::core::config::Settings;
//! use tagtrack::core::types::Oid;
//! use tagtrack::engine::plan::plan_movements;
//!
//! let sha = Oid::new("b".repeat(40)).unwrap();
//! let existing = vec![(Version::new(1, 4, 0), sha.clone())];
//!
//! let moves = plan_movements(&Version::new(1, 5, 0), &existing, &Settings::default(), &sha);
//! assert_eq!(moves.len(), 1);
//! assert_eq!(moves[0].ref_name, "tags/v1");
//! ```

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::core::config::Settings;
use crate::core::event::{self, ContextError, EventContext, EventKind};
use crate::core::types::{Oid, RefNamespace};
use crate::core::version;

/// The version an event announces, and the ref name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventVersion {
    /// Tag or branch name without its namespace (`v1.2.3`).
    pub ref_name: String,
    pub version: Version,
}

/// Why a ref is being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementReason {
    /// Newest release of its major line.
    MajorLine,
    /// Newest release overall.
    Latest,
}

impl fmt::Display for MovementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementReason::MajorLine => write!(f, "latest in major line"),
            MovementReason::Latest => write!(f, "latest release"),
        }
    }
}

/// A single planned ref movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMovement {
    /// Namespace-relative ref (`tags/v1`).
    pub ref_name: String,
    pub oid: Oid,
    pub reason: MovementReason,
}

impl RefMovement {
    /// Name without the `tags/` prefix.
    pub fn tag(&self) -> &str {
        self.ref_name
            .strip_prefix(RefNamespace::Tags.relative_prefix())
            .unwrap_or(&self.ref_name)
    }
}

/// Whether the event is one this tool acts on.
///
/// Public releases always qualify. A newly created ref qualifies when it
/// lands in the namespace being watched.
pub fn should_act(ctx: &EventContext, settings: &Settings) -> bool {
    event::is_public_release(ctx)
        || match settings.namespace {
            RefNamespace::Tags => event::is_tag_push(ctx),
            RefNamespace::Heads => event::is_branch_push(ctx),
        }
}

/// Work out the version an event announces.
///
/// Returns `Ok(None)` when the event carries a name that is not a version
/// or is of a kind that never does.
///
/// # Errors
///
/// `ContextError::MissingField` if a release has no tag name or a push has
/// no ref.
pub fn resolve_event_version(ctx: &EventContext) -> Result<Option<EventVersion>, ContextError> {
    let (ref_name, version) = match ctx.kind() {
        EventKind::Release => {
            let tag = ctx.require_tag_name()?;
            let version = version::resolve_release_tag(tag, event::is_pre_release(ctx));
            (tag.to_string(), version)
        }
        EventKind::Push => {
            let git_ref = ctx.require_push_ref()?;
            let name = git_ref
                .strip_prefix(RefNamespace::Tags.prefix())
                .or_else(|| git_ref.strip_prefix(RefNamespace::Heads.prefix()))
                .unwrap_or(git_ref);
            (name.to_string(), version::parse(name))
        }
        EventKind::Other(_) => return Ok(None),
    };

    Ok(version.map(|version| EventVersion { ref_name, version }))
}

/// Plan the floating tag movements for `version`, released at `target`.
///
/// `existing` is every version already published in the watched namespace.
/// Pre-releases among them are ignored, as is `version` itself when it
/// appears there.
pub fn plan_movements(
    version: &Version,
    existing: &[(Version, Oid)],
    settings: &Settings,
    target: &Oid,
) -> Vec<RefMovement> {
    if !version.pre.is_empty() {
        return Vec::new();
    }

    let newer = |same_major: bool| {
        existing.iter().any(|(other, _)| {
            other.pre.is_empty()
                && (!same_major || other.major == version.major)
                && version::precedence(other, version) == Ordering::Greater
        })
    };

    let mut movements = Vec::new();
    if !newer(true) {
        movements.push(RefMovement {
            ref_name: format!(
                "{}{}",
                RefNamespace::Tags.relative_prefix(),
                version::major_tag(version)
            ),
            oid: target.clone(),
            reason: MovementReason::MajorLine,
        });
    }
    if settings.publish_latest && !newer(false) {
        movements.push(RefMovement {
            ref_name: format!(
                "{}{}",
                RefNamespace::Tags.relative_prefix(),
                settings.latest_tag
            ),
            oid: target.clone(),
            reason: MovementReason::Latest,
        });
    }
    movements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    fn existing(versions: &[&str]) -> Vec<(Version, Oid)> {
        versions
            .iter()
            .map(|v| (Version::parse(v).unwrap(), oid('a')))
            .collect()
    }

    fn with_latest() -> Settings {
        Settings {
            publish_latest: true,
            ..Settings::default()
        }
    }

    mod gate {
        use super::*;

        #[test]
        fn public_release_always_acts() {
            let ctx = EventContext::release("2.0.0", false);
            assert!(should_act(&ctx, &Settings::default()));
            let heads = Settings {
                namespace: RefNamespace::Heads,
                ..Settings::default()
            };
            assert!(should_act(&ctx, &heads));
        }

        #[test]
        fn pre_release_never_acts() {
            let ctx = EventContext::release("v3.1-beta", true);
            assert!(!should_act(&ctx, &Settings::default()));
        }

        #[test]
        fn pushes_follow_watched_namespace() {
            let tag = EventContext::push("refs/tags/v1.2.0", true);
            let branch = EventContext::push("refs/heads/v1.2.0", true);
            let heads = Settings {
                namespace: RefNamespace::Heads,
                ..Settings::default()
            };

            assert!(should_act(&tag, &Settings::default()));
            assert!(!should_act(&branch, &Settings::default()));
            assert!(should_act(&branch, &heads));
            assert!(!should_act(&tag, &heads));
        }

        #[test]
        fn updates_to_existing_refs_are_ignored() {
            let ctx = EventContext::push("refs/tags/v1.2.0", false);
            assert!(!should_act(&ctx, &Settings::default()));
        }

        #[test]
        fn other_events_are_ignored() {
            let ctx = EventContext::other("workflow_dispatch");
            assert!(!should_act(&ctx, &Settings::default()));
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn release_tag() {
            let resolved = resolve_event_version(&EventContext::release("v2.0.0", false))
                .unwrap()
                .unwrap();
            assert_eq!(resolved.ref_name, "v2.0.0");
            assert_eq!(resolved.version, Version::new(2, 0, 0));
        }

        #[test]
        fn pre_release_tag_is_coerced() {
            let resolved = resolve_event_version(&EventContext::release("v3.1-beta", true))
                .unwrap()
                .unwrap();
            assert_eq!(resolved.version, Version::new(3, 1, 0));
        }

        #[test]
        fn sloppy_public_tag_is_not_coerced() {
            let resolved = resolve_event_version(&EventContext::release("v3.1", false)).unwrap();
            assert!(resolved.is_none());
        }

        #[test]
        fn pushed_refs_lose_their_namespace() {
            let tag = resolve_event_version(&EventContext::push("refs/tags/v1.2.3", true))
                .unwrap()
                .unwrap();
            assert_eq!(tag.ref_name, "v1.2.3");

            let branch = resolve_event_version(&EventContext::push("refs/heads/1.0.0", true))
                .unwrap()
                .unwrap();
            assert_eq!(branch.version, Version::new(1, 0, 0));
        }

        #[test]
        fn non_version_push_resolves_to_nothing() {
            let ctx = EventContext::push("refs/heads/main", true);
            assert_eq!(resolve_event_version(&ctx).unwrap(), None);
        }

        #[test]
        fn missing_fields_are_errors() {
            let release = EventContext::from_payload("release", "{}", None).unwrap();
            assert!(matches!(
                resolve_event_version(&release),
                Err(ContextError::MissingField { .. })
            ));

            let push = EventContext::from_payload("push", "{}", None).unwrap();
            assert!(resolve_event_version(&push).is_err());
        }

        #[test]
        fn other_events_resolve_to_nothing() {
            let ctx = EventContext::other("schedule");
            assert_eq!(resolve_event_version(&ctx).unwrap(), None);
        }
    }

    mod movements {
        use super::*;

        #[test]
        fn first_release_moves_major() {
            let moves = plan_movements(&Version::new(1, 0, 0), &[], &Settings::default(), &oid('b'));
            assert_eq!(
                moves,
                vec![RefMovement {
                    ref_name: "tags/v1".into(),
                    oid: oid('b'),
                    reason: MovementReason::MajorLine,
                }]
            );
        }

        #[test]
        fn older_patch_in_major_moves_nothing() {
            let moves = plan_movements(
                &Version::new(1, 2, 0),
                &existing(&["1.3.0", "1.2.0"]),
                &with_latest(),
                &oid('b'),
            );
            assert!(moves.is_empty());
        }

        #[test]
        fn backport_moves_major_but_not_latest() {
            let moves = plan_movements(
                &Version::new(1, 9, 1),
                &existing(&["1.9.0", "2.0.0"]),
                &with_latest(),
                &oid('b'),
            );
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].tag(), "v1");
        }

        #[test]
        fn newest_release_moves_both_in_order() {
            let moves = plan_movements(
                &Version::new(2, 1, 0),
                &existing(&["2.1.0", "2.0.0", "1.0.0"]),
                &with_latest(),
                &oid('b'),
            );
            assert_eq!(
                moves.iter().map(|m| m.ref_name.as_str()).collect::<Vec<_>>(),
                vec!["tags/v2", "tags/latest"]
            );
            assert_eq!(moves[1].reason, MovementReason::Latest);
        }

        #[test]
        fn latest_requires_opt_in() {
            let moves = plan_movements(&Version::new(2, 1, 0), &[], &Settings::default(), &oid('b'));
            assert!(moves.iter().all(|m| m.reason != MovementReason::Latest));
        }

        #[test]
        fn custom_latest_tag_name() {
            let settings = Settings {
                latest_tag: "stable".into(),
                ..with_latest()
            };
            let moves = plan_movements(&Version::new(1, 0, 0), &[], &settings, &oid('b'));
            assert_eq!(moves[1].ref_name, "tags/stable");
        }

        #[test]
        fn newer_pre_releases_do_not_block() {
            let moves = plan_movements(
                &Version::new(1, 0, 0),
                &existing(&["1.1.0-rc.1", "2.0.0-alpha"]),
                &with_latest(),
                &oid('b'),
            );
            assert_eq!(moves.len(), 2);
        }

        #[test]
        fn build_metadata_is_not_newer() {
            let moves = plan_movements(
                &Version::new(1, 0, 0),
                &existing(&["1.0.0+build.7"]),
                &Settings::default(),
                &oid('b'),
            );
            assert_eq!(moves.len(), 1);
        }

        #[test]
        fn pre_release_event_moves_nothing() {
            let version = Version::parse("3.0.0-beta.1").unwrap();
            assert!(plan_movements(&version, &[], &with_latest(), &oid('b')).is_empty());
        }
    }
}
