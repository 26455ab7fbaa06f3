//! engine::runner
//!
//! The single entry point for a sync run.
//!
//! # Lifecycle
//!
//! ```text
//! Gate -> Resolve -> Enumerate -> Plan -> Upsert -> Report
//! ```
//!
//! # Invariants
//!
//! - Missing event context fails the run before it can be skipped
//! - Gating and version resolution happen before any remote call
//! - Missing context (tag name, ref, commit id) is fatal; a name that is
//!   not a version is not
//! - Movements are applied in plan order and the first failure aborts
//! - Step outputs are written only after every movement succeeded
//!
//! # Example
//!
//! ```
//! use tagtrack::core::config::Settings;
//! use tagtrack::core::event::EventContext;
//! use tagtrack::core::types::Oid;
//! use tagtrack::engine::runner::{run, RunOutcome};
//! use tagtrack::forge::mock::MockForge;
//! use tagtrack::ui::output::{Reporter, Verbosity};
//!
//! # tokio_test::block_on(async {
//! let sha = Oid::new("c".repeat(40)).unwrap();
//! let forge = MockForge::new();
//! let event = EventContext::release("v1.0.0", false).with_sha(sha.clone());
//! let reporter = Reporter::new(Verbosity::Quiet);
//!
//! let outcome = run(&forge, &event, &Settings::default(), &reporter).await.unwrap();
//! assert!(matches!(outcome, RunOutcome::Synced { .. }));
//! assert_eq!(forge.ref_oid("refs/tags/v1"), Some(sha));
//! # });
//! ```

use semver::Version;
use thiserror::Error;

use super::enumerate::RefEnumerator;
use super::plan::{self, MovementReason};
use super::upsert::{upsert_ref, UpsertError};
use crate::core::config::Settings;
use crate::core::event::{self, ContextError, EventContext};
use crate::forge::{Forge, ForgeError};
use crate::ui::output::Reporter;

/// Errors from a sync run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Listing existing versions failed.
    #[error("failed to list refs: {0}")]
    Enumerate(#[source] ForgeError),

    /// Moving a ref failed.
    #[error("failed to move {ref_name}: {source}")]
    Upsert {
        ref_name: String,
        #[source]
        source: UpsertError,
    },

    #[error("failed to write step output '{name}': {source}")]
    Output {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to do for this event.
    Skipped { reason: String },
    /// The event was a release; floating tags were brought up to date.
    Synced {
        /// Tag or branch name the version came from.
        ref_name: String,
        version: Version,
        /// Major tag moved, if any (`v2`).
        major_tag: Option<String>,
        /// Latest tag moved, if any.
        latest_tag: Option<String>,
    },
}

impl RunOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        RunOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }
}

/// Sync floating tags for one triggering event.
pub async fn run(
    forge: &dyn Forge,
    ctx: &EventContext,
    settings: &Settings,
    reporter: &Reporter,
) -> Result<RunOutcome, RunError> {
    ctx.validate()?;
    if let Some(reason) = skip_reason(ctx, settings) {
        reporter.notice(format!("Nothing to do: {}", reason));
        return Ok(RunOutcome::skipped(reason));
    }

    let Some(resolved) = plan::resolve_event_version(ctx)? else {
        let reason = "event ref is not a semantic version".to_string();
        reporter.notice(format!("Nothing to do: {}", reason));
        return Ok(RunOutcome::skipped(reason));
    };
    if !resolved.version.pre.is_empty() {
        let reason = format!("{} is a pre-release", resolved.version);
        reporter.notice(format!("Nothing to do: {}", reason));
        return Ok(RunOutcome::skipped(reason));
    }
    let target = ctx.require_sha()?.clone();

    tracing::info!(
        ref_name = %resolved.ref_name,
        version = %resolved.version,
        namespace = %settings.namespace,
        "resolved event version"
    );

    let existing = RefEnumerator::new(forge, settings.namespace)
        .with_page_size(settings.page_size)
        .collect_all()
        .await
        .map_err(RunError::Enumerate)?;
    tracing::debug!(count = existing.len(), "enumerated published versions");

    let movements = plan::plan_movements(&resolved.version, &existing, settings, &target);
    if movements.is_empty() {
        reporter.notice(format!(
            "{} is not the newest release of v{}, leaving floating tags alone",
            resolved.version, resolved.version.major
        ));
    }

    let mut major_tag = None;
    let mut latest_tag = None;
    for movement in &movements {
        reporter.debug(format!("Moving {} ({})", movement.ref_name, movement.reason));
        upsert_ref(forge, &movement.ref_name, &movement.oid, reporter)
            .await
            .map_err(|source| RunError::Upsert {
                ref_name: movement.ref_name.clone(),
                source,
            })?;
        let slot = match movement.reason {
            MovementReason::MajorLine => &mut major_tag,
            MovementReason::Latest => &mut latest_tag,
        };
        *slot = Some(movement.tag().to_string());
    }

    let outcome = RunOutcome::Synced {
        ref_name: resolved.ref_name,
        version: resolved.version,
        major_tag,
        latest_tag,
    };
    write_outputs(reporter, &outcome)?;
    Ok(outcome)
}

/// Publish `ref_name`, `tag` and `latest` for a synced run.
pub fn write_outputs(reporter: &Reporter, outcome: &RunOutcome) -> Result<(), RunError> {
    let RunOutcome::Synced {
        ref_name,
        major_tag,
        latest_tag,
        ..
    } = outcome
    else {
        return Ok(());
    };

    let outputs = [
        ("ref_name", ref_name.as_str()),
        ("tag", major_tag.as_deref().unwrap_or_default()),
        ("latest", latest_tag.as_deref().unwrap_or_default()),
    ];
    for (name, value) in outputs {
        reporter
            .set_output(name, value)
            .map_err(|source| RunError::Output { name, source })?;
    }
    Ok(())
}

/// Why this event is ignored, or `None` if it is acted on.
pub fn skip_reason(ctx: &EventContext, settings: &Settings) -> Option<String> {
    if plan::should_act(ctx, settings) {
        return None;
    }
    let reason = if event::is_pre_release(ctx) {
        "pre-releases do not move floating tags".to_string()
    } else if event::is_push(ctx) && !event::is_new_ref_push(ctx) {
        "push did not create a ref".to_string()
    } else if event::is_new_ref_push(ctx) {
        format!("pushed ref is not under refs/{}/", settings.namespace)
    } else {
        format!("'{}' events are not handled", ctx.kind())
    };
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Oid, RefNamespace};
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::ui::output::Verbosity;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    fn quiet() -> Reporter {
        Reporter::new(Verbosity::Quiet)
    }

    #[tokio::test]
    async fn skips_without_touching_the_remote() {
        let forge = MockForge::new();
        for ctx in [
            EventContext::release("v2.0.0-rc.1", true).with_sha(oid('a')),
            EventContext::push("refs/tags/v2.0.0", false).with_sha(oid('a')),
            EventContext::push("refs/heads/v2.0.0", true).with_sha(oid('a')),
            EventContext::other("schedule"),
        ] {
            let outcome = run(&forge, &ctx, &Settings::default(), &quiet())
                .await
                .unwrap();
            assert!(outcome.is_skipped(), "{ctx:?}");
        }
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn non_version_tag_is_skipped() {
        let forge = MockForge::new();
        let ctx = EventContext::push("refs/tags/nightly", true).with_sha(oid('a'));
        let outcome = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Skipped {
                reason: "event ref is not a semantic version".into()
            }
        );
    }

    #[tokio::test]
    async fn pre_release_version_on_push_is_skipped() {
        let forge = MockForge::new();
        let ctx = EventContext::push("refs/tags/v2.0.0-beta.1", true).with_sha(oid('a'));
        let outcome = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap();
        assert!(outcome.is_skipped());
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn missing_push_ref_fails_instead_of_skipping() {
        let forge = MockForge::new();
        let ctx = EventContext::from_payload("push", r#"{"created":true}"#, Some(&"a".repeat(40)))
            .unwrap();
        let err = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Context(ContextError::MissingField { field: "ref", .. })
        ));
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn missing_sha_fails_before_remote_calls() {
        let forge = MockForge::new();
        let ctx = EventContext::release("v1.0.0", false);
        let err = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Context(ContextError::MissingField { .. })));
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn release_moves_major_and_latest() {
        let forge = MockForge::new()
            .with_ref("refs/tags/v1.0.0", &oid('a'))
            .with_ref("refs/tags/v1", &oid('a'));
        let settings = Settings {
            publish_latest: true,
            ..Settings::default()
        };
        let ctx = EventContext::release("v1.1.0", false).with_sha(oid('b'));

        let outcome = run(&forge, &ctx, &settings, &quiet()).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Synced {
                ref_name: "v1.1.0".into(),
                version: Version::new(1, 1, 0),
                major_tag: Some("v1".into()),
                latest_tag: Some("latest".into()),
            }
        );
        assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid('b')));
        assert_eq!(forge.ref_oid("refs/tags/latest"), Some(oid('b')));
    }

    #[tokio::test]
    async fn branch_releases_enumerate_heads() {
        let forge = MockForge::new().with_ref("refs/heads/2.0.0", &oid('a'));
        let settings = Settings {
            namespace: RefNamespace::Heads,
            ..Settings::default()
        };
        let ctx = EventContext::push("refs/heads/1.5.0", true).with_sha(oid('b'));

        let outcome = run(&forge, &ctx, &settings, &quiet()).await.unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Synced { major_tag: Some(ref t), .. } if t == "v1"
        ));
        assert_eq!(
            forge.operations()[0],
            MockOperation::ListRefsPage {
                namespace: RefNamespace::Heads,
                cursor: None
            }
        );
        assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid('b')));
    }

    #[tokio::test]
    async fn enumeration_failure_is_fatal() {
        let forge = MockForge::new().fail_on(FailOn::ListRefsPage(ForgeError::RateLimited));
        let ctx = EventContext::release("v1.0.0", false).with_sha(oid('a'));
        let err = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Enumerate(ForgeError::RateLimited)));
    }

    #[tokio::test]
    async fn outputs_are_written_after_sync() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("github_output");
        let reporter = quiet().with_output_file(&path);

        let forge = MockForge::new();
        let ctx = EventContext::release("2.0.0", false).with_sha(oid('c'));
        run(&forge, &ctx, &Settings::default(), &reporter)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "ref_name=2.0.0\ntag=v2\nlatest=\n");
    }
}
