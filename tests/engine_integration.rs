//! Integration tests for the sync engine.
//!
//! These drive the enumerator, the upserter and the full run against
//! MockForge, covering the release and push scenarios end to end.

use semver::Version;
use tagtrack::core::config::Settings;
use tagtrack::core::event::{ContextError, EventContext};
use tagtrack::core::types::{Oid, RefNamespace};
use tagtrack::engine::enumerate::RefEnumerator;
use tagtrack::engine::runner::{run, RunError, RunOutcome};
use tagtrack::engine::upsert::upsert_ref;
use tagtrack::forge::mock::{MockForge, MockOperation};
use tagtrack::forge::{RefPage, RemoteRef};
use tagtrack::ui::output::{Reporter, Verbosity};

fn oid(c: char) -> Oid {
    Oid::new(c.to_string().repeat(40)).unwrap()
}

fn quiet() -> Reporter {
    Reporter::new(Verbosity::Quiet)
}

fn page(names: &[&str], cursor: Option<&str>, more: bool) -> RefPage {
    RefPage {
        refs: names
            .iter()
            .map(|name| RemoteRef {
                name: name.to_string(),
                oid: oid('a'),
            })
            .collect(),
        end_cursor: cursor.map(String::from),
        has_next_page: more,
    }
}

fn page_requests(forge: &MockForge) -> usize {
    forge.count(|op| matches!(op, MockOperation::ListRefsPage { .. }))
}

// =============================================================================
// Enumeration
// =============================================================================

mod enumeration {
    use super::*;

    #[tokio::test]
    async fn empty_namespace_yields_nothing() {
        let forge = MockForge::new();
        let all = RefEnumerator::new(&forge, RefNamespace::Tags)
            .collect_all()
            .await
            .unwrap();

        assert!(all.is_empty());
        assert_eq!(page_requests(&forge), 1);
    }

    #[tokio::test]
    async fn two_pages_with_cursor_filter_non_versions() {
        let forge = MockForge::new().with_ref_pages(vec![
            page(&["v1.0.0"], Some("abc"), true),
            page(&["latest"], None, false),
        ]);

        let all = RefEnumerator::new(&forge, RefNamespace::Tags)
            .collect_all()
            .await
            .unwrap();

        assert_eq!(all, vec![(Version::new(1, 0, 0), oid('a'))]);
        assert_eq!(
            forge.operations()[1],
            MockOperation::ListRefsPage {
                namespace: RefNamespace::Tags,
                cursor: Some("abc".into())
            }
        );
    }

    #[tokio::test]
    async fn n_pages_take_n_requests_in_fetch_order() {
        let forge = MockForge::new().with_ref_pages(vec![
            page(&["v3.0.0", "main"], Some("p1"), true),
            page(&["v1.0.0"], Some("p2"), true),
            page(&["v2.0.0", "v2.1.0"], Some("p3"), false),
        ]);

        let all = RefEnumerator::new(&forge, RefNamespace::Heads)
            .collect_all()
            .await
            .unwrap();

        let versions: Vec<String> = all.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(versions, vec!["3.0.0", "1.0.0", "2.0.0", "2.1.0"]);
        assert_eq!(page_requests(&forge), 3);
    }

    #[tokio::test]
    async fn stopping_early_fetches_no_further_pages() {
        let forge = MockForge::new().with_ref_pages(vec![
            page(&["v1.0.0"], Some("p1"), true),
            page(&["v2.0.0"], None, false),
        ]);

        let mut refs = RefEnumerator::new(&forge, RefNamespace::Tags);
        let first = refs.next_batch().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        drop(refs);

        assert_eq!(page_requests(&forge), 1);
    }

    #[tokio::test]
    async fn paging_over_stored_refs() {
        let forge = (0..25).fold(MockForge::new(), |forge, patch| {
            forge.with_ref(&format!("refs/tags/v1.0.{}", patch), &oid('b'))
        });

        let all = RefEnumerator::new(&forge, RefNamespace::Tags)
            .with_page_size(10)
            .collect_all()
            .await
            .unwrap();

        assert_eq!(all.len(), 25);
        assert_eq!(page_requests(&forge), 3);
    }
}

// =============================================================================
// Upsert
// =============================================================================

mod upsert {
    use super::*;

    #[tokio::test]
    async fn missing_ref_is_created() {
        let forge = MockForge::new();
        upsert_ref(&forge, "tags/v1", &oid('c'), &quiet())
            .await
            .unwrap();

        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::CreateRef { .. })),
            1
        );
        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::UpdateRef { .. })),
            0
        );
    }

    #[tokio::test]
    async fn existing_ref_is_force_updated() {
        let forge = MockForge::new().with_ref("refs/tags/v1", &oid('a'));
        upsert_ref(&forge, "tags/v1", &oid('c'), &quiet())
            .await
            .unwrap();

        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::UpdateRef { force: true, .. })),
            1
        );
        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::CreateRef { .. })),
            0
        );
        assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid('c')));
    }

    #[tokio::test]
    async fn repeated_upsert_converges() {
        let forge = MockForge::new();
        for _ in 0..3 {
            upsert_ref(&forge, "tags/latest", &oid('d'), &quiet())
                .await
                .unwrap();
        }
        assert_eq!(forge.ref_oid("refs/tags/latest"), Some(oid('d')));
        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::CreateRef { .. })),
            1
        );
    }
}

// =============================================================================
// Full runs
// =============================================================================

mod runs {
    use super::*;

    fn publish_latest() -> Settings {
        Settings {
            publish_latest: true,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn public_release_moves_floating_tags() {
        let forge = MockForge::new()
            .with_ref("refs/tags/1.0.0", &oid('a'))
            .with_ref("refs/tags/v1", &oid('a'))
            .with_ref("refs/tags/latest", &oid('a'));
        let ctx = EventContext::release("2.0.0", false).with_sha(oid('b'));

        let outcome = run(&forge, &ctx, &publish_latest(), &quiet())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Synced {
                ref_name: "2.0.0".into(),
                version: Version::new(2, 0, 0),
                major_tag: Some("v2".into()),
                latest_tag: Some("latest".into()),
            }
        );
        assert_eq!(forge.ref_oid("refs/tags/v2"), Some(oid('b')));
        assert_eq!(forge.ref_oid("refs/tags/latest"), Some(oid('b')));
        assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid('a')));
    }

    #[tokio::test]
    async fn maintenance_release_leaves_latest_alone() {
        let forge = MockForge::new()
            .with_ref("refs/tags/v1.4.0", &oid('a'))
            .with_ref("refs/tags/v2.0.0", &oid('a'))
            .with_ref("refs/tags/latest", &oid('a'));
        let ctx = EventContext::release("v1.4.1", false).with_sha(oid('e'));

        let outcome = run(&forge, &ctx, &publish_latest(), &quiet())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Synced {
                major_tag: Some(_),
                latest_tag: None,
                ..
            }
        ));
        assert_eq!(forge.ref_oid("refs/tags/v1"), Some(oid('e')));
        assert_eq!(forge.ref_oid("refs/tags/latest"), Some(oid('a')));
    }

    #[tokio::test]
    async fn stale_release_moves_nothing() {
        let forge = MockForge::new().with_ref("refs/tags/v1.5.0", &oid('a'));
        let ctx = EventContext::release("v1.4.9", false).with_sha(oid('e'));

        let outcome = run(&forge, &ctx, &publish_latest(), &quiet())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Synced {
                major_tag: None,
                latest_tag: None,
                ..
            }
        ));
        assert_eq!(
            forge.count(|op| matches!(
                op,
                MockOperation::CreateRef { .. } | MockOperation::UpdateRef { .. }
            )),
            0
        );
    }

    #[tokio::test]
    async fn pre_release_is_skipped() {
        let forge = MockForge::new();
        let ctx = EventContext::release("v3.1-beta", true).with_sha(oid('a'));

        let outcome = run(&forge, &ctx, &publish_latest(), &quiet())
            .await
            .unwrap();

        assert!(outcome.is_skipped());
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn new_tag_push_moves_major() {
        let forge = MockForge::new().with_ref("refs/tags/v3.0.0", &oid('a'));
        let ctx = EventContext::push("refs/tags/v3.0.0", true).with_sha(oid('a'));

        let outcome = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Synced { .. }));
        assert_eq!(forge.ref_oid("refs/tags/v3"), Some(oid('a')));
    }

    #[tokio::test]
    async fn new_branch_push_is_ignored_when_watching_tags() {
        let forge = MockForge::new();
        let ctx = EventContext::push("refs/heads/main", true).with_sha(oid('a'));

        let outcome = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap();

        assert!(outcome.is_skipped());
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn push_payload_without_ref_fails() {
        let sha = "a".repeat(40);
        let ctx = EventContext::from_payload("push", r#"{"created":true}"#, Some(&sha)).unwrap();
        let forge = MockForge::new();

        let err = run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Context(ContextError::MissingField { field: "ref", .. })
        ));
        assert!(err.to_string().contains("ref"));
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn pre_release_payload_without_tag_name_fails() {
        let ctx =
            EventContext::from_payload("release", r#"{"release":{"prerelease":true}}"#, None)
                .unwrap();
        let forge = MockForge::new();

        let err = run(&forge, &ctx, &publish_latest(), &quiet())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Context(ContextError::MissingField {
                field: "release.tag_name",
                ..
            })
        ));
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn payload_driven_run() {
        let payload = r#"{
            "action": "published",
            "release": { "tag_name": "v4.2.0", "prerelease": false, "draft": false }
        }"#;
        let ctx = EventContext::from_payload("release", payload, Some(&"f".repeat(40))).unwrap();
        let forge = MockForge::new();

        run(&forge, &ctx, &Settings::default(), &quiet())
            .await
            .unwrap();

        assert_eq!(forge.ref_oid("refs/tags/v4"), Some(oid('f')));
    }
}
