//! resolve command - Show what the triggering event announces
//!
//! Works offline: only the event payload is read.

use anyhow::Result;

use super::{load_event, load_settings, reporter};
use crate::cli::args::EventArgs;
use crate::core::config::Overrides;
use crate::core::event::{self, EventContext};
use crate::core::version;
use crate::engine::plan;
use crate::engine::runner::skip_reason;
use crate::engine::Context;

/// Classify the event and print its resolved version.
pub fn resolve(ctx: &Context, args: &EventArgs, overrides: Overrides) -> Result<()> {
    let reporter = reporter(ctx);
    let settings = load_settings(ctx, &reporter, &overrides)?;
    let event = load_event(args)?;

    if !ctx.quiet {
        println!("event: {}", event.kind());
        println!("classes: {}", classes(&event).join(", "));
    }

    let resolved = match plan::resolve_event_version(&event)? {
        Some(resolved) => resolved,
        None => {
            reporter.notice("No semantic version for this event");
            return Ok(());
        }
    };

    if !ctx.quiet {
        println!("ref: {}", resolved.ref_name);
        println!("version: {}", resolved.version);
        println!("major tag: {}", version::major_tag(&resolved.version));
    }
    match skip_reason(&event, &settings) {
        Some(reason) => reporter.notice(format!("tagtrack run would skip: {}", reason)),
        None => reporter.notice(format!(
            "tagtrack run would act on {} (watching refs/{}/)",
            resolved.version, settings.namespace
        )),
    }
    Ok(())
}

/// Names of the classifier predicates that hold for `event`.
fn classes(event: &EventContext) -> Vec<&'static str> {
    let predicates: [(&'static str, fn(&EventContext) -> bool); 7] = [
        ("release", event::is_release),
        ("pre-release", event::is_pre_release),
        ("public-release", event::is_public_release),
        ("push", event::is_push),
        ("new-ref-push", event::is_new_ref_push),
        ("branch-push", event::is_branch_push),
        ("tag-push", event::is_tag_push),
    ];
    let held: Vec<_> = predicates
        .iter()
        .filter(|(_, holds)| holds(event))
        .map(|(name, _)| *name)
        .collect();
    if held.is_empty() {
        vec!["none"]
    } else {
        held
    }
}
