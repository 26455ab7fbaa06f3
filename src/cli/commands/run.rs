//! run command - Move floating tags for the triggering event
//!
//! # Example
//!
//! ```bash
//! # Inside a workflow, everything comes from the environment
//! tagtrack run
//!
//! # Locally, against a saved payload
//! tagtrack run --event-name release --event-path event.json \
//!     --sha 0123...cdef --repository octo/repo --publish-latest
//! ```

use anyhow::{Context as _, Result};

use super::{block_on, github_forge, load_event, load_settings, reporter};
use crate::cli::args::{EventArgs, RemoteArgs};
use crate::core::config::Overrides;
use crate::engine::{self, Context, RunOutcome};

/// Run the sync command.
///
/// This is a synchronous wrapper that uses tokio to run the async engine.
pub fn run(
    ctx: &Context,
    event: &EventArgs,
    remote: &RemoteArgs,
    overrides: Overrides,
) -> Result<()> {
    let reporter = reporter(ctx);
    let settings = load_settings(ctx, &reporter, &overrides)?;
    let event = load_event(event)?;
    event.validate()?;

    // A missing token is only an error once there is work to do.
    if let Some(reason) = engine::runner::skip_reason(&event, &settings) {
        reporter.notice(format!("Nothing to do: {}", reason));
        return Ok(());
    }

    let forge = github_forge(remote)?;
    reporter.debug(format!(
        "Syncing {} (watching refs/{}/)",
        forge.repository(),
        settings.namespace
    ));

    let outcome = block_on(engine::run(&forge, &event, &settings, &reporter))?
        .context("Failed to sync floating tags")?;

    if let RunOutcome::Synced {
        version,
        major_tag: None,
        latest_tag: None,
        ..
    } = &outcome
    {
        reporter.debug(format!("No floating tag moved for {}", version));
    }
    Ok(())
}
