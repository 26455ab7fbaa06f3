//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds what it needs from arguments, config and environment
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `run` and `refs` talk to GitHub and are async underneath. Each wraps its
//! async body in a current-thread tokio runtime, so exactly one remote call
//! is ever in flight.

mod refs;
mod resolve;
mod run;

use std::future::Future;

use anyhow::{Context as _, Result};

use super::args::{Command, EventArgs, RemoteArgs};
use crate::core::config::{Config, Overrides, Settings};
use crate::core::event::EventContext;
use crate::core::types::Repository;
use crate::engine::Context;
use crate::forge::github::{GitHubForge, DEFAULT_API_BASE};
use crate::ui::output::{Reporter, Verbosity};

/// Fallback token variable when `INPUT_TOKEN` is not set.
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Run {
            event,
            remote,
            sync,
        } => run::run(
            ctx,
            &event,
            &remote,
            Overrides {
                prefer_branch_releases: sync.prefer_branch_releases,
                publish_latest: sync.publish_latest,
                latest_tag: sync.latest_tag,
            },
        ),
        Command::Resolve {
            event,
            prefer_branch_releases,
        } => resolve::resolve(
            ctx,
            &event,
            Overrides {
                prefer_branch_releases,
                ..Overrides::default()
            },
        ),
        Command::Refs {
            remote,
            namespace,
            sort,
        } => refs::refs(ctx, &remote, namespace, sort),
    }
}

/// Reporter for the current context, aware of GitHub Actions.
fn reporter(ctx: &Context) -> Reporter {
    Reporter::from_env(Verbosity::from_flags(ctx.quiet, ctx.debug))
}

/// Load the config file and apply command-line overrides.
fn load_settings(ctx: &Context, reporter: &Reporter, overrides: &Overrides) -> Result<Settings> {
    let cwd = ctx
        .working_dir()
        .context("Failed to determine working directory")?;
    let loaded = Config::load(ctx.config.as_deref(), &cwd)?;
    for warning in &loaded.warnings {
        reporter.warn(format!("{} ({})", warning.message, warning.path.display()));
    }
    if let Some(path) = loaded.config.path() {
        reporter.debug(format!("Using config {}", path.display()));
    }
    Ok(loaded.config.settings(overrides)?)
}

/// Build the event context from the payload file.
///
/// Without a payload file the context carries only the event kind, which
/// is enough to decide that there is nothing to do.
fn load_event(args: &EventArgs) -> Result<EventContext> {
    let sha = args.sha.as_deref();
    let event = match &args.event_path {
        Some(path) => EventContext::load(&args.event_name, path, sha)?,
        None => EventContext::from_payload(&args.event_name, "", sha)?,
    };
    tracing::debug!(?event, "loaded event context");
    Ok(event)
}

/// Build a GitHub forge from remote arguments.
fn github_forge(args: &RemoteArgs) -> Result<GitHubForge> {
    let repository: Repository = args
        .repository
        .parse()
        .context("Invalid --repository")?;
    let token = args
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
        .context("No token given. Pass --token or set INPUT_TOKEN or GITHUB_TOKEN")?;

    let api_base = args.api_url.as_deref().unwrap_or(DEFAULT_API_BASE);
    let mut forge = GitHubForge::with_api_base(token, repository, api_base);
    if let Some(url) = &args.graphql_url {
        forge = forge.with_graphql_url(url.clone());
    }
    Ok(forge)
}

/// Run an async command body to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(rt.block_on(future))
}
