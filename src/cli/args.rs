//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Read settings from this file
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output
//!
//! Most arguments fall back to the environment variables GitHub Actions
//! sets, so inside a workflow `tagtrack run` needs no flags at all.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::RefNamespace;

/// tagtrack - keep floating version tags in step with releases
#[derive(Parser, Debug)]
#[command(name = "tagtrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tagtrack was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Config file (default: $TAGTRACK_CONFIG, then .github/tagtrack.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug output (also enabled by RUNNER_DEBUG=1)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Debug output requested by flag or by a re-run with debug logging.
    pub fn debug_enabled(&self) -> bool {
        self.debug || runner_debug()
    }
}

/// Whether the Actions runner was asked for debug logging.
pub fn runner_debug() -> bool {
    std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1")
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move floating tags for the triggering event
    #[command(
        name = "run",
        long_about = "Move floating tags for the triggering event.\n\n\
            Reads the GitHub event that triggered the workflow, resolves the \
            semantic version it announces, and when that version is the newest \
            of its major line points the major tag (v1, v2, ...) at the \
            triggering commit. With --publish-latest the latest tag also moves \
            when the version is the newest overall.\n\n\
            Pre-releases and refs that are not versions leave every tag alone.",
        after_help = "\
WORKFLOW EXAMPLE:
    on:
      release:
        types: [published]
    jobs:
      tags:
        runs-on: ubuntu-latest
        permissions:
          contents: write
        steps:
          - run: tagtrack run --publish-latest

STEP OUTPUTS:
    ref_name    tag or branch the version came from
    tag         major tag moved (empty if none)
    latest      latest tag moved (empty if none)"
    )]
    Run {
        #[command(flatten)]
        event: EventArgs,

        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Show the version the triggering event announces
    #[command(
        name = "resolve",
        long_about = "Show the version the triggering event announces.\n\n\
            Classifies the event and resolves its version without contacting \
            GitHub. Useful for checking what `tagtrack run` would act on."
    )]
    Resolve {
        #[command(flatten)]
        event: EventArgs,

        /// Watch branches instead of tags for new versions
        #[arg(
            long,
            env = "INPUT_PREFER_BRANCH_RELEASES",
            value_name = "BOOL",
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        prefer_branch_releases: Option<bool>,
    },

    /// List the semantic-version refs in a namespace
    #[command(name = "refs")]
    Refs {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Namespace to list (tags or heads)
        #[arg(long, default_value = "tags")]
        namespace: RefNamespace,

        /// Sort by version instead of remote order
        #[arg(long)]
        sort: bool,
    },
}

/// Where the triggering event is described.
#[derive(Args, Debug, Clone)]
pub struct EventArgs {
    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME", value_name = "NAME")]
    pub event_name: String,

    /// Path of the event payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<PathBuf>,

    /// Commit the event is for
    #[arg(long, env = "GITHUB_SHA", value_name = "SHA")]
    pub sha: Option<String>,
}

/// How to reach the repository.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    pub repository: String,

    /// Token with contents: write permission
    #[arg(
        long,
        env = "INPUT_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    pub token: Option<String>,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// GraphQL endpoint (derived from --api-url when omitted)
    #[arg(long, env = "GITHUB_GRAPHQL_URL", value_name = "URL")]
    pub graphql_url: Option<String>,
}

/// Overrides for the settings file.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Watch branches instead of tags for new versions
    #[arg(
        long,
        env = "INPUT_PREFER_BRANCH_RELEASES",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub prefer_branch_releases: Option<bool>,

    /// Also move the latest tag
    #[arg(
        long,
        env = "INPUT_PUBLISH_LATEST_TAG",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub publish_latest: Option<bool>,

    /// Name of the latest tag
    #[arg(long, env = "INPUT_LATEST_TAG", value_name = "NAME")]
    pub latest_tag: Option<String>,
}
