//! refs command - List the semantic-version refs in a namespace
//!
//! Drives the same enumerator `run` uses, one page at a time, so it is
//! also a quick way to check a token and repository.

use anyhow::{Context as _, Result};
use semver::Version;

use super::{block_on, github_forge, load_settings, reporter};
use crate::cli::args::RemoteArgs;
use crate::core::config::Overrides;
use crate::core::types::{Oid, RefNamespace};
use crate::core::version;
use crate::engine::enumerate::RefEnumerator;
use crate::engine::Context;
use crate::forge::{Forge, ForgeError};
use crate::ui::output::format_list;

/// List semver refs, in remote order unless `sort` is set.
///
/// Pages are sized by the configured `page_size`; the namespace comes from
/// the command line only.
pub fn refs(
    ctx: &Context,
    remote: &RemoteArgs,
    namespace: RefNamespace,
    sort: bool,
) -> Result<()> {
    let reporter = reporter(ctx);
    let settings = load_settings(ctx, &reporter, &Overrides::default())?;
    let forge = github_forge(remote)?;

    let mut entries = block_on(list(&forge, namespace, settings.page_size))?.with_context(|| {
        format!(
            "Failed to list refs/{}/ in {}",
            namespace,
            forge.repository()
        )
    })?;
    if sort {
        entries.sort_by(|a, b| version::precedence(&a.0, &b.0));
    }

    if entries.is_empty() {
        reporter.notice(format!("No semantic-version refs under refs/{}/", namespace));
        return Ok(());
    }
    if !ctx.quiet {
        let lines: Vec<String> = entries
            .iter()
            .map(|(version, oid)| format!("{:<20} {}", version.to_string(), oid.short(7)))
            .collect();
        println!("{}", format_list(&lines, ""));
    }
    Ok(())
}

async fn list(
    forge: &dyn Forge,
    namespace: RefNamespace,
    page_size: u32,
) -> Result<Vec<(Version, Oid)>, ForgeError> {
    let mut refs = RefEnumerator::new(forge, namespace).with_page_size(page_size);
    let mut all = Vec::new();
    while let Some(batch) = refs.next_batch().await? {
        tracing::debug!(
            page = refs.pages_fetched(),
            refs = batch.len(),
            "fetched page"
        );
        all.extend(batch);
    }
    Ok(all)
}
