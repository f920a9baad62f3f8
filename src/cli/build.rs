//! `build` command.
//!
//! Phases:
//! - **Collect** - gather HTML documents from the configured paths
//! - **Publish** - rewrite each document, spawning artifact bundling
//! - **Write** - store rewritten HTML under the output directory
//! - **Finalize** - wait for every artifact, report failures

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::common::{config_documents, display_name};
use crate::config::PublishConfig;
use crate::pipeline::PendingWrites;
use crate::publish::{Document, Publisher};
use crate::utils::text::plural_count;
use crate::{debug, log};

/// Counts reported at the end of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub documents: usize,
    pub artifacts: usize,
    pub failures: usize,
}

/// Run the build for a loaded config.
pub fn build_documents(config: &PublishConfig) -> Result<BuildSummary> {
    let documents = config_documents(config);
    if documents.is_empty() {
        log!("warning"; "no documents found");
        return Ok(BuildSummary::default());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let publisher = Publisher::new(config.to_options());

    // Documents are read and written on this thread; bundling tasks spawned
    // while publishing run on the runtime's workers.
    let mut pending = PendingWrites::default();
    {
        let _guard = runtime.enter();
        for path in &documents {
            if let Some(writes) = publish_document(&publisher, config, path)? {
                pending.extend(writes);
            }
        }
    }
    if !pending.is_empty() {
        debug!("build"; "waiting for {}", plural_count(pending.len(), "artifact"));
    }
    let summary = runtime.block_on(finalize(documents.len(), pending));

    log!(
        "publish";
        "{}, {}",
        plural_count(summary.documents, "document"),
        plural_count(summary.artifacts, "artifact")
    );
    if summary.failures > 0 {
        bail!("{} failed", plural_count(summary.failures, "artifact"));
    }
    Ok(summary)
}

/// Publish one file and write its rewritten HTML.
fn publish_document(
    publisher: &Publisher,
    config: &PublishConfig,
    path: &Path,
) -> Result<Option<PendingWrites>> {
    let name = display_name(path, &config.root);
    let contents = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = if contents.is_empty() {
        Document::Empty { name }
    } else {
        Document::Buffered { name, contents }
    };

    let published = publisher.publish(document)?;
    let target = html_target(config, path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&target, published.html.unwrap_or_default())
        .with_context(|| format!("Failed to write {}", target.display()))?;
    debug!("build"; "{} -> {}", published.name, target.display());

    Ok(published.writes)
}

/// Output location of a rewritten document, mirroring its place under root.
fn html_target(config: &PublishConfig, path: &Path) -> PathBuf {
    let relative = path
        .strip_prefix(&config.root)
        .ok()
        .map(Path::to_path_buf)
        .or_else(|| path.file_name().map(PathBuf::from))
        .unwrap_or_default();
    config.html_output().join(relative)
}

async fn finalize(documents: usize, pending: PendingWrites) -> BuildSummary {
    let mut summary = BuildSummary {
        documents,
        ..Default::default()
    };
    for outcome in pending.wait().await {
        match outcome.result {
            Ok(_) => summary.artifacts += 1,
            Err(err) => {
                summary.failures += 1;
                log!("error"; "{}: {:#}", outcome.destination, anyhow::Error::from(err));
            }
        }
    }
    summary
}
