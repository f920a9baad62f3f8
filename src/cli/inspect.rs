//! `inspect` command: print the build blocks of documents as JSON.
//!
//! ```json
//! [
//!   {
//!     "path": "index.html",
//!     "blocks": [
//!       { "type": "js", "destination": "/script/build.js", "files": ["/script/a.js"] }
//!     ]
//!   }
//! ]
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::common::{config_documents, display_name};
use crate::block::{Block, get_block_file_source, split_document};
use crate::config::PublishConfig;

/// Blocks found in one document.
#[derive(Debug, Serialize)]
pub struct DocumentBlocks {
    pub path: String,
    pub blocks: Vec<Block>,
}

/// Inspect a single document.
pub fn inspect_document(path: &Path, root: &Path) -> Result<DocumentBlocks> {
    let contents =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let html = String::from_utf8_lossy(&contents);
    Ok(DocumentBlocks {
        path: display_name(path, root),
        blocks: get_block_file_source(split_document(&html)),
    })
}

/// Run the `inspect` command, writing JSON to stdout.
pub fn run_inspect(config: &PublishConfig, pretty: bool) -> Result<()> {
    let results = config_documents(config)
        .iter()
        .map(|path| inspect_document(path, &config.root))
        .collect::<Result<Vec<_>>>()?;

    let json = if pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}
