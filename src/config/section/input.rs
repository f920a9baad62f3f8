//! `[input]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [input]
//! paths = ["index.html", "pages"]   # Files or directories, walked recursively
//! output = "dist"                   # Rewritten HTML (default: publish.directory)
//! extensions = ["html", "htm"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Which documents to process and where rewritten HTML goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Empty means the project root.
    pub paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            output: None,
            extensions: vec!["html".into(), "htm".into()],
        }
    }
}

impl InputSection {
    pub const EXTENSIONS: FieldPath = FieldPath::new("input.extensions");

    /// Whether a file is a document by extension (case-insensitive).
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error(Self::EXTENSIONS, "no document extension configured");
        }
        for ext in &self.extensions {
            if ext.starts_with('.') {
                diag.error_with_hint(
                    Self::EXTENSIONS,
                    format!("`{ext}` starts with a dot"),
                    format!("write it as \"{}\"", ext.trim_start_matches('.')),
                );
            }
        }
    }
}
