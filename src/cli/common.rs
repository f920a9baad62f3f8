//! Common utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::config::{InputSection, PublishConfig};
use crate::log;

/// Collect documents from files and directories, sorted and deduplicated.
///
/// Directories are walked recursively; files under an `exclude` directory
/// (build output) nested inside the walked path are skipped. An output
/// directory containing the walked path (in-place output) excludes nothing.
/// Explicit files are taken whatever their extension.
pub fn collect_documents(paths: &[PathBuf], input: &InputSection, exclude: &[&Path]) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let exclude: Vec<&Path> = exclude
                .iter()
                .copied()
                .filter(|dir| !path.starts_with(dir))
                .collect();
            documents.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.path())
                    .filter(|p| input.is_document(p))
                    .filter(|p| !exclude.iter().any(|dir| p.starts_with(dir))),
            );
        } else {
            log!("warning"; "{} does not exist, skipped", path.display());
        }
    }
    documents.sort();
    documents.dedup();
    documents
}

/// Documents selected by the config, excluding build output.
pub fn config_documents(config: &PublishConfig) -> Vec<PathBuf> {
    let exclude = [config.html_output(), config.publish.directory.as_path()];
    collect_documents(&config.input_paths(), &config.input, &exclude)
}

/// Path shown to the user and used as the document name.
pub fn display_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
