//! Options shared by every resolution call.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::block::AssetType;
use crate::pipeline::{Notify, StageSpec};
use crate::render::Postfix;
use crate::utils::path::SourceRoot;

/// Resolution options.
///
/// Built from `publish.toml` plus CLI overrides, or directly by library
/// callers starting from [`Default`].
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Bundle block sources into artifacts, not just rewrite tags.
    pub enable_resolve: bool,
    /// Artifact output directory.
    pub directory: PathBuf,
    /// Look sources up under `fixture_root`.
    pub debug: bool,
    pub fixture_root: PathBuf,
    /// Project root that declared source paths are relative to.
    pub root: PathBuf,
    pub postfix: Postfix,
    /// Appended after every file when bundling.
    pub separator: String,
    /// Stage lists keyed by asset type token.
    pub stages: FxHashMap<String, Vec<StageSpec>>,
    pub notify: Option<Notify>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            enable_resolve: false,
            directory: PathBuf::from("./build"),
            debug: false,
            fixture_root: PathBuf::from("test/fixture"),
            root: PathBuf::new(),
            postfix: Postfix::None,
            separator: "\n".into(),
            stages: FxHashMap::default(),
            notify: None,
        }
    }
}

impl PublishOptions {
    /// Where declared paths are looked up, rebased in debug mode.
    pub fn sources(&self) -> SourceRoot {
        let root = SourceRoot::new(&self.root);
        if self.debug {
            root.with_fixture(&self.fixture_root)
        } else {
            root
        }
    }

    /// Configured stages for an asset type, empty when none.
    pub fn stages_for(&self, kind: &AssetType) -> &[StageSpec] {
        self.stages
            .get(kind.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
