//! Pipeline stages and their registry.
//!
//! A stage is a named transformation over one source file's bytes. Stage
//! lists are configured per asset type:
//!
//! ```toml
//! [stages]
//! coffee = [{ name = "command", command = ["coffee", "-sc"] }, { name = "minify-js" }]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::transform::{Banner, CommandStage, MinifyCss, MinifyJs};

/// One configured stage: a registry name plus free-form settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    #[serde(flatten)]
    pub config: toml::Table,
}

impl StageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: toml::Table::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.config.insert(key.to_owned(), value.into());
        self
    }
}

/// What a stage knows about the file it is transforming.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Resolved source path.
    pub source: PathBuf,
    /// Project root, used as working directory for external commands.
    pub root: PathBuf,
}

/// A byte transformation applied to each source file.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, input: Vec<u8>, config: &toml::Table, ctx: &StageContext) -> Result<Vec<u8>>;

    /// Check a stage's settings ahead of time. Messages are reported as
    /// config errors.
    fn validate(&self, _config: &toml::Table) -> Vec<String> {
        Vec::new()
    }
}

type StageFn = dyn Fn(Vec<u8>, &toml::Table, &StageContext) -> Result<Vec<u8>> + Send + Sync;

/// Adapter turning a closure into a [`Transform`].
struct FnTransform {
    name: &'static str,
    f: Box<StageFn>,
}

impl Transform for FnTransform {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, input: Vec<u8>, config: &toml::Table, ctx: &StageContext) -> Result<Vec<u8>> {
        (self.f)(input, config, ctx)
    }
}

/// Name → stage lookup shared by every pipeline run.
#[derive(Clone)]
pub struct StageRegistry {
    stages: FxHashMap<&'static str, Arc<dyn Transform>>,
}

impl StageRegistry {
    /// Registry without any stage.
    pub fn empty() -> Self {
        Self {
            stages: FxHashMap::default(),
        }
    }

    /// Registry holding `minify-js`, `minify-css`, `command` and `banner`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(MinifyJs);
        registry.register(MinifyCss);
        registry.register(CommandStage);
        registry.register(Banner);
        registry
    }

    /// Add or replace a stage under its own name.
    pub fn register(&mut self, stage: impl Transform + 'static) {
        self.stages.insert(stage.name(), Arc::new(stage));
    }

    /// Add or replace a closure stage.
    pub fn register_fn<F>(&mut self, name: &'static str, f: F)
    where
        F: Fn(Vec<u8>, &toml::Table, &StageContext) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.register(FnTransform {
            name,
            f: Box::new(f),
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Transform>> {
        self.stages.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.stages.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StageContext {
        StageContext {
            source: PathBuf::from("a.js"),
            root: PathBuf::from("."),
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = StageRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["banner", "command", "minify-css", "minify-js"]
        );
        assert!(StageRegistry::empty().names().is_empty());
    }

    #[test]
    fn test_register_fn() {
        let mut registry = StageRegistry::empty();
        registry.register_fn("upper", |input, _, _| Ok(input.to_ascii_uppercase()));

        let stage = registry.get("upper").unwrap();
        let out = stage.apply(b"abc".to_vec(), &toml::Table::new(), &ctx()).unwrap();
        assert_eq!(out, b"ABC");
        assert!(registry.get("lower").is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = StageRegistry::with_builtins();
        registry.register_fn("banner", |_, _, _| Ok(b"x".to_vec()));
        let out = registry
            .get("banner")
            .unwrap()
            .apply(Vec::new(), &toml::Table::new(), &ctx())
            .unwrap();
        assert_eq!(out, b"x");
        assert_eq!(registry.names().len(), 4);
    }

    #[test]
    fn test_stage_spec_flattens_config() {
        let spec: StageSpec = toml::from_str("name = \"banner\"\ntext = \"/* hi */\"").unwrap();
        assert_eq!(spec.name, "banner");
        assert_eq!(spec.config.get("text").and_then(|v| v.as_str()), Some("/* hi */"));
        assert_eq!(spec, StageSpec::new("banner").with("text", "/* hi */"));
    }
}
