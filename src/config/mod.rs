//! Project configuration for `publish.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── publish    # [publish]
//! │   ├── input      # [input]
//! │   └── stages     # [stages]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PublishConfig (this file)
//! ```
//!
//! Values are layered: built-in defaults, then `publish.toml`, then CLI
//! flags. The file is optional; without one the current directory is the
//! project root.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_path};

pub use section::{InputSection, PublishSection, StagesSection};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::pipeline::StageRegistry;
use crate::publish::PublishOptions;
use crate::render::Postfix;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing publish.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file or cwd
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub publish: PublishSection,

    #[serde(default)]
    pub input: InputSection,

    #[serde(default)]
    pub stages: StagesSection,
}

impl PublishConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; the project root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.validate_paths()?;
        config.finalize(cli, &cwd);
        config.validate(&StageRegistry::default())?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Set root, apply CLI overrides and make paths absolute.
    fn finalize(&mut self, cli: &Cli, cwd: &Path) {
        self.root = self
            .config_path
            .parent()
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

        if let Commands::Build { build_args, .. } = &cli.command {
            self.apply_build_args(build_args);
        }
        self.normalize_paths();

        // CLI paths are relative to where the command runs.
        if !cli.paths().is_empty() {
            self.input.paths = cli.paths().iter().map(|p| resolve_path(p, cwd)).collect();
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.publish.enable_resolve, args.resolve.as_ref());
        Self::update_option(&mut self.publish.debug, args.debug.as_ref());
        Self::update_option(&mut self.publish.directory, args.directory.as_ref());
        if let Some(output) = &args.output {
            self.input.output = Some(output.clone());
        }
        if let Some(postfix) = &args.postfix {
            self.publish.postfix = Some(toml::Value::String(postfix.clone()));
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self) {
        let root = crate::utils::path::normalize_path(&self.root);
        self.root = root.clone();

        self.publish.directory = resolve_path(&self.publish.directory, &root);
        if let Some(output) = self.input.output.take() {
            self.input.output = Some(resolve_path(&output, &root));
        }
        self.input.paths = self
            .input
            .paths
            .iter()
            .map(|p| resolve_path(p, &root))
            .collect();
        // fixture_root stays relative; sources are looked up as root/fixture/path.
    }

    /// Directory receiving rewritten HTML.
    pub fn html_output(&self) -> &Path {
        self.input.output.as_deref().unwrap_or(&self.publish.directory)
    }

    /// Documents to process; the project root when none are configured.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        if self.input.paths.is_empty() {
            vec![self.root.clone()]
        } else {
            self.input.paths.clone()
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Checks that must run before paths are made absolute.
    fn validate_paths(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.publish.validate_paths(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate configuration against the stages that can run.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, registry: &StageRegistry) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.publish.validate(&mut diag);
        self.input.validate(&mut diag);
        self.stages.validate(registry, &mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Resolution options for the library entry points.
    pub fn to_options(&self) -> PublishOptions {
        PublishOptions {
            enable_resolve: self.publish.enable_resolve,
            directory: self.publish.directory.clone(),
            debug: self.publish.debug,
            fixture_root: self.publish.fixture_root.clone(),
            root: self.root.clone(),
            postfix: Postfix::from_toml(self.publish.postfix.as_ref()),
            separator: self.publish.separator.clone(),
            stages: self.stages.to_map(),
            notify: None,
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PublishConfig {
    let (parsed, ignored) = PublishConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
