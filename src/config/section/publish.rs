//! `[publish]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [publish]
//! enable_resolve = true        # Bundle block sources into artifacts
//! directory = "./build"        # Artifact output directory
//! debug = false                # Look sources up under fixture_root
//! fixture_root = "test/fixture"
//! postfix = "md5"              # "md5", a fixed tag such as "v0.2.5", or omitted
//! separator = "\n"             # Appended after every bundled file
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSection {
    pub enable_resolve: bool,

    /// Artifact output directory, relative to the project root.
    pub directory: PathBuf,

    pub debug: bool,

    /// Source root used when `debug` is set, relative to the project root.
    pub fixture_root: PathBuf,

    /// Any TOML value; only strings produce a postfix.
    pub postfix: Option<toml::Value>,

    pub separator: String,
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            enable_resolve: false,
            directory: PathBuf::from("./build"),
            debug: false,
            fixture_root: PathBuf::from("test/fixture"),
            postfix: None,
            separator: "\n".into(),
        }
    }
}

impl PublishSection {
    pub const DIRECTORY: FieldPath = FieldPath::new("publish.directory");
    pub const FIXTURE_ROOT: FieldPath = FieldPath::new("publish.fixture_root");
    pub const POSTFIX: FieldPath = FieldPath::new("publish.postfix");

    /// Checks on raw values, before paths are made absolute.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        if self.directory.as_os_str().is_empty() {
            diag.error(Self::DIRECTORY, "must not be empty");
        }
        if self.fixture_root.is_absolute() {
            diag.error_with_hint(
                Self::FIXTURE_ROOT,
                "must be relative to the project root",
                "use a path like \"test/fixture\"",
            );
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(value) = &self.postfix
            && !value.is_str()
        {
            diag.warn(
                Self::POSTFIX,
                format!("a {} is not a supported postfix, none will be appended", value.type_str()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_publish_defaults() {
        let config = test_parse_config("");
        assert!(!config.publish.enable_resolve);
        assert!(!config.publish.debug);
        assert_eq!(config.publish.directory, Path::new("./build"));
        assert_eq!(config.publish.fixture_root, Path::new("test/fixture"));
        assert_eq!(config.publish.separator, "\n");
        assert!(config.publish.postfix.is_none());
    }

    #[test]
    fn test_publish_overrides() {
        let config = test_parse_config(
            "[publish]\nenable_resolve = true\ndirectory = \"dist\"\npostfix = \"v0.2.5\"\nseparator = \";\\n\"",
        );
        assert!(config.publish.enable_resolve);
        assert_eq!(config.publish.directory, Path::new("dist"));
        assert_eq!(
            config.publish.postfix.as_ref().and_then(toml::Value::as_str),
            Some("v0.2.5")
        );
        assert_eq!(config.publish.separator, ";\n");
    }

    #[test]
    fn test_non_string_postfix_warns() {
        let config = test_parse_config("[publish]\npostfix = 42");
        let mut diag = ConfigDiagnostics::new();
        config.publish.validate(&mut diag);
        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_absolute_fixture_root_rejected() {
        let config = test_parse_config("[publish]\nfixture_root = \"/abs/fixture\"");
        let mut diag = ConfigDiagnostics::new();
        config.publish.validate_paths(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
