//! Cache-busting postfixes.
//!
//! A postfix is appended to a rewritten tag's URL as a query string:
//!
//! | Postfix           | Result                                       |
//! |-------------------|----------------------------------------------|
//! | none / `""`       | nothing                                      |
//! | `"v0.2.5"`        | `?v0.2.5`                                    |
//! | `"md5"`           | `?` + MD5 hex of the block's sources         |
//! | custom function   | `?` + function(sources), whitespace stripped |
//! | anything else     | nothing                                      |

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use md5::{Digest, Md5};

use crate::block::block_files;
use crate::log;
use crate::utils::path::SourceRoot;
use crate::utils::text::strip_whitespace;

/// Caller-supplied postfix over the concatenated source bytes.
pub type PostfixFn = Arc<dyn Fn(&[u8]) -> String + Send + Sync>;

/// Postfix policy for rewritten tags.
#[derive(Clone, Default)]
pub enum Postfix {
    #[default]
    None,
    /// Fixed version tag.
    Fixed(String),
    /// MD5 digest of the block's sources.
    Md5,
    Custom(PostfixFn),
    /// A configured value of a kind postfixes cannot be built from.
    Unsupported,
}

impl Postfix {
    pub fn custom(f: impl Fn(&[u8]) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Build from a config value: strings map as in `From<&str>`, any other
    /// TOML kind is unsupported.
    pub fn from_toml(value: Option<&toml::Value>) -> Self {
        match value {
            None => Self::None,
            Some(toml::Value::String(s)) => Self::from(s.as_str()),
            Some(_) => Self::Unsupported,
        }
    }
}

impl From<&str> for Postfix {
    fn from(value: &str) -> Self {
        match value {
            "" => Self::None,
            "md5" => Self::Md5,
            other => Self::Fixed(other.to_owned()),
        }
    }
}

impl fmt::Debug for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Fixed(s) => f.debug_tuple("Fixed").field(s).finish(),
            Self::Md5 => f.write_str("Md5"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Resolve the query suffix for a block, including the leading `?`.
///
/// Returns an empty string when no suffix applies.
pub fn resolve_postfix(postfix: &Postfix, block: &str, sources: &SourceRoot) -> String {
    match postfix {
        Postfix::None | Postfix::Unsupported => String::new(),
        Postfix::Fixed(tag) => format!("?{tag}"),
        Postfix::Md5 => {
            let content = read_block_sources(block, sources);
            format!("?{}", hex::encode(Md5::digest(&content)))
        }
        Postfix::Custom(f) => {
            let content = read_block_sources(block, sources);
            format!("?{}", strip_whitespace(&f(&content)))
        }
    }
}

/// Concatenated bytes of a block's sources, in declaration order.
fn read_block_sources(block: &str, sources: &SourceRoot) -> Vec<u8> {
    concat_existing(&sources.resolve_all(&block_files(block)))
}

/// Concatenate file contents, skipping files that cannot be read.
pub fn concat_existing(paths: &[PathBuf]) -> Vec<u8> {
    let mut content = Vec::new();
    for path in paths {
        match fs::read(path) {
            Ok(bytes) => content.extend_from_slice(&bytes),
            Err(err) => {
                log!("warning"; "the file {} cannot be read ({}), the postfix may deviate",
                    path.display(), err);
            }
        }
    }
    content
}
