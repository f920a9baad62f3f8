//! Asset type vocabulary for build blocks.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

/// Types whose sources are referenced with `<script src>` tags.
pub const SCRIPT_TYPES: [&str; 4] = ["js", "coffee", "typescript", "jsx"];

/// Types whose sources are referenced with `<link href>` tags.
pub const STYLESHEET_TYPES: [&str; 4] = ["css", "less", "stylus", "sass"];

/// Tag family an asset type is extracted and rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Script,
    Stylesheet,
}

impl Family {
    /// Family implied by a destination's extension (`.js` or `.css`).
    ///
    /// Used by `replace` blocks, which carry no family of their own.
    pub fn from_destination(destination: &str) -> Option<Self> {
        match Path::new(destination).extension()?.to_str()? {
            "js" => Some(Self::Script),
            "css" => Some(Self::Stylesheet),
            _ => None,
        }
    }

    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "link",
        }
    }
}

/// Declared type of a build block (`<!-- build:<type> ... -->`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetType {
    Css,
    Less,
    Stylus,
    Sass,
    Js,
    Coffee,
    Typescript,
    Jsx,
    /// Family decided by the destination extension.
    Replace,
    /// Block is dropped from the output.
    Remove,
    /// Unrecognized token, kept verbatim.
    Other(String),
}

impl AssetType {
    pub fn parse(token: &str) -> Self {
        match token {
            "css" => Self::Css,
            "less" => Self::Less,
            "stylus" => Self::Stylus,
            "sass" => Self::Sass,
            "js" => Self::Js,
            "coffee" => Self::Coffee,
            "typescript" => Self::Typescript,
            "jsx" => Self::Jsx,
            "replace" => Self::Replace,
            "remove" => Self::Remove,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Css => "css",
            Self::Less => "less",
            Self::Stylus => "stylus",
            Self::Sass => "sass",
            Self::Js => "js",
            Self::Coffee => "coffee",
            Self::Typescript => "typescript",
            Self::Jsx => "jsx",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Other(token) => token,
        }
    }

    /// Own tag family, `None` for `replace`, `remove` and unknown types.
    pub const fn family(&self) -> Option<Family> {
        match self {
            Self::Js | Self::Coffee | Self::Typescript | Self::Jsx => Some(Family::Script),
            Self::Css | Self::Less | Self::Stylus | Self::Sass => Some(Family::Stylesheet),
            _ => None,
        }
    }

    /// Whether sources of this type can be bundled into an artifact.
    pub const fn is_bundled(&self) -> bool {
        self.family().is_some()
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AssetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
