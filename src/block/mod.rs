//! Build block recognition.
//!
//! # Module Structure
//!
//! ```text
//! block/
//! ├── kind.rs    # AssetType vocabulary and tag families
//! ├── tag.rs     # single-line <script>/<link> path extraction
//! ├── parse.rs   # start/end markers, type, destination, files
//! └── split.rs   # split markers and block regions
//! ```
//!
//! Parsing never fails: lines and fragments that do not fit the grammar are
//! dropped or passed through, with a diagnostic.

mod kind;
mod parse;
mod split;
pub mod tag;

use serde::Serialize;

pub use kind::{AssetType, Family, SCRIPT_TYPES, STYLESHEET_TYPES};
pub use parse::{block_destination, block_files, block_type, is_block, parse_block};
pub use split::{Segment, segments, split_document};

/// A parsed build block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Declared type token.
    #[serde(rename = "type")]
    pub kind: AssetType,
    /// Declared output path, verbatim (`/x.js` or `./x.js`).
    pub destination: String,
    /// Source paths in declaration order.
    pub files: Vec<String>,
}

/// Collect every block found in the given fragments, in document order.
///
/// Fragments are scanned for block regions, so a fragment holding several
/// blocks (or text around one) contributes each of them.
pub fn get_block_file_source<'a, I>(fragments: I) -> Vec<Block>
where
    I: IntoIterator<Item = &'a str>,
{
    fragments
        .into_iter()
        .flat_map(segments)
        .filter_map(|segment| match segment {
            Segment::Block(text) => parse_block(text),
            Segment::Text(_) => None,
        })
        .collect()
}
