//! Document splitting.
//!
//! Two levels of splitting:
//! - [`split_document`]: literal split on `<!-- split -->` markers
//! - [`segments`]: block regions (start..end marker pairs) inside one fragment

use std::sync::LazyLock;

use regex::Regex;

use super::parse::{END_MARKER, START_MARKER};
use crate::log;

/// `<!-- split -->`
static SPLIT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s+split\s+-->").unwrap());

/// Split a document on split markers.
///
/// No nesting, no escaping. A document without markers yields one fragment
/// equal to the whole input.
pub fn split_document(document: &str) -> Vec<&str> {
    SPLIT_MARKER.split(document).collect()
}

/// A piece of a fragment: plain text or one complete block region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Block(&'a str),
}

/// Scan a fragment for start/end marker pairs.
///
/// Each region runs from a start marker through the first end marker after
/// it. A start marker with no end marker after it leaves the remainder as
/// plain text. Empty text pieces are not emitted.
pub fn segments(fragment: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;

    while let Some(start) = START_MARKER.find_at(fragment, cursor) {
        let Some(end) = END_MARKER.find_at(fragment, start.end()) else {
            log!("parse"; "build block `{}` has no matching endbuild, left as is", start.as_str());
            break;
        };
        if start.start() > cursor {
            out.push(Segment::Text(&fragment[cursor..start.start()]));
        }
        out.push(Segment::Block(&fragment[start.start()..end.end()]));
        cursor = end.end();
    }

    if cursor < fragment.len() {
        out.push(Segment::Text(&fragment[cursor..]));
    }
    out
}
