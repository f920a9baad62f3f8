//! Single-line tag extraction.
//!
//! Pulls the referenced path out of one `<script src>` or `<link href>` line.
//! Attribute names and tag names match case-insensitively, extra attributes
//! may appear on either side, and values may use single or double quotes.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Family;
use crate::log;

static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<\s*script\s+.*?src\s*=\s*(?:"([^"']+?)"|'([^"']+?)').*?><\s*/\s*script\s*>"#,
    )
    .unwrap()
});

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\s*link\s+.*?href\s*=\s*(?:"([^"']+)"|'([^"']+)').*?>"#).unwrap()
});

/// Path referenced by a `<script src="...">...</script>` line.
///
/// # Example
/// ```ignore
/// assert_eq!(script_path(r#"<script src="/js/origin.js"></script>"#), Some("/js/origin.js".into()));
/// ```
pub fn script_path(line: &str) -> Option<String> {
    extract(&SCRIPT_TAG, line, Family::Script)
}

/// Path referenced by a `<link href="...">` line.
pub fn link_path(line: &str) -> Option<String> {
    extract(&LINK_TAG, line, Family::Stylesheet)
}

/// Dispatch on the tag family the enclosing block expects.
pub fn path_for(line: &str, family: Family) -> Option<String> {
    match family {
        Family::Script => script_path(line),
        Family::Stylesheet => link_path(line),
    }
}

fn extract(pattern: &Regex, line: &str, family: Family) -> Option<String> {
    let line = line.trim_start();
    match pattern.captures(line) {
        Some(caps) => Some(quoted_value(&caps)),
        None => {
            log!("parse"; "failed to resolve source path from `{}`, the block type refers {}",
                line.trim_end(), family.tag_name());
            None
        }
    }
}

/// Value of whichever quote style matched.
fn quoted_value(caps: &Captures<'_>) -> String {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}
