//! Build block recognition and parsing.
//!
//! A block is the text between a start marker and an end marker:
//!
//! ```text
//! <!-- build:css /style/build.css -->
//! <link rel="stylesheet" href="/style/origin.css">
//! <link rel="stylesheet" href="/style/complex.css">
//! <!-- endbuild -->
//! ```
//!
//! Text lacking either marker is not a block and passes through untouched.

use std::sync::LazyLock;

use regex::Regex;

use super::{AssetType, Block, Family, tag};

/// `<!-- build:<type> <destination> -->`, capturing type and destination.
pub(super) static START_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s+build:(\w+)\s+(/?\S+)\s+-->").unwrap());

/// `<!-- endbuild -->`
pub(super) static END_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*endbuild\s*-->").unwrap());

/// Check whether text carries both a start and an end marker.
pub fn is_block(text: &str) -> bool {
    START_MARKER.is_match(text) && END_MARKER.is_match(text)
}

/// Declared type token of the first start marker.
pub fn block_type(text: &str) -> Option<AssetType> {
    START_MARKER
        .captures(text)
        .map(|caps| AssetType::parse(&caps[1]))
}

/// Declared destination of the first start marker, verbatim.
pub fn block_destination(text: &str) -> Option<&str> {
    START_MARKER
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Ordered source paths referenced inside a block.
///
/// Lines that do not match the tag shape the block type expects are dropped.
pub fn block_files(text: &str) -> Vec<String> {
    let (Some(kind), Some(destination)) = (block_type(text), block_destination(text)) else {
        return Vec::new();
    };
    let Some(family) = extraction_family(&kind, destination) else {
        return Vec::new();
    };

    let body = START_MARKER.replace_all(text, "");
    let body = END_MARKER.replace_all(&body, "");

    body.split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| tag::path_for(line, family))
        .collect()
}

/// Parse a block, or `None` when the text is not a block.
pub fn parse_block(text: &str) -> Option<Block> {
    if !is_block(text) {
        return None;
    }
    Some(Block {
        kind: block_type(text)?,
        destination: block_destination(text)?.to_owned(),
        files: block_files(text),
    })
}

/// Tag family used to read source lines for a block.
fn extraction_family(kind: &AssetType, destination: &str) -> Option<Family> {
    match kind {
        AssetType::Replace => Family::from_destination(destination),
        other => other.family(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_BLOCK: &str = "<!-- build:js /script/build.js -->\n<script src=\"/script/origin.js\"></script>\n<script src=\"/script/complex.js\"></script>\n<!-- endbuild -->\n";
    const LINK_BLOCK: &str = "<!-- build:css /style/build.css -->\n<link rel=\"stylesheet\" href=\"/style/origin.css\">\n<link rel=\"stylesheet\" href=\"/style/complex.css\"><!-- endbuild -->\n";
    const PLAIN: &str = "<!DOCTYPE html><html><head lang=\"en\"><meta charset=\"UTF-8\"><title>gulp release</title></head><body></body></html>";

    #[test]
    fn test_is_block() {
        assert!(is_block(SCRIPT_BLOCK));
        assert!(!is_block(PLAIN));
        assert!(!is_block("<!-- build:js /a.js -->\n<script src=\"/b.js\"></script>"));
        assert!(!is_block("<script src=\"/b.js\"></script>\n<!-- endbuild -->"));
    }

    #[test]
    fn test_block_type() {
        for token in ["css", "less", "sass", "stylus", "js", "coffee", "typescript", "jsx"] {
            let block = format!("<!-- build:{token} /out/build -->\n<!-- endbuild -->");
            assert_eq!(block_type(&block).map(|t| t.to_string()), Some(token.into()));
        }
    }

    #[test]
    fn test_block_destination_keeps_leading_style() {
        let absolute = "<!-- build:css /style/build.css -->\n<!-- endbuild -->";
        let relative = "<!-- build:css ./style/build.css -->\n<!-- endbuild -->";
        assert_eq!(block_destination(absolute), Some("/style/build.css"));
        assert_eq!(block_destination(relative), Some("./style/build.css"));
    }

    #[test]
    fn test_files_from_script_block() {
        assert_eq!(
            block_files(SCRIPT_BLOCK),
            vec!["/script/origin.js", "/script/complex.js"]
        );
    }

    #[test]
    fn test_files_from_link_block_with_trailing_marker() {
        assert_eq!(
            block_files(LINK_BLOCK),
            vec!["/style/origin.css", "/style/complex.css"]
        );
    }

    #[test]
    fn test_files_from_mixed_blocks_follow_type() {
        let script_mixed = "<!-- build:js /script/build.js -->\n<script src=\"/script/origin.js\"></script>\n<link rel=\"stylesheet\" href=\"/style/origin.css\">\n<!-- endbuild -->\n";
        let link_mixed = "<!-- build:css /script/build.css -->\n<script src=\"/script/origin.js\"></script>\n<link rel=\"stylesheet\" href=\"/style/origin.css\">\n<!-- endbuild -->\n";
        assert_eq!(block_files(script_mixed), vec!["/script/origin.js"]);
        assert_eq!(block_files(link_mixed), vec!["/style/origin.css"]);
    }

    #[test]
    fn test_files_from_replace_block_follow_destination() {
        let replace_js = SCRIPT_BLOCK.replace("build:js", "build:replace");
        assert_eq!(
            block_files(&replace_js),
            vec!["/script/origin.js", "/script/complex.js"]
        );

        let replace_css = LINK_BLOCK.replace("build:css", "build:replace");
        assert_eq!(
            block_files(&replace_css),
            vec!["/style/origin.css", "/style/complex.css"]
        );

        let replace_unknown = "<!-- build:replace /script/build.anything -->\n<script src=\"/script/origin.js\"></script>\n<link rel=\"stylesheet\" href=\"/style/origin.css\">\n<!-- endbuild -->\n";
        assert!(block_files(replace_unknown).is_empty());
    }

    #[test]
    fn test_files_from_remove_and_unknown_blocks() {
        let remove = SCRIPT_BLOCK.replace("build:js", "build:remove");
        let anything = SCRIPT_BLOCK.replace("build:js", "build:anything");
        assert!(block_files(&remove).is_empty());
        assert!(block_files(&anything).is_empty());
    }

    #[test]
    fn test_parse_block_structure() {
        let text = "<!-- build:js /style/build.js -->\n<script src=\"/script/origin.js\"></script>\n<!-- endbuild -->";
        assert_eq!(
            parse_block(text),
            Some(Block {
                kind: AssetType::Js,
                destination: "/style/build.js".into(),
                files: vec!["/script/origin.js".into()],
            })
        );
        assert_eq!(parse_block(PLAIN), None);
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let text = "<!-- build:js /a.js -->\r\n\r\n   \r\n<script src=\"/b.js\"></script>\r\n<!-- endbuild -->";
        assert_eq!(block_files(text), vec!["/b.js"]);
    }
}
