//! Text helpers.

/// Remove every whitespace character.
///
/// Function postfixes go through this, and tests use it to compare output
/// that only differs in layout.
///
/// # Example
/// ```ignore
/// assert_eq!(strip_whitespace("angular.module('cloud', []);\n"), "angular.module('cloud',[]);");
/// ```
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format count with noun, handling pluralization: `1 file`, `3 files`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
