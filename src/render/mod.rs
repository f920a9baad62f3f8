//! Tag generation.
//!
//! Replaces each build block with a single tag referencing its bundled
//! destination:
//!
//! ```text
//! <!-- build:js /script/build.js -->            <script src="/script/build.js?v1"></script>
//! <script src="/script/a.js"></script>     =>
//! <script src="/script/b.js"></script>
//! <!-- endbuild -->
//! ```

mod postfix;

pub use postfix::{Postfix, PostfixFn, concat_existing, resolve_postfix};

use crate::block::{AssetType, Family, Segment, block_destination, block_type, is_block, segments};
use crate::publish::PublishOptions;
use crate::{debug, log};

/// Outcome of rendering one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<'a> {
    /// Not a block, emitted verbatim.
    Passthrough(&'a str),
    /// The replacement tag.
    Tag(String),
    /// A `remove` block: emits nothing.
    Removed,
    /// A block whose type has no tag form.
    Unresolved,
}

impl Rendered<'_> {
    /// Text written to the output document.
    pub fn as_output(&self) -> &str {
        match self {
            Self::Passthrough(text) => text,
            Self::Tag(tag) => tag,
            Self::Removed | Self::Unresolved => "",
        }
    }
}

/// `<script src="{destination}{postfix}"></script>`
pub fn script_tag(destination: &str, postfix: &str) -> String {
    format!(r#"<script src="{destination}{postfix}"></script>"#)
}

/// `<link rel="stylesheet" href="{destination}{postfix}"/>`
pub fn link_tag(destination: &str, postfix: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{destination}{postfix}"/>"#)
}

/// Render one fragment.
///
/// Non-block fragments come back unchanged whatever the options.
pub fn generate_tags<'a>(fragment: &'a str, options: &PublishOptions) -> Rendered<'a> {
    if !is_block(fragment) {
        return Rendered::Passthrough(fragment);
    }
    let (Some(kind), Some(destination)) = (block_type(fragment), block_destination(fragment))
    else {
        return Rendered::Unresolved;
    };

    let family = match &kind {
        AssetType::Remove => return Rendered::Removed,
        AssetType::Replace => Family::from_destination(destination),
        other => other.family(),
    };
    let Some(family) = family else {
        return Rendered::Unresolved;
    };

    let postfix = resolve_postfix(&options.postfix, fragment, &options.sources());
    Rendered::Tag(match family {
        Family::Script => script_tag(destination, &postfix),
        Family::Stylesheet => link_tag(destination, &postfix),
    })
}

/// Rewrite every fragment and join the results with `"\n"`.
///
/// Block regions are located inside each fragment, so text around a block
/// survives and one fragment may hold several blocks.
pub fn resolve_source_to_destiny<'a, I>(fragments: I, options: &PublishOptions) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let rendered: Vec<String> = fragments
        .into_iter()
        .map(|fragment| render_fragment(fragment, options))
        .collect();
    rendered.join("\n")
}

fn render_fragment(fragment: &str, options: &PublishOptions) -> String {
    let mut out = String::with_capacity(fragment.len());
    for segment in segments(fragment) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Block(block) => {
                let rendered = generate_tags(block, options);
                match &rendered {
                    Rendered::Unresolved => {
                        let kind = block_type(block).map(|k| k.to_string()).unwrap_or_default();
                        log!("warning"; "block `build:{}` has no tag form, dropped from output", kind);
                    }
                    Rendered::Removed => debug!("resolve"; "removed block"),
                    _ => {}
                }
                out.push_str(rendered.as_output());
            }
        }
    }
    out
}
