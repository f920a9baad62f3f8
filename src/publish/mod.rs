//! Document publishing.
//!
//! One call per HTML document:
//!
//! 1. split on `<!-- split -->` markers
//! 2. rewrite every block into a single tag (always)
//! 3. bundle block sources into artifacts (when `enable_resolve` is set)
//!
//! Bundling runs in the background; the returned [`Published`] carries the
//! [`PendingWrites`] handle.

mod error;
mod options;

use std::fmt;
use std::io::Read;
use std::sync::Arc;

pub use error::PublishError;
pub use options::PublishOptions;

use crate::block::{get_block_file_source, split_document};
use crate::pipeline::{PendingWrites, SourceDescriptor, StageRegistry, resolve_file_source};
use crate::render::resolve_source_to_destiny;
use crate::{debug, debug_do, log};

/// An input document.
pub enum Document {
    /// Fully loaded contents.
    Buffered { name: String, contents: Vec<u8> },
    /// Contents only available as a stream. Always rejected.
    Streaming {
        name: String,
        reader: Box<dyn Read + Send>,
    },
    /// No contents; passed through untouched.
    Empty { name: String },
}

impl Document {
    pub fn buffered(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self::Buffered {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Buffered { name, .. } | Self::Streaming { name, .. } | Self::Empty { name } => {
                name
            }
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered { name, contents } => f
                .debug_struct("Buffered")
                .field("name", name)
                .field("len", &contents.len())
                .finish(),
            Self::Streaming { name, .. } => {
                f.debug_struct("Streaming").field("name", name).finish()
            }
            Self::Empty { name } => f.debug_struct("Empty").field("name", name).finish(),
        }
    }
}

/// Result of publishing one document.
#[derive(Debug)]
pub struct Published {
    pub name: String,
    /// Rewritten HTML, `None` for empty documents.
    pub html: Option<String>,
    /// Artifact writes in flight, `None` when nothing was bundled.
    pub writes: Option<PendingWrites>,
}

/// Resolver bound to a set of options and stages.
#[derive(Debug, Clone)]
pub struct Publisher {
    options: PublishOptions,
    registry: Arc<StageRegistry>,
}

impl Publisher {
    pub fn new(options: PublishOptions) -> Self {
        Self {
            options,
            registry: Arc::new(StageRegistry::default()),
        }
    }

    /// Use a custom stage registry instead of the built-in stages.
    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Rewrite a document's blocks into tags, without bundling.
    pub fn rewrite(&self, html: &str) -> String {
        resolve_source_to_destiny(split_document(html), &self.options)
    }

    /// Source descriptors of every block in a document.
    pub fn file_sources(&self, html: &str) -> Vec<SourceDescriptor> {
        get_block_file_source(split_document(html))
            .into_iter()
            .map(SourceDescriptor::from)
            .collect()
    }

    /// Publish one document.
    ///
    /// Bundling needs an ambient tokio runtime when `enable_resolve` is set
    /// and the document holds bundled blocks.
    ///
    /// # Errors
    ///
    /// - [`PublishError::StreamingUnsupported`] for streaming documents
    /// - any error from [`resolve_file_source`]
    pub fn publish(&self, document: Document) -> Result<Published, PublishError> {
        let (name, contents) = match document {
            Document::Empty { name } => {
                debug!("publish"; "{} is empty, passed through", name);
                return Ok(Published {
                    name,
                    html: None,
                    writes: None,
                });
            }
            Document::Streaming { name, .. } => {
                return Err(PublishError::StreamingUnsupported { name });
            }
            Document::Buffered { name, contents } => (name, contents),
        };

        let html = String::from_utf8_lossy(&contents);
        debug_do! {
            let blocks = self.file_sources(&html);
            let names: Vec<_> = blocks.iter().map(|b| format!("{}:{}", b.kind, b.destination)).collect();
            debug!("publish"; "{}: [{}]", name, names.join(", "));
        }
        let rewritten = self.rewrite(&html);

        let writes = if self.options.enable_resolve {
            let writes = resolve_file_source(self.file_sources(&html), &self.options, &self.registry)?;
            if writes.is_none() {
                debug!("publish"; "{} has no sources to bundle", name);
            }
            writes
        } else {
            None
        };

        log!("resolve"; "{}", name);
        Ok(Published {
            name,
            html: Some(rewritten),
            writes,
        })
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(PublishOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Notify, StageSpec};
    use crate::render::Postfix;
    use crate::utils::text::strip_whitespace;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <!-- build:css /style/build.css -->
  <link rel="stylesheet" href="/style/origin.css">
  <link rel="stylesheet" href="/style/complex.css">
  <!-- endbuild -->
</head>
<body>
  <!-- build:js /script/build.js -->
  <script src="/script/origin.js"></script>
  <script src="/script/complex.js"></script>
  <!-- endbuild -->
  <!-- build:remove /script/dev.js -->
  <script src="/script/dev.js"></script>
  <!-- endbuild -->
</body>
</html>"#;

    fn project(options: impl FnOnce(&mut PublishOptions)) -> (TempDir, Publisher) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("style")).unwrap();
        fs::create_dir_all(root.join("script")).unwrap();
        fs::write(root.join("style/origin.css"), "body { margin: 0; }").unwrap();
        fs::write(root.join("style/complex.css"), "p { color: red; }").unwrap();
        fs::write(root.join("script/origin.js"), "var a = 1;").unwrap();
        fs::write(root.join("script/complex.js"), "var b = 2;").unwrap();

        let mut opts = PublishOptions {
            root: root.to_path_buf(),
            directory: root.join("build"),
            ..Default::default()
        };
        options(&mut opts);
        (dir, Publisher::new(opts))
    }

    #[test]
    fn test_rewrite_page() {
        let publisher = Publisher::new(PublishOptions {
            postfix: Postfix::from("v0.2.5"),
            ..Default::default()
        });
        let html = publisher.rewrite(PAGE);
        assert!(html.contains(r#"<link rel="stylesheet" href="/style/build.css?v0.2.5"/>"#));
        assert!(html.contains(r#"<script src="/script/build.js?v0.2.5"></script>"#));
        assert!(!html.contains("origin.js"));
        assert!(!html.contains("dev.js"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_empty_document_passes_through() {
        let published = Publisher::default()
            .publish(Document::Empty {
                name: "empty.html".into(),
            })
            .unwrap();
        assert_eq!(published.name, "empty.html");
        assert!(published.html.is_none());
        assert!(published.writes.is_none());
    }

    #[test]
    fn test_streaming_document_rejected() {
        let err = Publisher::default()
            .publish(Document::Streaming {
                name: "stream.html".into(),
                reader: Box::new(Cursor::new(PAGE.as_bytes().to_vec())),
            })
            .unwrap_err();
        assert!(matches!(err, PublishError::StreamingUnsupported { ref name } if name == "stream.html"));
    }

    #[test]
    fn test_resolve_disabled_writes_nothing() {
        let (dir, publisher) = project(|_| {});
        let published = publisher.publish(Document::buffered("index.html", PAGE)).unwrap();
        assert!(published.writes.is_none());
        assert!(published.html.unwrap().contains("/script/build.js"));
        assert!(!dir.path().join("build").exists());
    }

    #[test]
    fn test_file_sources() {
        let sources = Publisher::default().file_sources(PAGE);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].destination, "/style/build.css");
        assert_eq!(sources[1].files, vec!["/script/origin.js", "/script/complex.js"]);
        assert!(sources[2].files.is_empty());
    }

    #[tokio::test]
    async fn test_publish_bundles_sources() {
        let (dir, publisher) = project(|o| o.enable_resolve = true);
        let published = publisher.publish(Document::buffered("index.html", PAGE)).unwrap();

        let writes = published.writes.unwrap();
        assert_eq!(writes.len(), 2);
        let outcomes = writes.wait().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));

        let script = fs::read_to_string(dir.path().join("build/script/build.js")).unwrap();
        assert_eq!(strip_whitespace(&script), "vara=1;varb=2;");
        let style = fs::read_to_string(dir.path().join("build/style/build.css")).unwrap();
        assert_eq!(style, "body { margin: 0; }\np { color: red; }\n");
    }

    #[tokio::test]
    async fn test_publish_with_stages_and_notify() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (dir, publisher) = project(|o| {
            o.enable_resolve = true;
            o.stages.insert("css".into(), vec![StageSpec::new("minify-css")]);
            o.notify = Some(Notify::new(tx));
        });
        let published = publisher.publish(Document::buffered("index.html", PAGE)).unwrap();
        published.writes.unwrap().wait().await;
        drop(publisher);

        let mut events = 0;
        while let Some(event) = rx.recv().await {
            assert_eq!(event.event, "end");
            events += 1;
        }
        assert_eq!(events, 2);

        let style = fs::read_to_string(dir.path().join("build/style/build.css")).unwrap();
        assert_eq!(style, "body{margin:0}\np{color:red}\n");
    }

    #[tokio::test]
    async fn test_publish_with_custom_registry() {
        let (dir, publisher) = project(|o| {
            o.enable_resolve = true;
            o.stages.insert("js".into(), vec![StageSpec::new("upper")]);
        });
        let mut registry = StageRegistry::empty();
        registry.register_fn("upper", |input, _, _| Ok(input.to_ascii_uppercase()));
        let publisher = publisher.with_registry(registry);

        let published = publisher.publish(Document::buffered("index.html", PAGE)).unwrap();
        published.writes.unwrap().wait().await;
        let script = fs::read_to_string(dir.path().join("build/script/build.js")).unwrap();
        assert_eq!(script, "VAR A = 1;\nVAR B = 2;\n");

        // built-in stages are gone from a custom registry
        let (_dir, publisher) = project(|o| {
            o.enable_resolve = true;
            o.stages.insert("css".into(), vec![StageSpec::new("minify-css")]);
        });
        let err = publisher
            .with_registry(StageRegistry::empty())
            .publish(Document::buffered("index.html", PAGE))
            .unwrap_err();
        assert!(matches!(err, PublishError::UnknownStage(ref name) if name == "minify-css"));
    }

    #[test]
    fn test_md5_postfix_matches_sources() {
        let (_dir, publisher) = project(|o| o.postfix = Postfix::Md5);
        let html = publisher.rewrite(PAGE);
        // md5("var a = 1;var b = 2;")
        let digest = {
            use md5::{Digest, Md5};
            hex::encode(Md5::digest(b"var a = 1;var b = 2;"))
        };
        assert!(html.contains(&format!("/script/build.js?{digest}")));
    }
}
