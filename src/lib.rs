//! HTML build-block resolver.
//!
//! Rewrites `<!-- build:<type> <destination> -->` blocks in HTML documents
//! into single `<script>`/`<link>` tags and bundles the sources they list
//! into the destination.
//!
//! ```ignore
//! use html_publish::publish::{Document, PublishOptions, Publisher};
//!
//! let publisher = Publisher::new(PublishOptions {
//!     enable_resolve: true,
//!     postfix: "md5".into(),
//!     ..Default::default()
//! });
//! let published = publisher.publish(Document::buffered("index.html", html))?;
//! if let Some(writes) = published.writes {
//!     writes.wait().await;
//! }
//! ```

pub mod block;
pub mod cli;
pub mod config;
pub mod logger;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod utils;
