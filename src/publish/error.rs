use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while publishing a document or bundling its sources.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("`{name}`: Streams are not supported!")]
    StreamingUnsupported { name: String },

    #[error("failed to write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage `{stage}` failed while building `{destination}`")]
    Stage {
        stage: String,
        destination: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("no tokio runtime to spawn bundling tasks on")]
    NoRuntime,

    #[error("bundling task failed: {0}")]
    Join(String),
}
