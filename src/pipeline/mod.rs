//! Source pipeline: bundle each block's sources into its destination.
//!
//! ```text
//! SourceDescriptor ──► read files ──► stages (per file) ──► concat ──► {directory}/{destination}
//!                      (concurrent)    (blocking pool)      (declared order)
//! ```
//!
//! Descriptors run as independent tasks on the ambient tokio runtime.
//! [`resolve_file_source`] returns once they are spawned; the returned
//! [`PendingWrites`] can be awaited for the outcomes.

pub mod stage;
pub mod transform;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::block::{AssetType, Block};
use crate::publish::{PublishError, PublishOptions};
use crate::utils::path::artifact_path;
use crate::{debug, log};

pub use stage::{StageContext, StageRegistry, StageSpec, Transform};

/// What the pipeline needs to know about one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: AssetType,
    pub destination: String,
    pub files: Vec<String>,
}

impl SourceDescriptor {
    /// Bundled type with at least one file and a destination.
    pub fn is_eligible(&self) -> bool {
        self.kind.is_bundled() && !self.files.is_empty() && !self.destination.is_empty()
    }
}

impl From<Block> for SourceDescriptor {
    fn from(block: Block) -> Self {
        Self {
            kind: block.kind,
            destination: block.destination,
            files: block.files,
        }
    }
}

/// Completion notice sent once per descriptor.
#[derive(Debug, Clone)]
pub struct WriteEvent {
    /// Label configured on the notifier.
    pub event: String,
    pub destination: String,
    /// Written artifact path, or the failure message.
    pub result: Result<PathBuf, String>,
}

/// Channel receiving a [`WriteEvent`] per finished descriptor.
#[derive(Debug, Clone)]
pub struct Notify {
    pub sender: mpsc::UnboundedSender<WriteEvent>,
    pub event: String,
}

impl Notify {
    pub fn new(sender: mpsc::UnboundedSender<WriteEvent>) -> Self {
        Self {
            sender,
            event: "end".into(),
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    fn send(&self, destination: &str, result: &Result<PathBuf, PublishError>) {
        let event = WriteEvent {
            event: self.event.clone(),
            destination: destination.to_owned(),
            result: result.as_ref().cloned().map_err(ToString::to_string),
        };
        // Receiver may be gone; nothing left to tell then.
        let _ = self.sender.send(event);
    }
}

/// Final state of one descriptor.
#[derive(Debug)]
pub struct WriteOutcome {
    pub destination: String,
    pub result: Result<PathBuf, PublishError>,
}

/// Descriptor tasks still in flight.
#[derive(Debug, Default)]
pub struct PendingWrites {
    tasks: Vec<(String, JoinHandle<Result<PathBuf, PublishError>>)>,
}

impl PendingWrites {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every descriptor, in spawn order.
    pub async fn wait(self) -> Vec<WriteOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for (destination, task) in self.tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(PublishError::Join(err.to_string())),
            };
            outcomes.push(WriteOutcome {
                destination,
                result,
            });
        }
        outcomes
    }

    /// Merge another batch into this one.
    pub fn extend(&mut self, other: Self) {
        self.tasks.extend(other.tasks);
    }
}

/// A configured stage bound to its implementation.
#[derive(Clone)]
struct BoundStage {
    spec: StageSpec,
    transform: Arc<dyn Transform>,
}

/// Everything one descriptor task owns.
struct Job {
    destination: String,
    sources: Vec<PathBuf>,
    stages: Arc<[BoundStage]>,
    separator: Vec<u8>,
    output: PathBuf,
    root: PathBuf,
}

/// Spawn a bundling task per eligible descriptor.
///
/// Returns `Ok(None)` without touching the filesystem when no descriptor is
/// eligible (bundled type, non-empty files, non-empty destination).
///
/// # Errors
///
/// - [`PublishError::UnknownStage`] when a configured stage is not registered
/// - [`PublishError::NoRuntime`] when called outside a tokio runtime
pub fn resolve_file_source(
    sources: Vec<SourceDescriptor>,
    options: &PublishOptions,
    registry: &StageRegistry,
) -> Result<Option<PendingWrites>, PublishError> {
    let eligible: Vec<_> = sources.into_iter().filter(SourceDescriptor::is_eligible).collect();
    if eligible.is_empty() {
        debug!("pipeline"; "no bundled sources to resolve");
        return Ok(None);
    }

    let jobs = eligible
        .into_iter()
        .map(|descriptor| build_job(descriptor, options, registry))
        .collect::<Result<Vec<_>, _>>()?;

    let handle = Handle::try_current().map_err(|_| PublishError::NoRuntime)?;
    let tasks = jobs
        .into_iter()
        .map(|job| {
            let destination = job.destination.clone();
            let notify = options.notify.clone();
            let task = handle.spawn(async move {
                let destination = job.destination.clone();
                let result = run_job(job).await;
                if let Some(notify) = notify {
                    notify.send(&destination, &result);
                }
                result
            });
            (destination, task)
        })
        .collect();

    Ok(Some(PendingWrites { tasks }))
}

fn build_job(
    descriptor: SourceDescriptor,
    options: &PublishOptions,
    registry: &StageRegistry,
) -> Result<Job, PublishError> {
    let stages = options
        .stages_for(&descriptor.kind)
        .iter()
        .map(|spec| {
            registry
                .get(&spec.name)
                .map(|transform| BoundStage {
                    spec: spec.clone(),
                    transform,
                })
                .ok_or_else(|| PublishError::UnknownStage(spec.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Job {
        output: artifact_path(&options.directory, &descriptor.destination),
        sources: options.sources().resolve_all(&descriptor.files),
        destination: descriptor.destination,
        stages: stages.into(),
        separator: options.separator.clone().into_bytes(),
        root: options.root.clone(),
    })
}

async fn run_job(job: Job) -> Result<PathBuf, PublishError> {
    let Job {
        destination,
        sources,
        stages,
        separator,
        output,
        root,
    } = job;

    // Reads and stages overlap across files; the bundle keeps declared order.
    let files: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let stages = Arc::clone(&stages);
            let ctx = StageContext {
                source,
                root: root.clone(),
            };
            let destination = destination.clone();
            tokio::spawn(process_file(ctx, stages, destination))
        })
        .collect();

    let mut contents = Vec::with_capacity(files.len());
    for file in files {
        let processed = file.await.map_err(|err| PublishError::Join(err.to_string()))??;
        contents.extend(processed);
    }

    let bundle = concat(contents, &separator);
    write_artifact(&output, &bundle).await?;
    log!("publish"; "{} ({} bytes)", output.display(), bundle.len());
    Ok(output)
}

/// Read one source and run it through the stages. `None` when unreadable.
async fn process_file(
    ctx: StageContext,
    stages: Arc<[BoundStage]>,
    destination: String,
) -> Result<Option<Vec<u8>>, PublishError> {
    let content = match tokio::fs::read(&ctx.source).await {
        Ok(content) => content,
        Err(err) => {
            log!("warning"; "skipping {}: {}", ctx.source.display(), err);
            return Ok(None);
        }
    };
    if stages.is_empty() {
        return Ok(Some(content));
    }

    tokio::task::spawn_blocking(move || apply_stages(content, &stages, &ctx, &destination))
        .await
        .map_err(|err| PublishError::Join(err.to_string()))?
        .map(Some)
}

fn apply_stages(
    mut content: Vec<u8>,
    stages: &[BoundStage],
    ctx: &StageContext,
    destination: &str,
) -> Result<Vec<u8>, PublishError> {
    for stage in stages {
        debug!("stage"; "{} <- {}", stage.spec.name, ctx.source.display());
        content = stage
            .transform
            .apply(content, &stage.spec.config, ctx)
            .map_err(|err| PublishError::Stage {
                stage: stage.spec.name.clone(),
                destination: destination.to_owned(),
                source: err.into(),
            })?;
    }
    Ok(content)
}

/// Join contents, appending `separator` after every part.
pub fn concat<I>(parts: I, separator: &[u8]) -> Vec<u8>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut out = Vec::new();
    for part in parts {
        out.extend(part);
        out.extend_from_slice(separator);
    }
    out
}

async fn write_artifact(path: &Path, content: &[u8]) -> Result<(), PublishError> {
    let io_err = |source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, content).await.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::text::strip_whitespace;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor(kind: AssetType, destination: &str, files: &[&str]) -> SourceDescriptor {
        SourceDescriptor {
            kind,
            destination: destination.into(),
            files: files.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    /// Project with `script/a.js` = X, `script/b.js` = Y, output under `build/`.
    fn project() -> (TempDir, PublishOptions) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("script")).unwrap();
        fs::write(dir.path().join("script/a.js"), "X").unwrap();
        fs::write(dir.path().join("script/b.js"), "Y").unwrap();
        let options = PublishOptions {
            root: dir.path().to_path_buf(),
            directory: dir.path().join("build"),
            ..Default::default()
        };
        (dir, options)
    }

    async fn run(sources: Vec<SourceDescriptor>, options: &PublishOptions) -> Vec<WriteOutcome> {
        resolve_file_source(sources, options, &StageRegistry::default())
            .unwrap()
            .expect("eligible descriptors")
            .wait()
            .await
    }

    #[test]
    fn test_concat_appends_separator() {
        assert_eq!(concat(vec![b"a".to_vec(), b"b".to_vec()], b"\n"), b"a\nb\n");
        assert!(concat(Vec::new(), b"\n").is_empty());
    }

    #[test]
    fn test_nothing_eligible() {
        let options = PublishOptions::default();
        let registry = StageRegistry::default();
        let sources = vec![
            descriptor(AssetType::Remove, "/a.js", &[]),
            descriptor(AssetType::Replace, "/a.js", &["/x.js"]),
            descriptor(AssetType::Js, "/a.js", &[]),
            descriptor(AssetType::Css, "", &["/x.css"]),
            descriptor(AssetType::Other("anything".into()), "/a.js", &["/x.js"]),
        ];
        // No runtime needed on this path.
        assert!(resolve_file_source(sources, &options, &registry).unwrap().is_none());
        assert!(resolve_file_source(Vec::new(), &options, &registry).unwrap().is_none());
    }

    #[test]
    fn test_outside_runtime() {
        let (_dir, options) = project();
        let sources = vec![descriptor(AssetType::Js, "/script/build.js", &["/script/a.js"])];
        let err = resolve_file_source(sources, &options, &StageRegistry::default()).unwrap_err();
        assert!(matches!(err, PublishError::NoRuntime));
    }

    #[tokio::test]
    async fn test_concatenates_in_declared_order() {
        let (dir, options) = project();
        let outcomes = run(
            vec![descriptor(AssetType::Js, "/script/build.js", &["/script/a.js", "./script/b.js"])],
            &options,
        )
        .await;

        assert_eq!(outcomes.len(), 1);
        let written = outcomes[0].result.as_ref().unwrap();
        assert_eq!(written, &dir.path().join("build/script/build.js"));
        let content = fs::read_to_string(written).unwrap();
        assert_eq!(content, "X\nY\n");
        assert_eq!(strip_whitespace(&content), "XY");
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped() {
        let (dir, options) = project();
        run(
            vec![descriptor(AssetType::Js, "/out.js", &["/script/missing.js", "/script/b.js"])],
            &options,
        )
        .await;
        let content = fs::read_to_string(dir.path().join("build/out.js")).unwrap();
        assert_eq!(content, "Y\n");
    }

    #[tokio::test]
    async fn test_debug_rebases_sources() {
        let (dir, mut options) = project();
        let fixture = dir.path().join("test/fixture/script");
        fs::create_dir_all(&fixture).unwrap();
        fs::write(fixture.join("a.js"), "F").unwrap();
        options.debug = true;

        run(vec![descriptor(AssetType::Js, "/out.js", &["/script/a.js"])], &options).await;
        let content = fs::read_to_string(dir.path().join("build/out.js")).unwrap();
        assert_eq!(content, "F\n");
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let (dir, mut options) = project();
        options.stages.insert(
            "js".into(),
            vec![
                StageSpec::new("banner").with("text", "1"),
                StageSpec::new("banner").with("text", "2"),
            ],
        );
        run(vec![descriptor(AssetType::Js, "/out.js", &["/script/a.js", "/script/b.js"])], &options)
            .await;
        let content = fs::read_to_string(dir.path().join("build/out.js")).unwrap();
        assert_eq!(content, "21X\n21Y\n");
    }

    #[tokio::test]
    async fn test_stages_follow_asset_type() {
        let (dir, mut options) = project();
        options
            .stages
            .insert("css".into(), vec![StageSpec::new("banner").with("text", "/*c*/")]);
        run(
            vec![
                descriptor(AssetType::Js, "/out.js", &["/script/a.js"]),
                descriptor(AssetType::Css, "/out.css", &["/script/b.js"]),
            ],
            &options,
        )
        .await;
        assert_eq!(fs::read_to_string(dir.path().join("build/out.js")).unwrap(), "X\n");
        assert_eq!(fs::read_to_string(dir.path().join("build/out.css")).unwrap(), "/*c*/Y\n");
    }

    #[tokio::test]
    async fn test_unknown_stage() {
        let (_dir, mut options) = project();
        options.stages.insert("js".into(), vec![StageSpec::new("uglify")]);
        let err = resolve_file_source(
            vec![descriptor(AssetType::Js, "/out.js", &["/script/a.js"])],
            &options,
            &StageRegistry::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PublishError::UnknownStage(ref name) if name == "uglify"));
    }

    #[tokio::test]
    async fn test_stage_failure_is_per_descriptor() {
        let (dir, mut options) = project();
        let mut registry = StageRegistry::default();
        registry.register_fn("explode", |_, _, _| anyhow::bail!("boom"));
        options.stages.insert("coffee".into(), vec![StageSpec::new("explode")]);

        let outcomes = resolve_file_source(
            vec![
                descriptor(AssetType::Coffee, "/bad.js", &["/script/a.js"]),
                descriptor(AssetType::Js, "/good.js", &["/script/b.js"]),
            ],
            &options,
            &registry,
        )
        .unwrap()
        .unwrap()
        .wait()
        .await;

        assert!(matches!(
            outcomes[0].result,
            Err(PublishError::Stage { ref stage, .. }) if stage == "explode"
        ));
        assert!(outcomes[1].result.is_ok());
        assert!(!dir.path().join("build/bad.js").exists());
        assert!(dir.path().join("build/good.js").exists());
    }

    #[tokio::test]
    async fn test_notify_per_descriptor() {
        let (_dir, mut options) = project();
        let (tx, mut rx) = mpsc::unbounded_channel();
        options.notify = Some(Notify::new(tx).with_event("done"));

        run(
            vec![
                descriptor(AssetType::Js, "/one.js", &["/script/a.js"]),
                descriptor(AssetType::Js, "/two.js", &["/script/b.js"]),
            ],
            &options,
        )
        .await;
        drop(options);

        let mut destinations = Vec::new();
        while let Some(event) = rx.recv().await {
            assert_eq!(event.event, "done");
            assert!(event.result.is_ok());
            destinations.push(event.destination);
        }
        destinations.sort();
        assert_eq!(destinations, vec!["/one.js", "/two.js"]);
    }

    #[tokio::test]
    async fn test_same_destination_both_write() {
        let (dir, options) = project();
        let outcomes = run(
            vec![
                descriptor(AssetType::Js, "/same.js", &["/script/a.js"]),
                descriptor(AssetType::Js, "/same.js", &["/script/b.js"]),
            ],
            &options,
        )
        .await;
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        let content = fs::read_to_string(dir.path().join("build/same.js")).unwrap();
        assert!(content == "X\n" || content == "Y\n");
    }
}
