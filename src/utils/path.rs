//! Path utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `prerender_origin_path` - declared asset path to a root-relative path
//! - `artifact_path` - destination inside the output directory
//! - `SourceRoot` - where declared asset paths are looked up

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Turn a declared path (`/x.js`, `./x.js`, `x.js`) into a relative one.
///
/// Root and `.` components are dropped. With a fixture root the result is
/// rebased under it.
///
/// # Example
/// ```ignore
/// prerender_origin_path("/script/origin.js", None)  // script/origin.js
/// prerender_origin_path("./script/origin.js", Some(Path::new("test/fixture")))
/// // test/fixture/script/origin.js
/// ```
pub fn prerender_origin_path(declared: &str, fixture: Option<&Path>) -> PathBuf {
    let relative = relative_components(Path::new(declared));
    match fixture {
        Some(root) => relative_components(root).join(relative),
        None => relative,
    }
}

/// Output location of a destination: `{directory}/{destination}`.
///
/// The destination's leading `/` or `./` is stripped so it always lands
/// inside the directory.
pub fn artifact_path(directory: &Path, destination: &str) -> PathBuf {
    directory.join(relative_components(Path::new(destination)))
}

fn relative_components(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
        .collect()
}

/// Base used to look up declared source paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoot {
    /// Project root; empty means the current directory.
    pub root: PathBuf,
    /// Fixture root used in debug mode, relative to `root`.
    pub fixture: Option<PathBuf>,
}

impl SourceRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fixture: None,
        }
    }

    pub fn with_fixture(mut self, fixture: impl Into<PathBuf>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    /// Resolve one declared path.
    pub fn resolve(&self, declared: &str) -> PathBuf {
        self.root
            .join(prerender_origin_path(declared, self.fixture.as_deref()))
    }

    /// Resolve declared paths, keeping their order.
    pub fn resolve_all(&self, files: &[String]) -> Vec<PathBuf> {
        files.iter().map(|file| self.resolve(file)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "script/origin.js";
    const DEBUG: &str = "test/fixture/script/origin.js";

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_prerender_relative_and_absolute() {
        let fixture = Some(Path::new("test/fixture"));
        for declared in ["./script/origin.js", "/script/origin.js", "script/origin.js"] {
            assert_eq!(prerender_origin_path(declared, None), PathBuf::from(ORIGIN));
            assert_eq!(prerender_origin_path(declared, fixture), PathBuf::from(DEBUG));
        }
    }

    #[test]
    fn test_prerender_fixture_with_leading_dot() {
        assert_eq!(
            prerender_origin_path("/a.js", Some(Path::new("./fixtures/"))),
            PathBuf::from("fixtures/a.js")
        );
    }

    #[test]
    fn test_artifact_path() {
        let dir = Path::new("./build");
        assert_eq!(
            artifact_path(dir, "/script/build.js"),
            Path::new("./build/script/build.js")
        );
        assert_eq!(
            artifact_path(dir, "./style/build.css"),
            Path::new("./build/style/build.css")
        );
        assert_eq!(
            artifact_path(dir, "style/build.css"),
            Path::new("./build/style/build.css")
        );
    }

    #[test]
    fn test_source_root_resolve_all_keeps_order() {
        let root = SourceRoot::new("/site").with_fixture("test/fixture");
        let files = vec!["/b.js".to_string(), "./a.js".to_string()];
        assert_eq!(
            root.resolve_all(&files),
            vec![
                PathBuf::from("/site/test/fixture/b.js"),
                PathBuf::from("/site/test/fixture/a.js"),
            ]
        );
    }

    #[test]
    fn test_source_root_default_is_cwd_relative() {
        assert_eq!(SourceRoot::default().resolve("/x.css"), PathBuf::from("x.css"));
    }
}
