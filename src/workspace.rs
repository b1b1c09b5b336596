//! The served root directory and the filesystem access shared by the tree
//! builder, the search and the file renderer.

use std::{
    borrow::Cow,
    ffi::OsStr,
    fs, io,
    path::{Component, Path, PathBuf},
};

use crate::error::ApiError;

/// Directory that is always skipped during traversal, next to dot-entries.
pub const VENDORED_DIR: &str = "node_modules";

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }

    /// Hidden entries and vendored dependencies never show up in listings.
    pub fn is_excluded(&self) -> bool {
        self.name.starts_with('.') || self.name == VENDORED_DIR
    }

    pub fn is_markdown(&self) -> bool {
        !self.is_dir && is_markdown(Path::new(&self.name))
    }
}

/// Lists the entries of a single directory.
///
/// Traversals only ever go through this trait so they can run against an
/// in-memory tree in tests.
pub trait DirectoryReader {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>>;
}

/// Reads directories from the real filesystem.
///
/// Entries are classified without following symlinks, so a link to a
/// directory is never descended into.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl DirectoryReader for FsReader {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
        fs::read_dir(dir)?
            .map(|entry| {
                let entry = entry?;
                Ok(DirectoryEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: entry.file_type()?.is_dir(),
                })
            })
            .collect()
    }
}

/// `true` when the extension is exactly `md`.
pub fn is_markdown(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("md"))
}

/// Path of `path` relative to `root`, as sent over the API.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Folds `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    canonical: bool,
}

impl Workspace {
    /// Opens `root`, canonicalizing it when it exists.
    ///
    /// A missing root is accepted: every request against it then fails with
    /// the underlying filesystem error instead of the server refusing to start.
    pub fn open(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        match fs::canonicalize(root) {
            Ok(root) => Self {
                root,
                canonical: true,
            },
            Err(_) => Self {
                root: std::path::absolute(root)
                    .map(|absolute| normalize(&absolute))
                    .unwrap_or_else(|_| normalize(root)),
                canonical: false,
            },
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a requested path against the root, refusing anything that
    /// lands outside of it.
    ///
    /// The check runs on the lexically normalized path first and, when the
    /// target exists, again on its canonical location so symlinks cannot
    /// leave the root either.
    pub async fn resolve(&self, requested: &str) -> Result<PathBuf, ApiError> {
        let root = self.canonical_root().await;
        let resolved = normalize(&root.join(requested));
        if !resolved.starts_with(&root) {
            return Err(ApiError::Forbidden);
        }

        let canonical = tokio::fs::canonicalize(&resolved)
            .await
            .map_err(ApiError::lookup)?;
        if !canonical.starts_with(&root) {
            return Err(ApiError::Forbidden);
        }

        Ok(resolved)
    }

    /// The root as the filesystem sees it. A root that was missing at startup
    /// is canonicalized again once it exists.
    async fn canonical_root(&self) -> Cow<'_, Path> {
        if self.canonical {
            return Cow::Borrowed(&self.root);
        }

        match tokio::fs::canonicalize(&self.root).await {
            Ok(root) => Cow::Owned(root),
            Err(_) => Cow::Borrowed(&self.root),
        }
    }
}
