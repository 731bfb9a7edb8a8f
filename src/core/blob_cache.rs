//! On-disk cache of extracted blobs.
//!
//! Layout: `<cache-dir>/blobs/<md5 of repository path>/<treeish key>/<path>`, where the
//! treeish key is a readable form of the treeish followed by its md5. Extracting the same
//! blob twice overwrites the file.

use crate::core::{
    accessor::{QueryBlobBytesParameters, RepositoryAccessor},
    dirs::get_cache_directory,
    error::{GitAccessorError, Result},
    executor::CommandExecutor,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobCache {
    root: PathBuf,
}

impl BlobCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache for the repository whose `.git` directory is `repo_path`.
    pub fn for_repository(repo_path: &Path) -> Result<Self> {
        let repo_hash = format!("{:x}", md5::compute(repo_path.to_string_lossy().as_bytes()));
        Ok(Self::new(get_cache_directory()?.join("blobs").join(repo_hash)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `path` at `treeish` is extracted to. `path` must be relative and stay
    /// inside the tree.
    pub fn path_for(&self, treeish: &str, path: &str) -> Result<PathBuf> {
        if treeish.is_empty() || treeish.chars().all(|c| c == '.') {
            return Err(GitAccessorError::invalid_blob_path(treeish));
        }

        let mut target = self.root.join(treeish_key(treeish));
        for component in path.split('/') {
            if component.is_empty()
                || component == "."
                || component == ".."
                || (cfg!(windows) && component.contains(['\\', ':']))
            {
                return Err(GitAccessorError::invalid_blob_path(path));
            }
            target.push(component);
        }
        Ok(target)
    }

    pub fn extract<E: CommandExecutor>(
        &self,
        accessor: &RepositoryAccessor<E>,
        treeish: &str,
        path: &str,
    ) -> Result<PathBuf> {
        let target = self.path_for(treeish, path)?;
        let blob = accessor.query_blob_bytes(&QueryBlobBytesParameters::new(treeish, path))?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, blob.bytes())?;
        log::debug!(
            "Extracted {treeish}:{path} ({} bytes) to {}",
            blob.len(),
            target.display()
        );
        Ok(target)
    }
}

/// Refs like `feature/x` or `HEAD~2` become a single directory name. The hash keeps
/// `HEAD~2` and `HEAD^2` apart.
fn treeish_key(treeish: &str) -> String {
    let readable: String = treeish
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect();
    format!("{readable}-{:x}", md5::compute(treeish.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accessor::tests::RecordingExecutor;
    use tempfile::TempDir;

    fn key(treeish: &str) -> String {
        format!("{}-{:x}", treeish.replace(['/', '~', '^'], "_"), md5::compute(treeish))
    }

    #[test]
    fn test_path_for_layout() {
        let cache = BlobCache::new("/cache");
        assert_eq!(
            cache.path_for("feature/x", "src/main.rs").unwrap(),
            Path::new("/cache")
                .join(key("feature/x"))
                .join("src/main.rs")
        );
        assert_eq!(
            cache.path_for("HEAD~2", "a.txt").unwrap(),
            Path::new("/cache").join(key("HEAD~2")).join("a.txt")
        );
    }

    #[test]
    fn test_treeish_keys_do_not_collide() {
        let cache = BlobCache::new("/cache");
        let tilde = cache.path_for("HEAD~2", "a.txt").unwrap();
        let caret = cache.path_for("HEAD^2", "a.txt").unwrap();
        let slash = cache.path_for("HEAD/2", "a.txt").unwrap();
        assert_ne!(tilde, caret);
        assert_ne!(tilde, slash);
        assert_ne!(caret, slash);
    }

    #[test]
    fn test_path_for_rejects_escapes() {
        let cache = BlobCache::new("/cache");
        for path in ["../etc/passwd", "/etc/passwd", "a//b", "a/./b", ""] {
            assert!(
                matches!(
                    cache.path_for("HEAD", path),
                    Err(GitAccessorError::InvalidBlobPath { .. })
                ),
                "{path:?} should be rejected"
            );
        }
        assert!(cache.path_for("..", "a.txt").is_err());
        assert!(cache.path_for("", "a.txt").is_err());
    }

    #[cfg(windows)]
    #[test]
    fn test_path_for_rejects_windows_separators() {
        let cache = BlobCache::new("/cache");
        for path in ["a\\..\\b", "c:/x", "a/b:stream"] {
            assert!(cache.path_for("HEAD", path).is_err(), "{path:?} should be rejected");
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_path_for_accepts_colon_and_backslash_names() {
        let cache = BlobCache::new("/cache");
        assert_eq!(
            cache.path_for("HEAD", "docs/a:b.txt").unwrap(),
            Path::new("/cache").join(key("HEAD")).join("docs/a:b.txt")
        );
        assert_eq!(
            cache.path_for("HEAD", "odd\\name").unwrap(),
            Path::new("/cache").join(key("HEAD")).join("odd\\name")
        );
    }

    #[test]
    fn test_for_repository_is_stable() {
        let a = BlobCache::for_repository(Path::new("/repos/one/.git"));
        let b = BlobCache::for_repository(Path::new("/repos/one/.git"));
        let c = BlobCache::for_repository(Path::new("/repos/two/.git"));
        if let (Ok(a), Ok(b), Ok(c)) = (a, b, c) {
            assert_eq!(a, b);
            assert_ne!(a, c);
        }
    }

    #[test]
    fn test_extract_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let cache = BlobCache::new(dir.path());
        let accessor =
            RepositoryAccessor::new(RecordingExecutor::default().respond(0, &[1, 0, 2], ""));

        let target = cache.extract(&accessor, "HEAD", "bin/data.bin").unwrap();
        assert_eq!(target, dir.path().join(key("HEAD")).join("bin/data.bin"));
        assert_eq!(std::fs::read(&target).unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn test_extract_ancestor_and_parent_keep_their_contents() {
        let dir = TempDir::new().unwrap();
        let cache = BlobCache::new(dir.path());
        let accessor = RepositoryAccessor::new(
            RecordingExecutor::default()
                .respond(0, b"grandparent", "")
                .respond(0, b"second parent", ""),
        );

        let tilde = cache.extract(&accessor, "HEAD~2", "a.txt").unwrap();
        let caret = cache.extract(&accessor, "HEAD^2", "a.txt").unwrap();
        assert_ne!(tilde, caret);
        assert_eq!(std::fs::read(&tilde).unwrap(), b"grandparent");
        assert_eq!(std::fs::read(&caret).unwrap(), b"second parent");
        assert_eq!(
            accessor.executor().calls(),
            vec!["cat-file blob HEAD~2:a.txt", "cat-file blob HEAD^2:a.txt"]
        );
    }

    #[test]
    fn test_extract_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cache = BlobCache::new(dir.path());
        let accessor = RepositoryAccessor::new(RecordingExecutor::default().respond(
            128,
            b"",
            "fatal: path 'missing.txt' does not exist in 'HEAD'",
        ));

        let err = cache.extract(&accessor, "HEAD", "missing.txt").unwrap_err();
        assert_eq!(err.exit_code(), Some(128));
        assert!(!dir.path().join(key("HEAD")).exists());
    }
}
