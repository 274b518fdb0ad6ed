//! Scenario file location
//!
//! Walks an explicit list of search roots and yields the canonical path of
//! every regular file whose name carries the requested extension. The walk
//! is lazy and depth-first; each call to [`ResourceLocator::locate`] starts a
//! fresh walk. Symlinked directories are followed, loops are skipped, and a
//! file reachable through several roots or links is yielded once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerates files below a fixed set of search roots
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    roots: Vec<PathBuf>,
}

impl ResourceLocator {
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Lazily enumerate every file ending in `.<extension>`
    pub fn locate(&self, extension: &str) -> Resources {
        Resources {
            pending_roots: self.roots.iter().rev().cloned().collect(),
            walk: None,
            suffix: format!(".{extension}"),
            yielded: HashSet::new(),
        }
    }
}

/// Iterator returned by [`ResourceLocator::locate`]
pub struct Resources {
    /// Roots not yet visited, last element first
    pending_roots: Vec<PathBuf>,
    walk: Option<walkdir::IntoIter>,
    suffix: String,
    /// Canonical paths already returned by this walk
    yielded: HashSet<PathBuf>,
}

impl Resources {
    fn start_root(&mut self, root: &Path) {
        if !root.is_dir() {
            tracing::debug!("Search root {} is not a directory", root.display());
            return;
        }
        self.walk = Some(
            WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter(),
        );
    }

    /// Canonical path of `path` if it matches the suffix
    fn matching(&self, path: &Path) -> Option<PathBuf> {
        match path.canonicalize() {
            Ok(canonical) => {
                let matches = canonical.to_string_lossy().ends_with(&self.suffix);
                matches.then_some(canonical)
            }
            Err(e) => {
                tracing::debug!("Cannot resolve {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl Iterator for Resources {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some(walk) = self.walk.as_mut() else {
                let root = self.pending_roots.pop()?;
                self.start_root(&root);
                continue;
            };

            let entry = match walk.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    // Loops, dangling links and unreadable directories
                    tracing::debug!("Skipping entry: {}", e);
                    continue;
                }
                None => {
                    self.walk = None;
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(found) = self.matching(entry.path()) {
                if self.yielded.insert(found.clone()) {
                    return Some(found);
                }
                tracing::debug!("Already located {}", found.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_locate_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("A.scesim"));
        touch(&dir.path().join("nested/deeper/B.scesim"));
        touch(&dir.path().join("nested/notes.txt"));
        touch(&dir.path().join("nested/Cscesim"));

        let locator = ResourceLocator::new(vec![dir.path().to_path_buf()]);
        let mut found: Vec<String> = locator
            .locate("scesim")
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec!["A.scesim", "B.scesim"]);
    }

    #[test]
    fn test_locate_yields_canonical_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("sub/A.scesim"));

        let locator = ResourceLocator::new(vec![dir.path().join("sub/../sub")]);
        let found: Vec<PathBuf> = locator.locate("scesim").collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_absolute());
        assert!(!found[0].to_string_lossy().contains(".."));
    }

    #[test]
    fn test_missing_and_file_roots_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file_root = dir.path().join("A.scesim");
        touch(&file_root);

        let locator = ResourceLocator::new(vec![dir.path().join("missing"), file_root]);
        assert_eq!(locator.locate("scesim").count(), 0);
    }

    #[test]
    fn test_each_call_walks_again() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("A.scesim"));
        let locator = ResourceLocator::new(vec![dir.path().to_path_buf()]);
        assert_eq!(locator.locate("scesim").count(), 1);

        touch(&dir.path().join("B.scesim"));
        assert_eq!(locator.locate("scesim").count(), 2);
    }

    #[test]
    fn test_overlapping_roots_yield_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("A.scesim"));
        touch(&dir.path().join("nested/B.scesim"));

        let locator = ResourceLocator::new(vec![
            dir.path().join("nested"),
            dir.path().to_path_buf(),
            dir.path().join("nested"),
        ]);
        let names: Vec<String> = locator
            .locate("scesim")
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["B.scesim", "A.scesim"]);
    }

    #[test]
    fn test_multiple_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(&first.path().join("A.scesim"));
        touch(&second.path().join("B.scesim"));

        let locator =
            ResourceLocator::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let names: Vec<String> = locator
            .locate("scesim")
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.scesim", "B.scesim"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("A.scesim"));
        std::os::unix::fs::symlink(
            dir.path().join("gone.scesim"),
            dir.path().join("broken.scesim"),
        )
        .unwrap();

        let locator = ResourceLocator::new(vec![dir.path().to_path_buf()]);
        let found: Vec<PathBuf> = locator.locate("scesim").collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("A.scesim"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_finite() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("A.scesim"));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let locator = ResourceLocator::new(vec![dir.path().to_path_buf()]);
        let found: Vec<PathBuf> = locator.locate("scesim").collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("A.scesim"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_followed_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("real/B.scesim"));
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

        let locator = ResourceLocator::new(vec![dir.path().to_path_buf()]);
        let found: Vec<PathBuf> = locator.locate("scesim").collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("real/B.scesim"));
    }
}
