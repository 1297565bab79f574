//! Lazy traversal of the region/year/quarter-file corpus tree

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::DirectoryAccessError;

/// What to do when a directory level cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkPolicy {
    /// Record the error and continue with the next sibling
    #[default]
    Skip,
    /// Abort the whole walk on the first error
    Strict,
}

/// A leaf report file with the raw directory coordinates it was found under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterFile {
    pub region_raw: String,
    pub year_raw: String,
    pub path: PathBuf,
}

pub struct CorpusWalker {
    root: PathBuf,
}

impl CorpusWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a walk. Nothing is read until the iterator is polled.
    pub fn walk(&self) -> Walk {
        Walk {
            root: self.root.clone(),
            entries: WalkDir::new(&self.root)
                .follow_links(false)
                .min_depth(1)
                .max_depth(3)
                .sort_by_file_name()
                .into_iter(),
        }
    }
}

/// Iterator over every quarter file three levels below the corpus root.
///
/// Yields an error item for every directory that cannot be listed, and for
/// every plain file found where a region or year directory belongs, then
/// carries on with its siblings. Entries come in file-name order.
pub struct Walk {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

impl Walk {
    fn access_error(&self, e: walkdir::Error) -> DirectoryAccessError {
        let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
        let source = match e.into_io_error() {
            Some(io) => io,
            None => io::Error::other("file system loop"),
        };
        DirectoryAccessError::new(path, source)
    }
}

fn segment(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Iterator for Walk {
    type Item = Result<QuarterFile, DirectoryAccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.access_error(e))),
            };
            let is_dir = entry.file_type().is_dir();

            match (entry.depth(), is_dir) {
                (1 | 2, true) => continue,
                (1 | 2, false) => {
                    let source = io::Error::other("expected a directory");
                    return Some(Err(DirectoryAccessError::new(entry.into_path(), source)));
                }
                (_, true) => {
                    debug!("Ignoring nested directory {:?}", entry.path());
                    continue;
                }
                (_, false) => {
                    let path = entry.into_path();
                    let year_dir = path.parent();
                    return Some(Ok(QuarterFile {
                        region_raw: segment(year_dir.and_then(Path::parent)),
                        year_raw: segment(year_dir),
                        path,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_walk_finds_every_leaf() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "goa/2021/1.json");
        touch(dir.path(), "goa/2021/2.json");
        touch(dir.path(), "kerala/2022/4.json");

        let files: Vec<QuarterFile> = CorpusWalker::new(dir.path())
            .walk()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].region_raw, "goa");
        assert_eq!(files[0].year_raw, "2021");
        assert!(files[0].path.ends_with("goa/2021/1.json"));
        assert!(files[1].path.ends_with("goa/2021/2.json"));
        assert_eq!(files[2].region_raw, "kerala");
    }

    #[test]
    fn test_missing_root_yields_one_error() {
        let dir = TempDir::new().unwrap();
        let items: Vec<_> = CorpusWalker::new(dir.path().join("nope")).walk().collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn test_stray_file_at_year_level_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "goa/2021/1.json");
        touch(dir.path(), "goa/README");

        let items: Vec<_> = CorpusWalker::new(dir.path()).walk().collect();
        let ok = items.iter().filter(|i| i.is_ok()).count();
        let errors: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();

        assert_eq!(ok, 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].path.ends_with("README"));
    }

    #[test]
    fn test_nested_directories_below_leaf_level_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "goa/2021/1.json");
        touch(dir.path(), "goa/2021/extra/2.json");

        let items: Vec<_> = CorpusWalker::new(dir.path()).walk().collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[test]
    fn test_stray_file_at_region_level_is_reported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "goa/2021/1.json");
        touch(dir.path(), "notes.txt");

        let items: Vec<_> = CorpusWalker::new(dir.path()).walk().collect();
        assert_eq!(items.len(), 2);
        let error = items.iter().find_map(|i| i.as_ref().err()).unwrap();
        assert!(error.path.ends_with("notes.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_year_directory_is_reported_with_its_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "goa/2021/1.json");
        touch(dir.path(), "kerala/2021/1.json");
        let locked = dir.path().join("goa/2021");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let items: Vec<_> = CorpusWalker::new(dir.path()).walk().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let errors: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, locked);
        assert_eq!(items.iter().filter(|i| i.is_ok()).count(), 1);
    }
}
