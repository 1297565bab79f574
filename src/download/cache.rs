use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Cache layout: `<cache>/<sha>.zip` archives, `<cache>/<sha>.partial/` trees
/// being unpacked and `<cache>/<sha>/` complete trees
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "upi-pulse")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir)
            .context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding the unpacked state tree of one snapshot
    pub fn snapshot_dir(&self, sha: &str) -> PathBuf {
        self.cache_dir.join(sha)
    }

    /// Directory an archive is unpacked into before it becomes the snapshot
    pub fn staging_dir(&self, sha: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.partial", sha))
    }

    /// Move a fully unpacked staging tree into place as the snapshot
    pub fn commit_snapshot(&self, sha: &str) -> Result<PathBuf> {
        let snapshot = self.snapshot_dir(sha);
        if snapshot.exists() {
            fs::remove_dir_all(&snapshot).context("Failed to clear previous snapshot")?;
        }
        fs::rename(self.staging_dir(sha), &snapshot)
            .with_context(|| format!("Failed to move snapshot into {:?}", snapshot))?;
        Ok(snapshot)
    }

    /// A snapshot counts as cached once a committed tree has at least one
    /// region. Interrupted unpacks only ever leave a staging directory.
    pub fn is_cached(&self, sha: &str) -> bool {
        fs::read_dir(self.snapshot_dir(sha))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    pub fn zip_path(&self, sha: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.zip", sha))
    }

    /// Remove every other snapshot (trees and archives), keeping `keep`
    pub fn cleanup_old_snapshots(&self, keep: &str) -> Result<()> {
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let stem = name
                .strip_suffix(".zip")
                .or_else(|| name.strip_suffix(".partial"))
                .unwrap_or(name);
            if stem == keep || !is_snapshot_id(stem) {
                continue;
            }

            if path.is_dir() {
                fs::remove_dir_all(&path).ok();
            } else {
                fs::remove_file(&path).ok();
            }
        }
        Ok(())
    }
}

fn is_snapshot_id(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_cached_requires_content() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();
        assert!(!cache.is_cached("abc123"));

        fs::create_dir_all(cache.snapshot_dir("abc123")).unwrap();
        assert!(!cache.is_cached("abc123"));

        fs::create_dir_all(cache.snapshot_dir("abc123").join("goa")).unwrap();
        assert!(cache.is_cached("abc123"));
    }

    #[test]
    fn test_interrupted_unpack_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();

        fs::create_dir_all(cache.staging_dir("abc123").join("goa/2021")).unwrap();
        assert!(!cache.is_cached("abc123"));

        let snapshot = cache.commit_snapshot("abc123").unwrap();
        assert_eq!(snapshot, cache.snapshot_dir("abc123"));
        assert!(snapshot.join("goa/2021").is_dir());
        assert!(!cache.staging_dir("abc123").exists());
        assert!(cache.is_cached("abc123"));
    }

    #[test]
    fn test_commit_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();
        fs::create_dir_all(cache.snapshot_dir("abc123").join("stale")).unwrap();
        fs::create_dir_all(cache.staging_dir("abc123").join("goa")).unwrap();

        let snapshot = cache.commit_snapshot("abc123").unwrap();
        assert!(snapshot.join("goa").is_dir());
        assert!(!snapshot.join("stale").exists());
    }

    #[test]
    fn test_cleanup_keeps_current_and_foreign_entries() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(Some(dir.path().to_path_buf())).unwrap();
        fs::create_dir_all(cache.snapshot_dir("aaaa")).unwrap();
        fs::create_dir_all(cache.snapshot_dir("bbbb")).unwrap();
        fs::create_dir_all(cache.staging_dir("cccc")).unwrap();
        fs::write(cache.zip_path("bbbb"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        cache.cleanup_old_snapshots("aaaa").unwrap();

        assert!(cache.snapshot_dir("aaaa").exists());
        assert!(!cache.snapshot_dir("bbbb").exists());
        assert!(!cache.zip_path("bbbb").exists());
        assert!(!cache.staging_dir("cccc").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
