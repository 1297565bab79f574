//! Fetches the Pulse corpus and keeps one unpacked snapshot in the cache

pub mod cache;
pub mod client;
pub mod extract;

pub use cache::*;
pub use client::*;
pub use extract::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::ui::{Phase, Ui};

/// Make sure the latest corpus snapshot is unpacked locally.
///
/// Returns the corpus root (ready for [`crate::corpus::CorpusWalker`]) and
/// the snapshot's abbreviated commit id.
pub fn ensure_corpus_downloaded(
    cache_dir: Option<PathBuf>,
    force: bool,
    ui: &mut impl Ui,
) -> Result<(PathBuf, String)> {
    let cache = CacheManager::new(cache_dir)?;
    debug!("Using cache directory {:?}", cache.cache_dir());
    let client = PulseClient::new()?;

    ui.set_phase(Phase::Checking);
    ui.set_info("Looking up the latest Pulse commit");
    let commit = client.fetch_latest_commit()?;
    let sha = commit.short_sha().to_string();
    let snapshot = cache.snapshot_dir(&sha);

    if cache.is_cached(&sha) && !force {
        info!("Snapshot {} already cached at {:?}", sha, snapshot);
        ui.log(format!("Using cached snapshot {}", sha));
        return Ok((snapshot, sha));
    }

    ui.set_phase(Phase::Downloading);
    ui.set_info(format!("Snapshot {}", sha));
    let zip_path = cache.zip_path(&sha);
    client.download_archive(&commit.sha, &zip_path, ui)?;

    ui.set_phase(Phase::Unpacking);
    let staging = cache.staging_dir(&sha);
    if staging.exists() {
        fs::remove_dir_all(&staging).context("Failed to clear interrupted unpack")?;
    }
    let files = extract_state_tree(&zip_path, &staging, ui)?;
    let snapshot = cache.commit_snapshot(&sha)?;
    ui.clear_progress();
    info!("Unpacked {} files into {:?}", files, snapshot);

    fs::remove_file(&zip_path).ok();
    if let Err(e) = cache.cleanup_old_snapshots(&sha) {
        warn!("Failed to clean old snapshots: {}", e);
    }

    Ok((snapshot, sha))
}
