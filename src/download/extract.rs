use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use crate::ui::Ui;

/// Location of the per-state transaction reports inside the Pulse repository
pub const STATE_TREE: &str = "data/aggregated/transaction/country/india/state";

/// Map an archive entry path to its place below the state tree.
///
/// Archive entries carry a `<repo>-<sha>/` prefix, which is dropped. Entries
/// outside the state tree map to `None`.
pub fn state_relative_path(entry: &Path) -> Option<PathBuf> {
    let mut components = entry.components();
    match components.next() {
        Some(Component::Normal(_)) => {}
        _ => return None,
    }

    let rest = components.as_path().strip_prefix(STATE_TREE).ok()?;
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest.to_path_buf())
    }
}

/// Unpack the state transaction tree of a Pulse archive into `dest_dir`.
/// Returns the number of files written.
pub fn extract_state_tree(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<u64> {
    let file = File::open(zip_path).context("Failed to open zip file")?;
    let reader = BufReader::new(file);
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;

    fs::create_dir_all(dest_dir).context("Failed to create destination directory")?;

    let total = archive.len() as u64;
    let mut written: u64 = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .context("Failed to read file from archive")?;

        ui.set_progress(i as u64 + 1, total, "Entries");
        if ui.interrupted() {
            bail!("Unpacking interrupted");
        }

        if entry.is_dir() {
            continue;
        }

        let Some(relative) = entry.enclosed_name().as_deref().and_then(state_relative_path) else {
            continue;
        };

        let dest_path = dest_dir.join(&relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let mut dest_file = File::create(&dest_path)
            .with_context(|| format!("Failed to create file: {:?}", dest_path))?;
        io::copy(&mut entry, &mut dest_file)
            .with_context(|| format!("Failed to extract: {:?}", relative))?;

        written += 1;
    }

    ui.log(format!("Unpacked {} report files", written));
    Ok(written)
}
