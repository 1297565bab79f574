use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::io::{Read, Write};
use std::path::Path;

use crate::ui::Ui;

const REPOSITORY: &str = "PhonePe/pulse";
const BRANCH: &str = "master";

#[derive(Debug, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
}

impl CommitInfo {
    /// Abbreviated id used to name cache entries
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(12)]
    }
}

pub struct PulseClient {
    client: Client,
}

impl PulseClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("upi-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch the commit the upstream branch currently points at
    pub fn fetch_latest_commit(&self) -> Result<CommitInfo> {
        let url = format!("https://api.github.com/repos/{}/commits/{}", REPOSITORY, BRANCH);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .context("Failed to fetch latest commit")?
            .error_for_status()
            .context("GitHub refused the commit lookup")?;

        let text = response.text().context("Failed to read response")?;
        let info: CommitInfo = serde_json::from_str(&text).context("Failed to parse commit info")?;

        Ok(info)
    }

    /// Download the repository archive at `sha` to the given path
    pub fn download_archive(&self, sha: &str, dest: &Path, ui: &mut impl Ui) -> Result<()> {
        let response = self
            .client
            .get(archive_url(sha))
            .send()
            .context("Failed to start download")?
            .error_for_status()
            .context("Archive download refused")?;

        let total_size = response.content_length().unwrap_or(0);

        let mut file = std::fs::File::create(dest).context("Failed to create destination file")?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];
        let mut reader = response;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .context("Failed to read from response")?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .context("Failed to write to file")?;

            downloaded += bytes_read as u64;
            ui.set_progress(downloaded, total_size, format_bytes(downloaded, total_size));
            if ui.interrupted() {
                bail!("Download interrupted");
            }
        }

        ui.log(format!("Downloaded {}", format_bytes(downloaded, downloaded)));
        Ok(())
    }
}

fn archive_url(sha: &str) -> String {
    format!("https://github.com/{}/archive/{}.zip", REPOSITORY, sha)
}

/// Format bytes as human-readable string; GitHub archives often have no length
fn format_bytes(current: u64, total: u64) -> String {
    fn fmt(bytes: u64) -> String {
        if bytes >= 1_000_000_000 {
            format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
        } else if bytes >= 1_000_000 {
            format!("{:.1} MB", bytes as f64 / 1_000_000.0)
        } else if bytes >= 1_000 {
            format!("{:.1} KB", bytes as f64 / 1_000.0)
        } else {
            format!("{} B", bytes)
        }
    }

    if total == 0 {
        fmt(current)
    } else {
        format!("{} / {}", fmt(current), fmt(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500, 999), "500 B / 999 B");
        assert_eq!(format_bytes(1_500_000, 3_000_000), "1.5 MB / 3.0 MB");
        assert_eq!(format_bytes(2_500, 0), "2.5 KB");
    }

    #[test]
    fn test_archive_url() {
        assert_eq!(
            archive_url("abc123"),
            "https://github.com/PhonePe/pulse/archive/abc123.zip"
        );
    }

    #[test]
    fn test_commit_info_parse() {
        let info: CommitInfo =
            serde_json::from_str(r#"{"sha": "0123456789abcdef0123", "commit": {}}"#).unwrap();
        assert_eq!(info.short_sha(), "0123456789ab");
    }
}
