use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use super::TrackResolver;
use crate::{common::ResolveError, configs::ResolverConfig, playback::Track};

/// Free-text search through an external `yt-dlp` binary.
///
/// Queries that are not URLs are prefixed with the configured search prefix
/// (`ytsearch1:` by default), so the first entry is the best match. Only the
/// stream URL and title are extracted; nothing is downloaded.
pub struct YtDlpResolver {
    binary: String,
    search_prefix: String,
    format: String,
}

#[derive(Debug, Deserialize)]
struct Entry {
    url: Option<String>,
    title: Option<String>,
    #[serde(default)]
    entries: Vec<Entry>,
}

impl YtDlpResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            binary: config.ytdlp_path.clone(),
            search_prefix: config.search_prefix.clone(),
            format: config.format.clone(),
        }
    }

    fn target_for(&self, query: &str) -> String {
        let query = query.trim();
        if query.contains("://") {
            query.to_string()
        } else {
            format!("{}{}", self.search_prefix, query)
        }
    }

    fn args(&self, target: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "-f".to_string(),
            self.format.clone(),
            "--".to_string(),
            target.to_string(),
        ]
    }
}

/// Parses `--dump-json` output: one JSON object per line, each either a single
/// video or a playlist-shaped object carrying `entries`. Entries without a
/// stream URL are skipped.
pub fn parse_entries(stdout: &str) -> Result<Vec<Track>, ResolveError> {
    let mut tracks = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let entry: Entry =
            serde_json::from_str(line).map_err(|e| ResolveError::Parse(e.to_string()))?;
        collect(entry, &mut tracks);
    }

    Ok(tracks)
}

fn collect(entry: Entry, tracks: &mut Vec<Track>) {
    if !entry.entries.is_empty() {
        for child in entry.entries {
            collect(child, tracks);
        }
        return;
    }

    match entry.url {
        Some(url) => {
            let title = entry.title.unwrap_or_else(|| "Unknown".to_string());
            tracks.push(Track::new(url, title));
        }
        None => debug!(
            "Skipping yt-dlp entry without a stream url: {:?}",
            entry.title
        ),
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    fn name(&self) -> &str {
        "ytdlp"
    }

    fn can_handle(&self, query: &str) -> bool {
        !query.trim().is_empty()
    }

    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError> {
        let target = self.target_for(query);
        debug!("Running {} for '{}'", self.binary, target);

        let output = Command::new(&self.binary)
            .args(self.args(&target))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} failed for '{}': {}", self.binary, target, stderr);
            return Err(ResolveError::Process(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            }));
        }

        parse_entries(&String::from_utf8_lossy(&output.stdout))
    }
}
