use serde::{Deserialize, Serialize};

/// Which resolvers are registered, in chain order, and how `yt-dlp` is invoked.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    #[serde(default = "default_true")]
    pub http: bool,
    #[serde(default = "default_true")]
    pub ytdlp: bool,
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    #[serde(default = "default_search_prefix")]
    pub search_prefix: String,
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            http: true,
            ytdlp: true,
            ytdlp_path: default_ytdlp_path(),
            search_prefix: default_search_prefix(),
            format: default_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_search_prefix() -> String {
    "ytsearch1:".to_string()
}

fn default_format() -> String {
    "bestaudio[abr<=96]/bestaudio".to_string()
}
