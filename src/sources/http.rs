use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::TrackResolver;
use crate::{common::ResolveError, playback::Track};

/// Direct `http://` / `https://` stream URLs.
///
/// The URL is played as-is; the title is taken from the last path segment.
pub struct HttpResolver {
    url_regex: Regex,
}

impl HttpResolver {
    pub fn new() -> Self {
        Self {
            url_regex: Regex::new(r"^(?i)https?://(?P<host>[^/?#]+)(?P<path>[^?#]*)")
                .expect("static regex is valid"),
        }
    }

    fn title_for(&self, url: &str) -> Option<String> {
        let caps = self.url_regex.captures(url)?;
        let host = caps.name("host")?.as_str();

        let segment = caps
            .name("path")
            .map(|p| p.as_str())
            .unwrap_or("")
            .rsplit('/')
            .find(|s| !s.is_empty());

        let title = match segment {
            Some(segment) => urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string()),
            None => host.to_string(),
        };
        Some(title)
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackResolver for HttpResolver {
    fn name(&self) -> &str {
        "http"
    }

    fn can_handle(&self, query: &str) -> bool {
        self.url_regex.is_match(query.trim())
    }

    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError> {
        let url = query.trim();
        let Some(title) = self.title_for(url) else {
            return Ok(Vec::new());
        };

        debug!("Resolved direct URL {} as '{}'", url, title);
        Ok(vec![Track::new(url, title)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle_only_http_urls() {
        let resolver = HttpResolver::new();
        assert!(resolver.can_handle("https://cdn.example/a.mp3"));
        assert!(resolver.can_handle("HTTP://cdn.example/a.mp3"));
        assert!(!resolver.can_handle("never gonna give you up"));
        assert!(!resolver.can_handle("ftp://cdn.example/a.mp3"));
    }

    #[tokio::test]
    async fn test_title_from_last_segment() {
        let resolver = HttpResolver::new();
        let tracks = resolver
            .resolve("https://cdn.example/music/My%20Song.mp3?sig=abc#t=3")
            .await
            .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(&*tracks[0].title, "My Song.mp3");
        assert_eq!(
            &*tracks[0].stream_ref,
            "https://cdn.example/music/My%20Song.mp3?sig=abc#t=3"
        );
    }

    #[tokio::test]
    async fn test_title_falls_back_to_host() {
        let resolver = HttpResolver::new();
        let tracks = resolver.resolve("https://radio.example/").await.unwrap();
        assert_eq!(&*tracks[0].title, "radio.example");
    }
}
