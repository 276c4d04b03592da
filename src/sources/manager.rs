use async_trait::async_trait;

use super::{BoxedResolver, HttpResolver, TrackResolver, YtDlpResolver};
use crate::{common::ResolveError, configs::ResolverConfig, playback::Track};

/// Ordered chain of resolvers; the first that can handle a query answers it.
pub struct SourceManager {
    pub sources: Vec<BoxedResolver>,
}

impl SourceManager {
    pub fn new(config: &ResolverConfig) -> Self {
        let mut sources: Vec<BoxedResolver> = Vec::new();

        macro_rules! register_source {
            ($enabled:expr, $name:literal, $ctor:expr) => {
                if $enabled {
                    tracing::info!("Loaded source: {}", $name);
                    sources.push(Box::new($ctor));
                }
            };
        }

        register_source!(config.http, "http", HttpResolver::new());
        register_source!(config.ytdlp, "yt-dlp", YtDlpResolver::new(config));

        if sources.is_empty() {
            tracing::warn!("No sources enabled; every query will be rejected");
        }

        Self { sources }
    }

    pub fn from_sources(sources: Vec<BoxedResolver>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }
}

#[async_trait]
impl TrackResolver for SourceManager {
    fn name(&self) -> &str {
        "manager"
    }

    fn can_handle(&self, query: &str) -> bool {
        self.sources.iter().any(|s| s.can_handle(query))
    }

    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError> {
        for source in &self.sources {
            if source.can_handle(query) {
                tracing::trace!("Resolving '{}' with source: {}", query, source.name());
                return source.resolve(query).await;
            }
        }

        tracing::debug!("No source could handle query: {}", query);
        Err(ResolveError::Unsupported(query.to_string()))
    }
}
