use async_trait::async_trait;

use crate::{common::ResolveError, playback::Track};

/// Turns a free-text query into playable tracks.
///
/// Each source (direct URLs, yt-dlp search, ...) implements this trait. The
/// first returned track is the best match.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Unique identifier for this source (e.g. "http", "ytdlp").
    fn name(&self) -> &str;

    /// Check if this source can handle the given query.
    fn can_handle(&self, query: &str) -> bool;

    /// Resolve the query. An empty result means "no results", not a fault.
    async fn resolve(&self, query: &str) -> Result<Vec<Track>, ResolveError>;
}

pub type BoxedResolver = Box<dyn TrackResolver>;
