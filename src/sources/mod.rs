pub mod http;
pub mod manager;
pub mod plugin;
pub mod ytdlp;

pub use http::HttpResolver;
pub use manager::SourceManager;
pub use plugin::{BoxedResolver, TrackResolver};
pub use ytdlp::YtDlpResolver;
