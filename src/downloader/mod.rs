// Downloader module - extraction, catalog and merge layer under the HTTP API

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod merger;
pub mod models;
pub mod subtitles;
pub mod tools;
pub mod utils;

pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use merger::{FfmpegMerger, MergeExecutor, MergedFile};
pub use models::{
    CatalogEntry, DownloadLink, MergePlan, StreamDescriptor, StreamKind, SubtitleTrack,
    VideoInfoResponse, VideoMetadata,
};
