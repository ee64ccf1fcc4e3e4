// Extraction diagnostics - classifies yt-dlp failures
//
// The reason is reported to API clients next to the extractor's message and
// decides whether the failure is the caller's problem (400) or ours (500).

use serde::{Deserialize, Serialize};

/// Why yt-dlp refused or failed to extract a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    /// URL not handled by any extractor
    UnsupportedUrl,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Private video requiring authorization
    PrivateVideo,

    /// Age-restricted content requiring login (cookies)
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// DRM-protected or paid content
    DrmProtected,

    /// Member-only content (requires channel membership)
    MembersOnly,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// "Sign in to confirm you're not a bot"
    BotDetection,

    /// HTTP 403 Forbidden
    Http403Forbidden,

    /// Network timeout
    NetworkTimeout,

    /// Generic/unknown failure
    Unknown,
}

impl BlockingReason {
    /// Failures caused by the requested content itself rather than by this
    /// server or its network.
    pub fn is_content_restriction(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedUrl
                | Self::VideoUnavailable
                | Self::PrivateVideo
                | Self::AgeRestricted
                | Self::GeoBlocked
                | Self::DrmProtected
                | Self::MembersOnly
        )
    }

    /// Check if a cookie file might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::AgeRestricted
                | Self::PrivateVideo
                | Self::MembersOnly
                | Self::BotDetection
                | Self::Http403Forbidden
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "Unsupported URL",
            Self::VideoUnavailable => "Video unavailable",
            Self::PrivateVideo => "Private video",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::RateLimited => "Rate limited by the site",
            Self::BotDetection => "Bot detection triggered",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown extraction failure",
        }
    }
}

/// Analyze extractor output and return the most specific reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    if lower.contains("unsupported url") {
        return Some(BlockingReason::UnsupportedUrl);
    }

    // DRM / paid content
    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("playready")
        || lower.contains("youtube premium")
        || lower.contains("requires purchase")
        || lower.contains("requires payment")
    {
        return Some(BlockingReason::DrmProtected);
    }

    if lower.contains("members only")
        || lower.contains("members-only")
        || lower.contains("join this channel")
        || lower.contains("available to members")
    {
        return Some(BlockingReason::MembersOnly);
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age_verification")
    {
        return Some(BlockingReason::AgeRestricted);
    }

    if lower.contains("private video")
        || lower.contains("video is private")
        || lower.contains("sign in if you've been granted access")
    {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
        || lower.contains("video is unavailable")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restrict")
        || lower.contains("geo-restrict")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
    {
        return Some(BlockingReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}
