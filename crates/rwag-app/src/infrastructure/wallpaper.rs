//! Wallpaper-of-the-day metadata.
//!
//! The Bing image archive endpoint returns JSON shaped like
//!
//! ```json
//! { "images": [ { "url": "/th?id=OHR.Example_1920x1080.jpg", ... } ] }
//! ```
//!
//! where `url` is relative to the Bing host. This module only interprets that
//! document; fetching it is delegated to a [`WallpaperFetcher`] supplied by
//! the host application, which owns the HTTP client.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Host prepended to the relative image URL in the archive response.
pub const BING_HOST: &str = "https://cn.bing.com";

/// Fetches the text body of a URL.
///
/// Production implementations wrap an HTTP client; tests use the generated
/// `MockWallpaperFetcher`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WallpaperFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("failed to fetch wallpaper metadata: {0}")]
    Fetch(String),

    #[error("malformed wallpaper metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("wallpaper metadata contains no image URL")]
    MissingUrl,
}

#[derive(Deserialize)]
struct Archive {
    #[serde(default)]
    images: Vec<ArchiveImage>,
}

#[derive(Deserialize)]
struct ArchiveImage {
    url: Option<String>,
}

/// Extracts the first image URL from an archive response and makes it
/// absolute.
pub fn parse_wallpaper_url(json: &str) -> Result<String, WallpaperError> {
    let archive: Archive = serde_json::from_str(json)?;
    let url = archive
        .images
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .filter(|url| !url.is_empty())
        .ok_or(WallpaperError::MissingUrl)?;

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Ok(format!("{BING_HOST}{url}"))
    }
}

/// Fetches `endpoint` and returns today's absolute image URL.
pub async fn fetch_wallpaper_url(
    fetcher: &dyn WallpaperFetcher,
    endpoint: &str,
) -> Result<String, WallpaperError> {
    let body = fetcher
        .fetch_text(endpoint)
        .await
        .map_err(|e| WallpaperError::Fetch(format!("{e:#}")))?;
    let url = parse_wallpaper_url(&body)?;
    debug!(%url, "wallpaper of the day resolved");
    Ok(url)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
