use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not extract a video id from url: {0}")]
pub struct InvalidVideoUrl(pub String);

// Watch pages, short links, embeds, direct-play paths, and shorts all
// carry the same 11-character id.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([A-Za-z0-9_-]{11})",
        )
        .expect("watch url pattern compiles"),
        Regex::new(r"youtube\.com/shorts/([A-Za-z0-9_-]{11})")
            .expect("shorts url pattern compiles"),
    ]
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("bare id pattern compiles")
});

/// Extract the 11-character video id from a url, or accept a bare id.
pub fn extract_video_id(url: &str) -> Result<String, InvalidVideoUrl> {
    for pattern in URL_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(url) {
            return Ok(captures[1].to_string());
        }
    }

    if BARE_ID.is_match(url) {
        return Ok(url.to_string());
    }

    Err(InvalidVideoUrl(url.to_string()))
}
