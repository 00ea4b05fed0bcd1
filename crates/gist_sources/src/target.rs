use std::{fmt, path::PathBuf, sync::LazyLock};

use regex::Regex;
use url::Url;

static YT_VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|watch\?v=|youtube\.com/shorts/)([\w-]+)").unwrap()
});

/// What the user asked to summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    YouTube { url: String, video_id: String },
    Web(Url),
    /// Anything that does not look like an http(s) URL is treated as a path.
    File(PathBuf),
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        if !raw.to_lowercase().starts_with("http") {
            return Target::File(PathBuf::from(raw));
        }

        if let Some(video_id) = extract_youtube_video_id(raw) {
            return Target::YouTube {
                url: raw.to_string(),
                video_id,
            };
        }

        match Url::parse(raw) {
            Ok(url) => Target::Web(url),
            Err(e) => {
                tracing::debug!(error = %e, target = raw, "Not a valid URL, treating as a path");
                Target::File(PathBuf::from(raw))
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::YouTube { url, .. } => f.write_str(url),
            Target::Web(url) => write!(f, "{url}"),
            Target::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Extracts the video ID from the URL
/// `https://www.youtube.com/watch?v=XXX` -> `XXX`
/// `https://youtu.be/XXX` -> `XXX`
pub fn extract_youtube_video_id(url: &str) -> Option<String> {
    YT_VIDEO_ID_RE
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
