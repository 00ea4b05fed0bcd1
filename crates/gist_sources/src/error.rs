use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Fetch failed: {status} - {url}")]
    Status { status: u16, url: String },
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("No transcript available for video {video_id} in language '{language}'")]
    NoTranscript { video_id: String, language: String },
    #[error("PDF extraction failed for {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },
    #[error("Extracted document is empty")]
    EmptyDocument,
    #[error("Unsupported file: {}", .0.display())]
    UnsupportedFile(PathBuf),
}
