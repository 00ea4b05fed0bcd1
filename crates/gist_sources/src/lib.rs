//! # Sources
//!
//! Text extraction for the summarizer: web pages, YouTube transcripts and local
//! files. Every source yields an [`Extracted`] document; failures can be
//! degraded to a placeholder document with [`extract_or_placeholder`] so that a
//! run always produces some output.

mod error;
pub mod file;
mod target;
pub mod web;
pub mod youtube;

use std::future::Future;

pub use error::ExtractError;
pub use target::{extract_youtube_video_id, Target};
use youtube::{TranscriptLookup, YouTube};

/// A document as handed over by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Already split into natural units, in document order.
    Segments(Vec<String>),
    /// One blob; the summarizer segments it.
    Text(String),
}

pub trait TextSource {
    fn fetch(&self, target: &Target) -> impl Future<Output = Result<Extracted, ExtractError>>;
}

pub struct Extractor {
    client: reqwest::Client,
    youtube: YouTube,
    language: String,
}

impl Extractor {
    pub fn new(language: impl Into<String>) -> Self {
        let client = reqwest::Client::new();
        Self {
            youtube: YouTube::new(client.clone()),
            client,
            language: language.into(),
        }
    }

    pub fn with_youtube(mut self, youtube: YouTube) -> Self {
        self.youtube = youtube;
        self
    }
}

impl TextSource for Extractor {
    #[tracing::instrument(skip(self), fields(language = %self.language))]
    async fn fetch(&self, target: &Target) -> Result<Extracted, ExtractError> {
        match target {
            Target::YouTube { video_id, .. } => {
                match self.youtube.transcript(video_id, &self.language).await? {
                    TranscriptLookup::Found(lines) => Ok(Extracted::Text(lines.join(" "))),
                    TranscriptLookup::Unavailable => Err(ExtractError::NoTranscript {
                        video_id: video_id.clone(),
                        language: self.language.clone(),
                    }),
                }
            }
            Target::Web(url) => {
                let html = web::fetch_html(&self.client, url.as_str()).await?;
                Ok(Extracted::Text(web::html_text(&html)))
            }
            Target::File(path) => Ok(Extracted::Text(file::read_text(path).await?)),
        }
    }
}

/// The marker text that stands in for a document that could not be read.
pub fn placeholder(target: &Target, error: &ExtractError) -> String {
    match (target, error) {
        (Target::YouTube { url, .. }, ExtractError::NoTranscript { language, .. }) => {
            format!("No {language} transcript found for this video: {url}")
        }
        (Target::File(path), _) => format!("No text found for this file: {}", path.display()),
        _ => format!("No text found for this url: {target}"),
    }
}

/// Fetches `target`, replacing any extraction failure by a one-segment
/// placeholder document.
pub async fn extract_or_placeholder<S: TextSource>(source: &S, target: &Target) -> Extracted {
    match source.fetch(target).await {
        Ok(Extracted::Text(text)) if text.trim().is_empty() => {
            tracing::warn!(%target, "Extracted document is empty");
            Extracted::Segments(vec![placeholder(target, &ExtractError::EmptyDocument)])
        }
        Ok(extracted) => extracted,
        Err(e) => {
            tracing::warn!(error = %e, %target, "Failed to extract text, continuing with a placeholder");
            Extracted::Segments(vec![placeholder(target, &e)])
        }
    }
}
