//! Splits raw text into segments: sentences where the language has sentence
//! rules, lines otherwise.

use itertools::Itertools;
use unicode_segmentation::UnicodeSegmentation;

/// Languages whose sentence boundaries follow the Unicode sentence rules
/// closely enough to be used as segments.
pub const SENTENCE_LANGUAGES: &[&str] = &[
    "am", "ar", "bg", "da", "de", "el", "en", "es", "fa", "fr", "hi", "hy", "it", "ja", "kk",
    "mr", "my", "nl", "pl", "ru", "sk", "ur", "zh",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SegmentationError {
    #[error("No sentence rules for language '{0}'")]
    UnsupportedLanguage(String),
    #[error("Text contains no sentences")]
    NoSentences,
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    language: String,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Segmenter {
    /// `language` may be a bare code (`"en"`) or a locale such as
    /// `"en_US.UTF-8"`; only the primary subtag is kept.
    pub fn new(language: &str) -> Self {
        let language = language
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        Self { language }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn supports_sentences(&self) -> bool {
        SENTENCE_LANGUAGES.contains(&self.language.as_str())
    }

    pub fn sentences(&self, text: &str) -> Result<Vec<String>, SegmentationError> {
        if !self.supports_sentences() {
            return Err(SegmentationError::UnsupportedLanguage(self.language.clone()));
        }

        let sentences = text
            .unicode_sentences()
            .map(clean)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        if sentences.is_empty() {
            return Err(SegmentationError::NoSentences);
        }

        Ok(sentences)
    }

    /// Sentences when possible, lines otherwise.
    pub fn segment(&self, text: &str) -> Vec<String> {
        match self.sentences(text) {
            Ok(sentences) => sentences,
            Err(e) => {
                tracing::debug!(reason = %e, language = %self.language, "Falling back to line segmentation");
                lines(text)
            }
        }
    }
}

/// Non-blank lines of `text`, whitespace collapsed.
pub fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(clean)
        .filter(|line| !line.is_empty())
        .collect()
}

fn clean(s: &str) -> String {
    s.split_whitespace().join(" ")
}
