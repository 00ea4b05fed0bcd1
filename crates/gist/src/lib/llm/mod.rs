pub mod openai;
mod sse;
pub mod summarizer;

use std::future::Future;

use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::BoxError;

/// A completion delivered piece by piece.
pub type FragmentStream<E> = BoxStream<'static, Result<String, E>>;

/// A text-completion backend.
pub trait CompletionService {
    type Error: Into<BoxError>;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>>;

    fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<FragmentStream<Self::Error>, Self::Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: usize,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// Model settings shared by every request of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    pub model: String,
    /// Completion budget for per-chunk summaries.
    pub max_tokens: usize,
    pub temperature: f32,
}

impl ModelOptions {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_MAX_TOKENS: usize = 2048;
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.into(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}
