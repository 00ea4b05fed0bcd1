use futures::StreamExt;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};

use super::{sse, CompletionRequest, CompletionService, FragmentStream};

/// Client for OpenAI-compatible `/chat/completions` endpoints.
///
/// Transient failures (connection errors, 5xx, 429) are retried with
/// exponential backoff before an error is surfaced.
pub struct OpenAIClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("No content in response")]
    EmptyResponse,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    #[serde(flatten)]
    request: &'a CompletionRequest,
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

fn delta_content(event: &str) -> Result<Option<String>, OpenAIError> {
    let chunk = serde_json::from_str::<ChunkResponse>(event)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|c| !c.is_empty()))
}

impl OpenAIClient {
    pub const BASE_URL: &str = "https://api.openai.com/v1";
    const MAX_RETRIES: u32 = 3;

    pub fn new(api_key: impl Into<String>) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(Self::MAX_RETRIES);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            api_key: api_key.into(),
            base_url: Self::BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[tracing::instrument(skip_all, fields(model = %request.model, stream = stream))]
    async fn send_chat_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, OpenAIError> {
        let body = serde_json::to_vec(&ChatBody { request, stream })?;

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            tracing::error!(status, %message, "Completion request rejected");
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp)
    }
}

impl CompletionService for OpenAIClient {
    type Error = OpenAIError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let response = self
            .send_chat_request(request, false)
            .await?
            .json::<CompletionResponse>()
            .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(OpenAIError::EmptyResponse)?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Completion was cut off at the token limit");
        }

        choice.message.content.ok_or(OpenAIError::EmptyResponse)
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream<Self::Error>, Self::Error> {
        let resp = self.send_chat_request(request, true).await?;

        let fragments = sse::data_events(resp.bytes_stream()).filter_map(|event| async move {
            match event.map_err(OpenAIError::from).and_then(|e| delta_content(&e)) {
                Ok(Some(content)) => Some(Ok(content)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        });

        Ok(fragments.boxed())
    }
}
