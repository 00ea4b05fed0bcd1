use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{CompletionRequest, CompletionService, Message, ModelOptions};
use crate::{sink::FragmentSink, Error};

/// How a completion reaches the caller.
pub enum Delivery<'s> {
    /// Returned whole once complete.
    Buffered,
    /// Forwarded fragment by fragment as it arrives, and also returned whole.
    Streamed(&'s mut dyn FragmentSink),
}

/// Applies instructions to text through a [`CompletionService`].
pub struct Summarizer<C> {
    completer: C,
    options: ModelOptions,
    cancel: CancellationToken,
}

impl<C: CompletionService> Summarizer<C> {
    pub const KEY_POINTS: &str = include_str!("./prompts/key_points.txt");
    pub const EXECUTIVE_SUMMARY: &str = include_str!("./prompts/executive_summary.txt");
    const TLDR_MARKER: &str = "\n\nTL;DR\n";

    pub fn new(completer: C, options: ModelOptions, cancel: CancellationToken) -> Self {
        Self {
            completer,
            options,
            cancel,
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// The instruction goes first and is acknowledged, so the model treats
    /// the text that follows as material rather than as a request.
    pub fn edit_request(&self, instruction: &str, text: &str, max_tokens: usize) -> CompletionRequest {
        CompletionRequest {
            model: self.options.model.clone(),
            messages: vec![
                Message::user(instruction),
                Message::assistant("OK"),
                Message::user(text),
            ],
            max_tokens,
            temperature: self.options.temperature,
            stop: Vec::new(),
        }
    }

    pub fn tldr_request(&self, text: &str, max_tokens: usize) -> CompletionRequest {
        CompletionRequest {
            model: self.options.model.clone(),
            messages: vec![Message::user(format!("{text}{}", Self::TLDR_MARKER))],
            max_tokens,
            temperature: self.options.temperature,
            stop: vec!["\n\n".into()],
        }
    }

    pub async fn summarize(&self, index: usize, instruction: &str, chunk: &str) -> Result<String, Error> {
        let request = self.edit_request(instruction, chunk, self.options.max_tokens);
        self.call(index, &request, Delivery::Buffered).await
    }

    pub async fn summarize_streamed(
        &self,
        index: usize,
        instruction: &str,
        chunk: &str,
        sink: &mut dyn FragmentSink,
    ) -> Result<String, Error> {
        let request = self.edit_request(instruction, chunk, self.options.max_tokens);
        self.call(index, &request, Delivery::Streamed(sink)).await
    }

    /// Like [`Self::summarize`], with an explicit completion budget.
    pub async fn edit(
        &self,
        index: usize,
        instruction: &str,
        text: &str,
        max_tokens: usize,
        delivery: Delivery<'_>,
    ) -> Result<String, Error> {
        let request = self.edit_request(instruction, text, max_tokens);
        self.call(index, &request, delivery).await
    }

    pub async fn tldr(&self, text: &str, max_tokens: usize, delivery: Delivery<'_>) -> Result<String, Error> {
        let request = self.tldr_request(text, max_tokens);
        self.call(0, &request, delivery).await
    }

    /// Every request to the completion service passes through here.
    ///
    /// Cancellation is checked before the request, while it is in flight and
    /// between streamed fragments. Nothing is forwarded to the sink once it
    /// has been observed.
    #[tracing::instrument(skip_all, fields(chunk_index = index, model = %request.model))]
    pub async fn call(
        &self,
        index: usize,
        request: &CompletionRequest,
        delivery: Delivery<'_>,
    ) -> Result<String, Error> {
        match delivery {
            Delivery::Buffered => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(Error::Cancelled),
                    result = self.completer.complete(request) => result
                        .map_err(|e| Error::summarization(index, e))
                        .inspect_err(|e| tracing::error!(error = %e, "Completion failed")),
                }
            }
            Delivery::Streamed(sink) => {
                let mut stream = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                    result = self.completer.complete_stream(request) => result
                        .map_err(|e| Error::summarization(index, e))
                        .inspect_err(|e| tracing::error!(error = %e, "Completion stream failed to start"))?,
                };

                let mut text = String::new();
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => None,
                        next = stream.next() => Some(next),
                    };

                    match next {
                        // cancelled: close the partial line before bailing out
                        None => {
                            if !text.is_empty() {
                                sink.end_response()?;
                            }
                            return Err(Error::Cancelled);
                        }
                        Some(Some(Ok(fragment))) => {
                            sink.fragment(&fragment)?;
                            text.push_str(&fragment);
                        }
                        Some(Some(Err(e))) => {
                            if !text.is_empty() {
                                sink.end_response()?;
                            }
                            let e = Error::summarization(index, e);
                            tracing::error!(error = %e, "Completion stream broke off");
                            return Err(e);
                        }
                        Some(None) => break,
                    }
                }

                sink.end_response()?;
                Ok(text)
            }
        }
    }
}
