use std::sync::{Arc, Mutex};

use futures::{stream, StreamExt};
use gist::{CompletionRequest, CompletionService, FragmentStream, Summarizer};

pub const KEY_POINTS_REPLY: &str = "- key point";
pub const EXECUTIVE_SUMMARY_REPLY: &str = "The session covered the budget.";
pub const TLDR_REPLY: &str = "Budget passed.";

#[derive(Clone, Default)]
pub struct MockCompleter {
    pub pass_through: bool,
    pub fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<CompletionRequest>>>,
    pub stream_calls: Arc<Mutex<usize>>,
}

impl MockCompleter {
    /// Replies with a fixed text per kind of request.
    pub fn scripted() -> Self {
        Self::default()
    }

    /// Replies with the text it was given.
    pub fn pass_through() -> Self {
        Self {
            pass_through: true,
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    fn answer(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let first = request.messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        let last = request.messages.last().map(|m| m.content.as_str()).unwrap_or_default();

        if self.pass_through {
            return Ok(last.to_string());
        }

        let reply = if first == Summarizer::<MockCompleter>::EXECUTIVE_SUMMARY {
            EXECUTIVE_SUMMARY_REPLY
        } else if last.ends_with("\n\nTL;DR\n") {
            TLDR_REPLY
        } else {
            KEY_POINTS_REPLY
        };
        Ok(reply.to_string())
    }
}

impl CompletionService for MockCompleter {
    type Error = anyhow::Error;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.answer(request)
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream<Self::Error>, Self::Error> {
        *self.stream_calls.lock().unwrap() += 1;
        let answer = self.answer(request)?;

        // one fragment per word, spaces kept
        let fragments = answer
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect::<Vec<_>>();
        Ok(stream::iter(fragments).boxed())
    }
}
