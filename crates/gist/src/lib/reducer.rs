//! # Recursive reduction
//!
//! One pass chunks its input, summarizes every chunk in order and joins the
//! summaries. [`Reducer::reduce_until_fits`] repeats passes until the text
//! fits the budget, stopping early when a pass fails to shrink its input.

use std::{borrow::Cow, fmt};

use crate::{
    chunker::chunk,
    llm::{summarizer::Summarizer, CompletionService},
    segmenter::Segmenter,
    sink::{Discard, FragmentSink, ProgressSink},
    Error,
};

pub enum ReduceInput<'a> {
    Segments(&'a [String]),
    /// Raw text, split by the reducer's [`Segmenter`].
    Text(&'a str),
}

/// A reduction pass whose output was not shorter than its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoProgress {
    pub pass: usize,
    pub input_len: usize,
    pub output_len: usize,
}

impl fmt::Display for NoProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "summary pass {} did not shrink the text ({} -> {} chars), keeping its input",
            self.pass, self.input_len, self.output_len
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub text: String,
    pub passes: usize,
    pub warning: Option<NoProgress>,
}

pub struct Reducer<C> {
    summarizer: Summarizer<C>,
    segmenter: Segmenter,
    max_size: usize,
}

impl<C: CompletionService> Reducer<C> {
    pub fn new(summarizer: Summarizer<C>, segmenter: Segmenter, max_size: usize) -> Result<Self, Error> {
        if max_size == 0 {
            return Err(Error::InvalidConfiguration(
                "max_size must be a positive number of characters".into(),
            ));
        }

        Ok(Self {
            summarizer,
            segmenter,
            max_size,
        })
    }

    pub fn summarizer(&self) -> &Summarizer<C> {
        &self.summarizer
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Runs a single pass: segment, chunk, summarize each chunk, join.
    ///
    /// When `stream` is set every chunk summary is forwarded to `output` as
    /// it is produced.
    #[tracing::instrument(skip_all, fields(max_size = self.max_size, stream = stream))]
    pub async fn reduce(
        &self,
        input: ReduceInput<'_>,
        instruction: &str,
        stream: bool,
        output: &mut dyn FragmentSink,
        progress: &mut dyn ProgressSink,
    ) -> Result<String, Error> {
        let segments = match input {
            ReduceInput::Segments(segments) => Cow::Borrowed(segments),
            ReduceInput::Text(text) => Cow::Owned(self.segmenter.segment(text)),
        };

        let chunks = chunk(&*segments, self.max_size)?;
        let total = chunks.len();
        tracing::debug!(segments = segments.len(), chunks = total, "Summarizing chunks");

        let mut summaries = Vec::with_capacity(total);
        for (n, chunk) in chunks.iter().enumerate() {
            progress.report(100.0 * n as f64 / total as f64);

            let summary = if stream {
                self.summarizer
                    .summarize_streamed(n, instruction, chunk, &mut *output)
                    .await?
            } else {
                self.summarizer.summarize(n, instruction, chunk).await?
            };
            summaries.push(summary);
        }
        progress.finish();

        Ok(summaries.join("\n"))
    }

    /// Re-summarizes `text` line by line until it is at most `max_size`
    /// characters long. Intermediate passes are never streamed.
    ///
    /// A pass that does not shrink its input ends the reduction with that
    /// input as the result and a [`NoProgress`] warning.
    #[tracing::instrument(skip_all, fields(max_size = self.max_size))]
    pub async fn reduce_until_fits(
        &self,
        text: String,
        instruction: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<Reduction, Error> {
        let mut text = text;
        let mut passes = 0;

        loop {
            let input_len = text.chars().count();
            if input_len <= self.max_size {
                break;
            }
            passes += 1;

            let lines = text
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            let output = self
                .reduce(ReduceInput::Segments(&lines), instruction, false, &mut Discard, progress)
                .await?;

            let output_len = output.chars().count();
            tracing::info!(pass = passes, input_len, output_len, "Reduction pass done");

            if output_len >= input_len {
                let warning = NoProgress {
                    pass: passes,
                    input_len,
                    output_len,
                };
                tracing::warn!(%warning, "Reduction stalled");
                return Ok(Reduction {
                    text,
                    passes,
                    warning: Some(warning),
                });
            }

            text = output;
        }

        Ok(Reduction {
            text,
            passes,
            warning: None,
        })
    }
}
