pub mod builder;

use gist_sources::Extracted;

use crate::{
    llm::{
        summarizer::{Delivery, Summarizer},
        CompletionService,
    },
    reducer::{NoProgress, ReduceInput, Reducer},
    sink::{FragmentSink, ProgressSink},
    Error,
};

/// Which sections a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Bullet points, optionally followed by the final sections.
    Full { executive_summary: bool, tldr: bool },
    /// Only the executive summary, computed from the document itself.
    ExecutiveSummaryOnly,
    /// Only the TL;DR, computed from the document itself.
    TldrOnly,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Full {
            executive_summary: false,
            tldr: false,
        }
    }
}

impl Selection {
    /// Resolves the command-line flags. Asking for the executive summary
    /// alone wins over asking for the TL;DR alone.
    pub fn from_flags(
        executive_summary: bool,
        executive_summary_only: bool,
        tldr: bool,
        tldr_only: bool,
    ) -> Self {
        if executive_summary_only {
            Selection::ExecutiveSummaryOnly
        } else if tldr_only {
            Selection::TldrOnly
        } else {
            Selection::Full {
                executive_summary,
                tldr,
            }
        }
    }

    fn bullets(&self) -> bool {
        matches!(self, Selection::Full { .. })
    }

    fn executive_summary(&self) -> bool {
        matches!(
            self,
            Selection::Full {
                executive_summary: true,
                ..
            } | Selection::ExecutiveSummaryOnly
        )
    }

    fn tldr(&self) -> bool {
        matches!(self, Selection::Full { tldr: true, .. } | Selection::TldrOnly)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
    pub bullets: Option<String>,
    pub executive_summary: Option<String>,
    pub tldr: Option<String>,
    pub warnings: Vec<NoProgress>,
}

/// Drives a document through the bullet pass and the final sections,
/// writing every section to its output sink.
pub struct Pipeline<C> {
    reducer: Reducer<C>,
    selection: Selection,
    stream: bool,
    output: Box<dyn FragmentSink>,
    progress: Box<dyn ProgressSink>,
}

impl<C: CompletionService> Pipeline<C> {
    pub fn summarizer(&self) -> &Summarizer<C> {
        self.reducer.summarizer()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    fn normalize(&self, document: Extracted) -> Vec<String> {
        match document {
            Extracted::Segments(segments) => segments,
            Extracted::Text(text) => self.reducer.segmenter().segment(&text),
        }
    }

    fn print(&mut self, text: &str) -> Result<(), Error> {
        self.output.fragment(text)?;
        self.output.end_response()?;
        Ok(())
    }

    /// Prints a section heading, preceded by a blank line. "Only" modes
    /// print the bare section.
    fn heading(&mut self, title: &str) -> Result<(), Error> {
        if self.selection.bullets() {
            self.print(&format!("\n{title}"))?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(selection = ?self.selection, stream = self.stream))]
    pub async fn run(&mut self, document: Extracted) -> Result<Digest, Error> {
        let max_size = self.reducer.max_size();
        let segments = self.normalize(document);
        tracing::info!(segments = segments.len(), "Document ready");

        let mut digest = Digest::default();

        let working = if self.selection.bullets() {
            let bullets = self
                .reducer
                .reduce(
                    ReduceInput::Segments(&segments),
                    Summarizer::<C>::KEY_POINTS,
                    self.stream,
                    &mut *self.output,
                    &mut *self.progress,
                )
                .await?;

            if !self.stream {
                self.print(&bullets)?;
            }
            digest.bullets = Some(bullets.clone());
            bullets
        } else {
            segments.join("\n")
        };

        if !(self.selection.executive_summary() || self.selection.tldr()) {
            return Ok(digest);
        }

        let fitted = if working.chars().count() > max_size {
            let reduction = self
                .reducer
                .reduce_until_fits(working, Summarizer::<C>::KEY_POINTS, &mut *self.progress)
                .await?;
            digest.warnings.extend(reduction.warning);
            reduction.text
        } else {
            working
        };

        if self.selection.executive_summary() {
            self.heading("Executive Summary")?;
            let delivery = if self.stream {
                Delivery::Streamed(&mut *self.output)
            } else {
                Delivery::Buffered
            };
            let summary = self
                .reducer
                .summarizer()
                .edit(0, Summarizer::<C>::EXECUTIVE_SUMMARY, &fitted, max_size, delivery)
                .await?;
            if !self.stream {
                self.print(&summary)?;
            }
            digest.executive_summary = Some(summary);
        }

        if self.selection.tldr() {
            self.heading("TL;DR")?;
            let delivery = if self.stream {
                Delivery::Streamed(&mut *self.output)
            } else {
                Delivery::Buffered
            };
            let tldr = self
                .reducer
                .summarizer()
                .tldr(&fitted, max_size, delivery)
                .await?;
            if !self.stream {
                self.print(&tldr)?;
            }
            digest.tldr = Some(tldr);
        }

        Ok(digest)
    }
}
