use tokio_util::sync::CancellationToken;

use crate::{
    llm::{summarizer::Summarizer, CompletionService, ModelOptions},
    reducer::Reducer,
    segmenter::Segmenter,
    sink::{FragmentSink, ProgressSink, Silent, Stdout},
    Error, Pipeline, Selection,
};

pub struct PipelineBuilder<C = ()> {
    completer: C,
    max_size: usize,
    selection: Selection,
    stream: bool,
    language: String,
    options: ModelOptions,
    cancel: CancellationToken,
    output: Box<dyn FragmentSink>,
    progress: Box<dyn ProgressSink>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub const DEFAULT_MAX_SIZE: usize = 5000;

    pub fn new() -> Self {
        Self {
            completer: (),
            max_size: Self::DEFAULT_MAX_SIZE,
            selection: Selection::default(),
            stream: true,
            language: "en".into(),
            options: ModelOptions::default(),
            cancel: CancellationToken::new(),
            output: Box::new(Stdout),
            progress: Box::new(Silent),
        }
    }
}

impl<C> PipelineBuilder<C> {
    pub fn completer<C2: CompletionService>(self, completer: C2) -> PipelineBuilder<C2> {
        PipelineBuilder {
            completer,
            max_size: self.max_size,
            selection: self.selection,
            stream: self.stream,
            language: self.language,
            options: self.options,
            cancel: self.cancel,
            output: self.output,
            progress: self.progress,
        }
    }

    /// Maximum characters summarized in one request.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Whether summaries are written out while they are generated.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Language used to split documents into sentences.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn model_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn output(mut self, output: impl FragmentSink + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }
}

impl<C: CompletionService> PipelineBuilder<C> {
    pub fn build(self) -> Result<Pipeline<C>, Error> {
        if self.options.model.trim().is_empty() {
            return Err(Error::InvalidConfiguration("model name must not be empty".into()));
        }

        let summarizer = Summarizer::new(self.completer, self.options, self.cancel);
        let reducer = Reducer::new(summarizer, Segmenter::new(&self.language), self.max_size)?;

        Ok(Pipeline {
            reducer,
            selection: self.selection,
            stream: self.stream,
            output: self.output,
            progress: self.progress,
        })
    }
}
