mod chunker;
mod error;
mod llm;
mod pipeline;
mod reducer;
pub mod segmenter;
pub mod sink;
pub mod tracing;

pub use chunker::{chunk, chunk_width, ELLIPSIS, WORD_SEARCH_LIMIT};
pub use error::{BoxError, Error};
pub use llm::openai;
pub use llm::{
    summarizer::{Delivery, Summarizer},
    CompletionRequest, CompletionService, FragmentStream, Message, ModelOptions, Role,
};
pub use pipeline::{builder::PipelineBuilder, Digest, Pipeline, Selection};
pub use reducer::{NoProgress, ReduceInput, Reducer, Reduction};
pub use segmenter::Segmenter;
