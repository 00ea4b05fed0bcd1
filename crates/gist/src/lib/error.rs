pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Summarization failed for chunk {chunk_index}: {source}")]
    Summarization {
        chunk_index: usize,
        #[source]
        source: BoxError,
    },
    #[error("Cancelled")]
    Cancelled,
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    pub fn summarization(chunk_index: usize, source: impl Into<BoxError>) -> Self {
        Error::Summarization {
            chunk_index,
            source: source.into(),
        }
    }
}
