use thiserror::Error;

/// Failure in a store backend. Always surfaced, never degraded: the caller
/// cannot tell "no results" from "misconfigured" otherwise.
#[derive(Debug, Error)]
#[error("store backend error: {0}")]
pub struct StoreError(pub String);

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document not found: {0}")]
    DocumentNotFound(i64),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid chunk: {0}")]
    InvalidChunk(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Vectors of different lengths indicate a corrupted or mixed-generation
    /// index. Hard failure, never masked.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;
