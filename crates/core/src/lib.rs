pub mod chunking;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod models;
pub mod search;
pub mod similarity;
pub mod store;

pub use chunking::{split, ChunkSplitter, ChunkingConfig};
pub use embeddings::{
    EmbeddingProvider, HashEmbedder, HttpEmbeddingClient, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_KEY_SOURCES,
};
pub use engine::RetrievalEngine;
pub use error::{IndexError, SearchError, StoreError};
pub use extract::{page_image_refs, TextExtractor};
pub use indexer::{IndexOutcome, Indexer, DEFAULT_EXTRACTION_CONCURRENCY};
pub use models::{Chunk, Document, MatchKind, SearchResult, CHUNK_TEXT_MAX_CHARS};
pub use search::hybrid::{hybrid_search, HybridWeights};
pub use search::lexical::{lexical_search, LEXICAL_MATCH_RELEVANCE};
pub use search::semantic::{semantic_search, DEFAULT_SEMANTIC_THRESHOLD};
pub use search::snippet::{extract_snippet, DEFAULT_SNIPPET_CONTEXT};
pub use similarity::cosine_similarity;
pub use store::{ArticleStore, MemoryStore};
