use crate::embeddings::EmbeddingProvider;
use crate::error::SearchError;
use crate::models::SearchResult;
use crate::search::hybrid::{hybrid_search, HybridWeights};
use crate::search::lexical::lexical_search;
use crate::search::semantic::semantic_search;
use crate::store::ArticleStore;

/// Query-time facade over a store and an embedding provider: the call surface
/// the chat pipeline, search UI, and admin tooling consume.
pub struct RetrievalEngine<S, E> {
    store: S,
    embedder: E,
    weights: HybridWeights,
}

impl<S, E> RetrievalEngine<S, E>
where
    S: ArticleStore,
    E: EmbeddingProvider,
{
    pub fn new(store: S, embedder: E) -> Self {
        Self {
            store,
            embedder,
            weights: HybridWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: HybridWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn lexical_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        lexical_search(&self.store, query, limit).await
    }

    pub async fn semantic_search(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> Result<Vec<SearchResult>, SearchError> {
        semantic_search(&self.store, &self.embedder, query, limit, threshold).await
    }

    pub async fn hybrid_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        hybrid_search(&self.store, &self.embedder, query, limit, self.weights).await
    }
}
