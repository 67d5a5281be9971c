use crate::chunking::{self, ChunkingConfig};
use crate::embeddings::EmbeddingProvider;
use crate::error::IndexError;
use crate::extract::{page_image_refs, TextExtractor};
use crate::models::{Chunk, Document};
use crate::store::ArticleStore;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

pub const DEFAULT_EXTRACTION_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct IndexOutcome {
    pub chunk_count: usize,
}

#[derive(Debug)]
struct PageExtract {
    number: u32,
    text: String,
}

/// Per-document indexing pipeline: rasterized pages in, embedded chunks out.
///
/// Not safe to run concurrently for the same document; callers serialize
/// re-indexing per document. Different documents are independent.
pub struct Indexer<S, X, E> {
    store: S,
    extractor: X,
    embedder: E,
    chunking: ChunkingConfig,
    extraction_concurrency: usize,
}

impl<S, X, E> Indexer<S, X, E>
where
    S: ArticleStore,
    X: TextExtractor,
    E: EmbeddingProvider,
{
    pub fn new(store: S, extractor: X, embedder: E) -> Self {
        Self {
            store,
            extractor,
            embedder,
            chunking: ChunkingConfig::default(),
            extraction_concurrency: DEFAULT_EXTRACTION_CONCURRENCY,
        }
    }

    pub fn with_chunking(mut self, config: ChunkingConfig) -> Self {
        self.chunking = config;
        self
    }

    pub fn with_extraction_concurrency(mut self, cap: usize) -> Self {
        self.extraction_concurrency = cap.max(1);
        self
    }

    /// Extracts, chunks, embeds, and persists one document, replacing any
    /// prior chunk set. Returns the count of persisted chunks.
    ///
    /// A failed page is skipped with a warning; a chunk the provider returns
    /// no embedding for is not persisted. Chunk indices increment globally
    /// across pages, gapless from zero.
    pub async fn index_document(&self, article_id: i64) -> Result<IndexOutcome, IndexError> {
        let document = self
            .store
            .document(article_id)
            .await?
            .ok_or(IndexError::DocumentNotFound(article_id))?;

        let pages = self.extract_pages(&document).await;

        self.store.delete_chunks(article_id).await?;

        let mut chunks = Vec::new();
        let mut cursor = 0u64;
        let mut skipped_embeddings = 0usize;

        for page in &pages {
            for piece in chunking::split(&page.text, self.chunking)? {
                match self.embedder.embed(&piece).await {
                    Some(embedding) => {
                        chunks.push(Chunk::new(
                            article_id,
                            piece,
                            Some(embedding),
                            Some(page.number),
                            cursor,
                        )?);
                        cursor += 1;
                    }
                    None => {
                        // A chunk without a vector would poison similarity
                        // scoring, so it is dropped rather than persisted.
                        skipped_embeddings += 1;
                        warn!(
                            article_id,
                            page = page.number,
                            "no embedding returned; chunk not persisted"
                        );
                    }
                }
            }
        }

        let chunk_count = chunks.len();
        self.store.replace_chunks(article_id, chunks).await?;

        info!(
            article_id,
            chunk_count, skipped_embeddings, "document indexed"
        );
        Ok(IndexOutcome { chunk_count })
    }

    pub async fn delete_chunks(&self, article_id: i64) -> Result<(), IndexError> {
        self.store.delete_chunks(article_id).await?;
        Ok(())
    }

    pub async fn regenerate_chunks(&self, article_id: i64) -> Result<IndexOutcome, IndexError> {
        self.delete_chunks(article_id).await?;
        self.index_document(article_id).await
    }

    /// OCR calls are fanned out with a bounded concurrency cap; page order is
    /// preserved in the output. A per-page failure is recorded and skipped,
    /// never escalated.
    async fn extract_pages(&self, document: &Document) -> Vec<PageExtract> {
        let refs = page_image_refs(document);

        let outcomes = stream::iter(refs.into_iter().enumerate().map(|(index, image_ref)| {
            let page = index as u32 + 1;
            async move {
                match self.extractor.extract_text(&image_ref).await {
                    Ok(text) => Some(PageExtract { number: page, text }),
                    Err(error) => {
                        warn!(
                            article_id = document.id,
                            page,
                            %error,
                            "page extraction failed; continuing with remaining pages"
                        );
                        None
                    }
                }
            }
        }))
        .buffered(self.extraction_concurrency)
        .collect::<Vec<_>>()
        .await;

        outcomes.into_iter().flatten().collect()
    }
}
