use crate::error::StoreError;
use crate::models::{Chunk, Document};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed record store over documents and their chunk sets.
///
/// The indexer is the only writer of chunks (callers serialize re-indexing
/// per document); both search branches read. `replace_chunks` must be atomic
/// from a reader's perspective: a concurrent search sees the old set or the
/// new set, never a mix of the two.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn document(&self, article_id: i64) -> Result<Option<Document>, StoreError>;

    async fn upsert_document(&self, document: Document) -> Result<(), StoreError>;

    async fn published_documents(&self) -> Result<Vec<Document>, StoreError>;

    /// All chunks participating in semantic search, across every document.
    /// Soft-disabled chunks are excluded here, not deleted.
    async fn enabled_chunks(&self) -> Result<Vec<Chunk>, StoreError>;

    async fn chunks_for(&self, article_id: i64) -> Result<Vec<Chunk>, StoreError>;

    async fn replace_chunks(&self, article_id: i64, chunks: Vec<Chunk>) -> Result<(), StoreError>;

    async fn delete_chunks(&self, article_id: i64) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ArticleStore + ?Sized> ArticleStore for std::sync::Arc<S> {
    async fn document(&self, article_id: i64) -> Result<Option<Document>, StoreError> {
        (**self).document(article_id).await
    }

    async fn upsert_document(&self, document: Document) -> Result<(), StoreError> {
        (**self).upsert_document(document).await
    }

    async fn published_documents(&self) -> Result<Vec<Document>, StoreError> {
        (**self).published_documents().await
    }

    async fn enabled_chunks(&self) -> Result<Vec<Chunk>, StoreError> {
        (**self).enabled_chunks().await
    }

    async fn chunks_for(&self, article_id: i64) -> Result<Vec<Chunk>, StoreError> {
        (**self).chunks_for(article_id).await
    }

    async fn replace_chunks(&self, article_id: i64, chunks: Vec<Chunk>) -> Result<(), StoreError> {
        (**self).replace_chunks(article_id, chunks).await
    }

    async fn delete_chunks(&self, article_id: i64) -> Result<(), StoreError> {
        (**self).delete_chunks(article_id).await
    }
}

/// In-process store backed by RwLock-guarded maps. Used by the CLI and tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<i64, Document>,
    chunks: HashMap<i64, Vec<Chunk>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft-disables or re-enables one chunk. Returns false when no chunk
    /// with that index exists for the document.
    pub async fn set_chunk_enabled(
        &self,
        article_id: i64,
        chunk_index: u64,
        enabled: bool,
    ) -> bool {
        let mut inner = self.inner.write().await;
        let Some(chunks) = inner.chunks.get_mut(&article_id) else {
            return false;
        };

        match chunks.iter_mut().find(|chunk| chunk.chunk_index == chunk_index) {
            Some(chunk) => {
                chunk.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn document(&self, article_id: i64) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.read().await.documents.get(&article_id).cloned())
    }

    async fn upsert_document(&self, document: Document) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .documents
            .insert(document.id, document);
        Ok(())
    }

    async fn published_documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .documents
            .values()
            .filter(|document| document.published)
            .cloned()
            .collect())
    }

    async fn enabled_chunks(&self) -> Result<Vec<Chunk>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .chunks
            .values()
            .flatten()
            .filter(|chunk| chunk.enabled)
            .cloned()
            .collect())
    }

    async fn chunks_for(&self, article_id: i64) -> Result<Vec<Chunk>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .chunks
            .get(&article_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_chunks(&self, article_id: i64, chunks: Vec<Chunk>) -> Result<(), StoreError> {
        self.inner.write().await.chunks.insert(article_id, chunks);
        Ok(())
    }

    async fn delete_chunks(&self, article_id: i64) -> Result<(), StoreError> {
        self.inner.write().await.chunks.remove(&article_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chunk(article_id: i64, index: u64, enabled: bool) -> Chunk {
        let mut chunk = Chunk::new(
            article_id,
            format!("chunk {index}"),
            Some(vec![1.0, 0.0]),
            Some(1),
            index,
        )
        .unwrap();
        chunk.enabled = enabled;
        chunk
    }

    #[tokio::test]
    async fn replace_chunks_swaps_the_full_set() {
        let store = MemoryStore::new();
        store
            .replace_chunks(1, vec![chunk(1, 0, true), chunk(1, 1, true)])
            .await
            .unwrap();
        store.replace_chunks(1, vec![chunk(1, 0, true)]).await.unwrap();

        let chunks = store.chunks_for(1).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[tokio::test]
    async fn enabled_chunks_excludes_soft_disabled() {
        let store = MemoryStore::new();
        store
            .replace_chunks(1, vec![chunk(1, 0, true), chunk(1, 1, false)])
            .await
            .unwrap();

        let enabled = store.enabled_chunks().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].chunk_index, 0);

        // Disabled chunks still exist in storage.
        assert_eq!(store.chunks_for(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn set_chunk_enabled_targets_one_chunk() {
        let store = MemoryStore::new();
        store
            .replace_chunks(1, vec![chunk(1, 0, true), chunk(1, 1, true)])
            .await
            .unwrap();

        assert!(store.set_chunk_enabled(1, 1, false).await);
        assert!(!store.set_chunk_enabled(1, 9, false).await);
        assert_eq!(store.enabled_chunks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn published_documents_filters_drafts() {
        let store = MemoryStore::new();
        let mut published = Document {
            id: 1,
            title: "Published".to_string(),
            slug: "published".to_string(),
            category: "general".to_string(),
            description: String::new(),
            page_count: 1,
            published: true,
            updated_at: Utc::now(),
        };
        store.upsert_document(published.clone()).await.unwrap();

        published.id = 2;
        published.published = false;
        store.upsert_document(published).await.unwrap();

        let listed = store.published_documents().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 1);
    }
}
