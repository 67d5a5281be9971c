use crate::error::IndexError;
use crate::models::Document;
use async_trait::async_trait;

/// Opaque OCR collaborator: one call per rasterized page image.
///
/// Implementations may fail per page; the indexer catches and continues.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image_ref: &str) -> Result<String, IndexError>;
}

/// Derives the ordered page-image references for a document: one per page,
/// 1-based, zero-padded.
pub fn page_image_refs(document: &Document) -> Vec<String> {
    (1..=document.page_count)
        .map(|page| format!("documents/{}/pages/page-{page:03}.png", document.id))
        .collect()
}
