use crate::embeddings::EmbeddingProvider;
use crate::error::SearchError;
use crate::models::{Chunk, Document, MatchKind, SearchResult};
use crate::search::snippet::{extract_snippet, DEFAULT_SNIPPET_CONTEXT};
use crate::similarity::cosine_similarity;
use crate::store::ArticleStore;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.4;

/// Nearest-neighbor ranking over all enabled chunks.
///
/// When the query cannot be embedded the result is an empty list, not an
/// error: the provider being down must degrade search, never break it.
/// Raising `threshold` can only shrink the result set.
pub async fn semantic_search<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    limit: usize,
    threshold: f64,
) -> Result<Vec<SearchResult>, SearchError>
where
    S: ArticleStore,
    E: EmbeddingProvider,
{
    if limit == 0 {
        return Ok(Vec::new());
    }

    let Some(query_vector) = embedder.embed(query).await else {
        return Ok(Vec::new());
    };

    let mut scored: Vec<(f64, Chunk)> = Vec::new();
    for chunk in store.enabled_chunks().await? {
        let Some(embedding) = chunk.embedding.as_ref() else {
            continue;
        };
        let similarity = cosine_similarity(&query_vector, embedding)?;
        if similarity >= threshold {
            scored.push((similarity, chunk));
        }
    }

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);

    let documents: HashMap<i64, Document> = store
        .published_documents()
        .await?
        .into_iter()
        .map(|document| (document.id, document))
        .collect();

    let mut seen: HashSet<i64> = HashSet::new();
    let mut results = Vec::new();

    for (similarity, chunk) in scored {
        // Orphaned or unpublished parents are skipped, not errors.
        let Some(document) = documents.get(&chunk.article_id) else {
            continue;
        };
        // Highest-scoring chunk per document wins; one document must not
        // crowd out others in the top N.
        if !seen.insert(chunk.article_id) {
            continue;
        }

        results.push(SearchResult {
            article_id: document.id,
            title: document.title.clone(),
            slug: document.slug.clone(),
            category: document.category.clone(),
            relevance: relevance_score(similarity),
            kind: MatchKind::Semantic,
            snippet: Some(extract_snippet(
                &chunk.chunk_text,
                query,
                DEFAULT_SNIPPET_CONTEXT,
            )),
            page_number: chunk.page_number,
        });
    }

    Ok(results)
}

fn relevance_score(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
