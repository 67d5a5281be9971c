use crate::embeddings::EmbeddingProvider;
use crate::error::SearchError;
use crate::models::{MatchKind, SearchResult};
use crate::search::lexical::lexical_search;
use crate::search::semantic::semantic_search;
use crate::store::ArticleStore;

/// Merge heuristics for the hybrid ranker. The defaults come down from the
/// original ranking behavior; they are knobs, not constants, because their
/// correctness is only asserted by observed ordering.
#[derive(Debug, Clone, Copy)]
pub struct HybridWeights {
    /// Flat boost added to lexical hits before the 100 cap.
    pub lexical_boost: u8,
    /// Fraction of a semantic score blended into an existing merged entry.
    pub semantic_blend: f64,
    /// Looser than the standalone semantic threshold; lexical hits already
    /// provide a confidence floor.
    pub semantic_threshold: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            lexical_boost: 10,
            semantic_blend: 0.5,
            semantic_threshold: 0.25,
        }
    }
}

/// Runs the lexical and semantic branches concurrently and merges them into
/// one ranked list with at most one entry per document, sorted non-increasing
/// by relevance.
///
/// If the semantic branch comes back empty (typically a degraded embedding
/// provider) the lexical results pass through unchanged.
pub async fn hybrid_search<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    limit: usize,
    weights: HybridWeights,
) -> Result<Vec<SearchResult>, SearchError>
where
    S: ArticleStore,
    E: EmbeddingProvider,
{
    let (lexical, semantic) = tokio::join!(
        lexical_search(store, query, limit),
        semantic_search(store, embedder, query, limit, weights.semantic_threshold),
    );
    let lexical = lexical?;
    let semantic = semantic?;

    if semantic.is_empty() {
        return Ok(lexical);
    }

    let mut merged: Vec<SearchResult> = lexical
        .into_iter()
        .map(|mut hit| {
            hit.kind = MatchKind::Hybrid;
            hit.relevance = cap(u32::from(hit.relevance) + u32::from(weights.lexical_boost));
            hit
        })
        .collect();

    for hit in semantic {
        match merged
            .iter_mut()
            .find(|entry| entry.article_id == hit.article_id)
        {
            Some(entry) => {
                let blended =
                    f64::from(entry.relevance) + f64::from(hit.relevance) * weights.semantic_blend;
                entry.relevance = cap(blended.round() as u32);
                // Lexical hits carry no snippet; take the semantic one.
                if entry.snippet.is_none() {
                    entry.snippet = hit.snippet;
                }
                if entry.page_number.is_none() {
                    entry.page_number = hit.page_number;
                }
            }
            None => merged.push(hit),
        }
    }

    merged.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    merged.truncate(limit);
    Ok(merged)
}

fn cap(relevance: u32) -> u8 {
    relevance.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, Document};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    struct FixedEmbedder {
        vector: Option<Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Option<Vec<f32>> {
            self.vector.clone()
        }
    }

    fn document(id: i64, title: &str, age_days: i64) -> Document {
        Document {
            id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            category: "Selbsthilfe".to_string(),
            description: format!("Artikel über {title}"),
            page_count: 1,
            published: true,
            updated_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn chunk(article_id: i64, index: u64, text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::new(article_id, text.to_string(), Some(embedding), Some(1), index).unwrap()
    }

    /// Doc 1 matches "Grenzen" lexically and semantically (0.9), doc 2 only
    /// semantically (0.7), doc 3 only lexically.
    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_document(document(1, "Grenzen setzen", 1))
            .await
            .unwrap();
        store
            .upsert_document(document(2, "Innere Ruhe", 2))
            .await
            .unwrap();
        store
            .upsert_document(document(3, "Grenzen im Beruf", 3))
            .await
            .unwrap();

        store
            .replace_chunks(
                1,
                vec![chunk(1, 0, "Wie man Grenzen zieht", vec![0.9, 0.43589])],
            )
            .await
            .unwrap();
        store
            .replace_chunks(2, vec![chunk(2, 0, "Ruhe finden", vec![0.7, 0.71414])])
            .await
            .unwrap();
        // Doc 3 has a chunk far from the query vector.
        store
            .replace_chunks(3, vec![chunk(3, 0, "Anderes", vec![0.0, 1.0])])
            .await
            .unwrap();

        store
    }

    fn query_embedder() -> FixedEmbedder {
        FixedEmbedder {
            vector: Some(vec![1.0, 0.0]),
        }
    }

    #[tokio::test]
    async fn provider_outage_returns_exactly_the_lexical_results() {
        let store = seeded_store().await;
        let down = FixedEmbedder { vector: None };

        let hybrid = hybrid_search(&store, &down, "Grenzen", 10, HybridWeights::default())
            .await
            .unwrap();
        let lexical = lexical_search(&store, "Grenzen", 10).await.unwrap();

        assert_eq!(hybrid.len(), lexical.len());
        for (h, l) in hybrid.iter().zip(&lexical) {
            assert_eq!(h.article_id, l.article_id);
            assert_eq!(h.relevance, l.relevance);
            assert_eq!(h.kind, MatchKind::Lexical);
        }
    }

    #[tokio::test]
    async fn output_is_sorted_and_has_no_duplicate_documents() {
        let store = seeded_store().await;
        let results = hybrid_search(
            &store,
            &query_embedder(),
            "Grenzen",
            10,
            HybridWeights::default(),
        )
        .await
        .unwrap();

        assert!(!results.is_empty());
        assert!(results
            .windows(2)
            .all(|pair| pair[0].relevance >= pair[1].relevance));

        let mut seen = HashSet::new();
        assert!(results.iter().all(|r| seen.insert(r.article_id)));
    }

    #[tokio::test]
    async fn lexical_hits_are_boosted_tagged_hybrid_and_given_snippets() {
        let store = seeded_store().await;
        let results = hybrid_search(
            &store,
            &query_embedder(),
            "Grenzen",
            10,
            HybridWeights::default(),
        )
        .await
        .unwrap();

        // Doc 1: lexical 100 boosted and blended, capped at 100; merged entry
        // inherits the semantic snippet.
        let doc_one = results.iter().find(|r| r.article_id == 1).unwrap();
        assert_eq!(doc_one.kind, MatchKind::Hybrid);
        assert_eq!(doc_one.relevance, 100);
        assert!(doc_one.snippet.is_some());

        // Doc 3: lexical-only in a merged list, still tagged hybrid.
        let doc_three = results.iter().find(|r| r.article_id == 3).unwrap();
        assert_eq!(doc_three.kind, MatchKind::Hybrid);
        assert_eq!(doc_three.relevance, 100);
    }

    #[tokio::test]
    async fn semantic_only_hits_are_inserted_as_is() {
        let store = seeded_store().await;
        let results = hybrid_search(
            &store,
            &query_embedder(),
            "Grenzen",
            10,
            HybridWeights::default(),
        )
        .await
        .unwrap();

        let doc_two = results.iter().find(|r| r.article_id == 2).unwrap();
        assert_eq!(doc_two.kind, MatchKind::Semantic);
        assert_eq!(doc_two.relevance, 70);
    }

    #[tokio::test]
    async fn limit_truncates_after_the_merge() {
        let store = seeded_store().await;
        let results = hybrid_search(
            &store,
            &query_embedder(),
            "Grenzen",
            2,
            HybridWeights::default(),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 2);
    }
}
