use crate::error::SearchError;
use crate::models::{Document, MatchKind, SearchResult};
use crate::store::ArticleStore;

/// Exact textual presence is maximal lexical confidence; there is no
/// partial-match tier.
pub const LEXICAL_MATCH_RELEVANCE: u8 = 100;

/// Case-insensitive substring match over title, category, and description of
/// published documents. Equal scores are ordered by document recency (newest
/// first) for reproducibility. Empty result, never an error, when nothing
/// matches.
pub async fn lexical_search<S: ArticleStore>(
    store: &S,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let mut matched: Vec<Document> = store
        .published_documents()
        .await?
        .into_iter()
        .filter(|document| matches_metadata(document, &needle))
        .collect();

    matched.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    Ok(matched
        .into_iter()
        .take(limit)
        .map(|document| SearchResult {
            article_id: document.id,
            title: document.title,
            slug: document.slug,
            category: document.category,
            relevance: LEXICAL_MATCH_RELEVANCE,
            kind: MatchKind::Lexical,
            snippet: None,
            page_number: None,
        })
        .collect())
}

fn matches_metadata(document: &Document, needle: &str) -> bool {
    document.title.to_lowercase().contains(needle)
        || document.category.to_lowercase().contains(needle)
        || document.description.to_lowercase().contains(needle)
}
