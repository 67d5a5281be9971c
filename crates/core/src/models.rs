use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

pub const CHUNK_TEXT_MAX_CHARS: usize = 1_600;

/// Knowledge article metadata. Owned by the content-management side; the
/// retrieval engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub description: String,
    pub page_count: u32,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// One retrievable slice of a document's extracted text.
///
/// The full chunk set for a document is replaced wholesale on re-indexing;
/// individual chunks are never updated in place. Wire field names follow the
/// persisted record layout of the article store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub article_id: i64,
    pub chunk_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub page_number: Option<u32>,
    pub chunk_index: u64,
    #[serde(rename = "enabledForLuna")]
    pub enabled: bool,
}

impl Chunk {
    /// Builds a chunk with `enabled = true`, rejecting text outside the
    /// 1..=1600 character bound.
    pub fn new(
        article_id: i64,
        chunk_text: String,
        embedding: Option<Vec<f32>>,
        page_number: Option<u32>,
        chunk_index: u64,
    ) -> Result<Self, IndexError> {
        let chars = chunk_text.chars().count();
        if chars == 0 || chars > CHUNK_TEXT_MAX_CHARS {
            return Err(IndexError::InvalidChunk(format!(
                "chunk text must be 1..={CHUNK_TEXT_MAX_CHARS} chars, got {chars}"
            )));
        }

        Ok(Self {
            article_id,
            chunk_text,
            embedding,
            page_number,
            chunk_index,
            enabled: true,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Lexical,
    Semantic,
    Hybrid,
}

/// Transient query-time projection; constructed fresh per query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub article_id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    /// 0..=100 inclusive.
    pub relevance: u8,
    pub kind: MatchKind,
    pub snippet: Option<String>,
    pub page_number: Option<u32>,
}
