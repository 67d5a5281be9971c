use crate::error::SearchError;

/// Cosine similarity between two embeddings: dot product over the product of
/// the Euclidean norms, range [-1, 1]. A length mismatch is a hard error, not
/// a query-time condition to degrade from.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SearchError> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;

    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
