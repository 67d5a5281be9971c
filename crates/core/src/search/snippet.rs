pub const DEFAULT_SNIPPET_CONTEXT: usize = 80;

const ELLIPSIS: &str = "...";

/// Cuts a context window around the first case-insensitive occurrence of the
/// query. Semantic matches often lack a verbatim occurrence; those fall back
/// to the opening `2 * context_len` characters with a trailing ellipsis.
pub fn extract_snippet(text: &str, query: &str, context_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.trim().chars().collect();

    match find_case_insensitive(&chars, &needle) {
        Some(position) => {
            let start = position.saturating_sub(context_len);
            let end = (position + needle.len() + context_len).min(chars.len());

            let mut snippet = String::new();
            if start > 0 {
                snippet.push_str(ELLIPSIS);
            }
            snippet.extend(&chars[start..end]);
            if end < chars.len() {
                snippet.push_str(ELLIPSIS);
            }
            snippet
        }
        None => {
            let end = (2 * context_len).min(chars.len());
            let mut snippet: String = chars[..end].iter().collect();
            snippet.push_str(ELLIPSIS);
            snippet
        }
    }
}

fn find_case_insensitive(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    })
}
