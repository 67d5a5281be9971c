use crate::error::IndexError;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 200,
        }
    }
}

/// Lazy iterator over overlapping fixed-width windows of the input text.
///
/// Window `i` starts at char offset `i * (chunk_size - overlap)` and runs
/// `chunk_size` chars, clamped to the end of the text. Whitespace-only
/// windows are skipped, not emitted. Cloning restarts the sequence.
#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    chars: Vec<char>,
    chunk_size: usize,
    stride: usize,
    start: usize,
}

impl Iterator for ChunkSplitter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.start < self.chars.len() {
            let end = (self.start + self.chunk_size).min(self.chars.len());
            let piece: String = self.chars[self.start..end].iter().collect();
            self.start += self.stride;

            if !piece.trim().is_empty() {
                return Some(piece);
            }
        }

        None
    }
}

/// Splits text into overlapping chunks for embedding.
///
/// `overlap >= chunk_size` would never advance the window, so it is rejected
/// up front as an invalid configuration.
pub fn split(text: &str, config: ChunkingConfig) -> Result<ChunkSplitter, IndexError> {
    if config.overlap >= config.chunk_size {
        return Err(IndexError::InvalidChunkConfig(format!(
            "overlap ({}) must be smaller than chunk size ({})",
            config.overlap, config.chunk_size
        )));
    }

    Ok(ChunkSplitter {
        chars: text.chars().collect(),
        chunk_size: config.chunk_size,
        stride: config.chunk_size - config.overlap,
        start: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn overlap_equal_to_chunk_size_is_rejected() {
        let result = split("anything", config(100, 100));
        assert!(matches!(result, Err(IndexError::InvalidChunkConfig(_))));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let result = split("anything", config(0, 0));
        assert!(matches!(result, Err(IndexError::InvalidChunkConfig(_))));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks: Vec<String> = split("", ChunkingConfig::default()).unwrap().collect();
        assert!(chunks.is_empty());
    }

    #[test]
    fn fifteen_hundred_chars_at_default_config_yield_three_chunks() {
        let text = "a".repeat(1_500);
        let chunks: Vec<String> = split(&text, ChunkingConfig::default()).unwrap().collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 800);
        assert_eq!(chunks[1].len(), 800);
        assert_eq!(chunks[2].len(), 300);
    }

    #[test]
    fn overlap_removed_concatenation_reconstructs_the_input() {
        let text: String = (0..2_750)
            .map(|i| char::from(b'a' + (i % 23) as u8))
            .collect();
        let cfg = config(800, 200);
        let chunks: Vec<String> = split(&text, cfg).unwrap().collect();

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(cfg.overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn whitespace_only_windows_are_dropped() {
        let text = format!("{}{}", "b".repeat(600), " ".repeat(1_000));
        let chunks: Vec<String> = split(&text, ChunkingConfig::default()).unwrap().collect();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with('b'));
    }

    #[test]
    fn splitter_is_restartable_via_clone() {
        let text = "c".repeat(2_000);
        let splitter = split(&text, ChunkingConfig::default()).unwrap();
        let first: Vec<String> = splitter.clone().collect();
        let second: Vec<String> = splitter.collect();
        assert_eq!(first, second);
    }
}
