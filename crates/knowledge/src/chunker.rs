//! Chunker — splits extracted document text into bounded fragments.
//!
//! Windows are cut every `max_chunk_size` characters with no semantic
//! boundary awareness; this is a document-fragment approximation, not a
//! summarizer, so mid-word cuts are fine. Each window is trimmed and
//! windows that trim below the minimum are discarded.
//!
//! Windows are measured in characters, never bytes — a cut must not land
//! inside a multi-byte UTF-8 sequence.

/// Chunking thresholds.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum window size in characters.
    pub max_chunk_size: usize,
    /// Minimum trimmed window length in characters; shorter windows are
    /// discarded.
    pub min_chunk_len: usize,
}

impl Default for ChunkerConfig {
    /// The interactive-upload thresholds.
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            min_chunk_len: 50,
        }
    }
}

impl ChunkerConfig {
    /// The looser bulk-ingestion thresholds.
    pub fn bulk() -> Self {
        Self {
            max_chunk_size: 1000,
            min_chunk_len: 20,
        }
    }
}

/// Partition `raw_text` into contiguous, non-overlapping windows of at most
/// `max_chunk_size` characters, trim each, and keep those whose trimmed
/// length is at least `min_chunk_len`. Original order is preserved.
///
/// Empty or whitespace-only input produces zero chunks; the caller decides
/// whether that is a terminal ingestion failure or a placeholder case.
pub fn chunk(raw_text: &str, config: &ChunkerConfig) -> Vec<String> {
    let max = config.max_chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut window = String::new();
    let mut window_chars = 0usize;

    let mut flush = |window: &mut String| {
        let trimmed = window.trim();
        if trimmed.chars().count() >= config.min_chunk_len {
            chunks.push(trimmed.to_string());
        }
        window.clear();
    };

    for ch in raw_text.chars() {
        window.push(ch);
        window_chars += 1;
        if window_chars == max {
            flush(&mut window);
            window_chars = 0;
        }
    }
    if window_chars > 0 {
        flush(&mut window);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(max: usize, min: usize) -> ChunkerConfig {
        ChunkerConfig {
            max_chunk_size: max,
            min_chunk_len: min,
        }
    }

    #[test]
    fn window_count_matches_ceil_division() {
        // 2500 chars at size 1000 → exactly 3 windows
        let text = "a".repeat(2500);
        let chunks = chunk(&text, &cfg(1000, 0));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn reconstruction_loses_nothing_beyond_trimming() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = chunk(&text, &cfg(100, 0));
        assert_eq!(chunks.len(), text.chars().count().div_ceil(100));

        // Every window equals the trimmed original slice at its position
        let chars: Vec<char> = text.chars().collect();
        for (i, c) in chunks.iter().enumerate() {
            let window: String = chars[i * 100..((i + 1) * 100).min(chars.len())]
                .iter()
                .collect();
            assert_eq!(c, window.trim());
        }
    }

    #[test]
    fn empty_and_whitespace_produce_nothing() {
        assert!(chunk("", &cfg(1000, 20)).is_empty());
        assert!(chunk("   ", &cfg(1000, 20)).is_empty());
        assert!(chunk("\n\t  \n", &cfg(1000, 1)).is_empty());
    }

    #[test]
    fn short_windows_are_discarded() {
        // Second window trims to 3 chars, below the minimum of 20
        let text = format!("{} xy ", "a".repeat(998));
        let chunks = chunk(&text, &cfg(1000, 20));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 998);
    }

    #[test]
    fn windows_are_trimmed() {
        let text = format!("  {}  ", "word ".repeat(30));
        let chunks = chunk(&text, &cfg(1000, 20));
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].starts_with(' '));
        assert!(!chunks[0].ends_with(' '));
    }

    #[test]
    fn multibyte_text_cuts_on_char_boundaries() {
        // 4-byte scalar values; byte-indexed slicing would panic here
        let text = "🦀".repeat(150);
        let chunks = chunk(&text, &cfg(100, 1));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[1].chars().count(), 50);
    }

    #[test]
    fn order_is_preserved() {
        let text = format!("{}{}", "first ".repeat(200), "second ".repeat(200));
        let chunks = chunk(&text, &cfg(600, 20));
        let joined = chunks.join(" ");
        assert!(joined.find("first").unwrap() < joined.rfind("second").unwrap());
    }

    #[test]
    fn bulk_config_uses_looser_minimum() {
        let text = "a short bulk fragment here";
        assert!(chunk(text, &ChunkerConfig::default()).is_empty());
        assert_eq!(chunk(text, &ChunkerConfig::bulk()).len(), 1);
    }
}
