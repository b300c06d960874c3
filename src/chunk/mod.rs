//! Fixed-size token windowing
//!
//! Documents are split into overlapping windows of whitespace-delimited
//! tokens (512 tokens, 128 overlap by default). Window boundaries are
//! deterministic: the same body always produces the same chunk sequence, and
//! consecutive windows share exactly `overlap_tokens` tokens, so the ordered
//! chunks reassemble the parent token stream with no token dropped.

use crate::config::ChunkConfig;

/// Split a body into overlapping token windows.
///
/// A body with no tokens yields no chunks. Chunk text is the window's tokens
/// joined by single spaces; original whitespace is not preserved.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_tokens).min(tokens.len());
        chunks.push(tokens[start..end].join(" "));
        if end == tokens.len() {
            break;
        }
        // overlap_tokens < chunk_tokens is enforced by config validation,
        // so start always advances
        start = end - config.overlap_tokens;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_tokens: usize, overlap_tokens: usize) -> ChunkConfig {
        ChunkConfig {
            chunk_tokens,
            overlap_tokens,
        }
    }

    fn numbered_tokens(n: usize) -> String {
        (0..n).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_body_yields_no_chunks() {
        let cfg = config(512, 128);
        assert!(chunk_text("", &cfg).is_empty());
        assert!(chunk_text("   \n\t  ", &cfg).is_empty());
    }

    #[test]
    fn test_short_body_is_one_chunk() {
        let cfg = config(512, 128);
        let chunks = chunk_text("hello vector database world", &cfg);
        assert_eq!(chunks, vec!["hello vector database world"]);
    }

    #[test]
    fn test_exact_window_is_one_chunk() {
        let cfg = config(512, 128);
        let text = numbered_tokens(512);
        let chunks = chunk_text(&text, &cfg);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_one_token_over_starts_second_window_at_overlap() {
        let cfg = config(512, 128);
        let text = numbered_tokens(513);
        let chunks = chunk_text(&text, &cfg);

        assert_eq!(chunks.len(), 2);
        // Second window starts 128 tokens before the end of the first
        assert!(chunks[1].starts_with("t384 "));
        assert!(chunks[1].ends_with(" t512"));
        assert_eq!(chunks[1].split_whitespace().count(), 129);
    }

    #[test]
    fn test_overlap_reconstructs_token_stream() {
        let cfg = config(512, 128);
        let text = numbered_tokens(2000);
        let original: Vec<&str> = text.split_whitespace().collect();

        let chunks = chunk_text(&text, &cfg);
        assert!(chunks.len() > 1);

        let mut rebuilt: Vec<String> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let tokens: Vec<&str> = chunk.split_whitespace().collect();
            let skip = if i == 0 { 0 } else { cfg.overlap_tokens };
            rebuilt.extend(tokens[skip..].iter().map(|t| t.to_string()));
        }

        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_windows_never_exceed_chunk_size() {
        let cfg = config(512, 128);
        let chunks = chunk_text(&numbered_tokens(5000), &cfg);
        for chunk in &chunks {
            assert!(chunk.split_whitespace().count() <= cfg.chunk_tokens);
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let cfg = config(512, 128);
        let text = numbered_tokens(1234);
        assert_eq!(chunk_text(&text, &cfg), chunk_text(&text, &cfg));
    }
}
