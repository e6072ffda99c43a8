//! Sliding-window text segmentation.
//!
//! Documents are split into overlapping, positionally derived chunks. The
//! window arithmetic counts characters (Unicode scalar values), not bytes,
//! so multi-byte input never lands on a broken boundary. Segmentation is
//! purely positional; no attempt is made to respect word or sentence
//! boundaries.

use serde::{Deserialize, Serialize};

use crate::types::IngestError;

/// Window size and overlap, both measured in characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkingOptions {
    /// Validated constructor: `chunk_size` must be positive and strictly
    /// larger than `overlap`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::Config("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(IngestError::Config(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }
}

/// A contiguous span of a document, carrying its source and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_file: String,
    /// Dense zero-based sequence number, unique within a source file.
    pub chunk_index: usize,
    pub file_path: String,
}

impl Chunk {
    /// Deterministic store identifier: stable across repeated runs over the
    /// same input, so re-ingestion overwrites rather than duplicates.
    pub fn id(&self) -> String {
        format!("{}_chunk_{}", self.source_file, self.chunk_index)
    }
}

/// Splits `text` into overlapping windows.
///
/// Texts shorter than `chunk_size` yield exactly one chunk holding the whole
/// text. Otherwise windows span `[pos - overlap, pos + chunk_size)` for each
/// `pos` stepping by `chunk_size` from `overlap`; the step sequence covers
/// the full text and the final window may be shorter than the rest. Empty
/// input yields no chunks — a chunk is never empty.
///
/// `file_path` defaults to `source_file` when absent. The function has no
/// side effects and is deterministic in its inputs.
pub fn chunk_text(
    source_file: &str,
    text: &str,
    file_path: Option<&str>,
    options: ChunkingOptions,
) -> Vec<Chunk> {
    let file_path = file_path.unwrap_or(source_file);
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, with the terminal offset appended,
    // so char-indexed windows can slice the original string directly.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let window = |start: usize, end: usize, chunk_index: usize| Chunk {
        text: text[boundaries[start]..boundaries[end]].to_string(),
        source_file: source_file.to_string(),
        chunk_index,
        file_path: file_path.to_string(),
    };

    if char_count < options.chunk_size {
        return vec![window(0, char_count, 0)];
    }

    let mut chunks = Vec::new();
    let mut pos = options.overlap;
    while pos < char_count {
        let start = pos - options.overlap;
        let end = (pos + options.chunk_size).min(char_count);
        chunks.push(window(start, end, chunks.len()));
        pos += options.chunk_size;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(chunk_size: usize, overlap: usize) -> ChunkingOptions {
        ChunkingOptions::new(chunk_size, overlap).unwrap()
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = chunk_text("notes.txt", "tiny", None, ChunkingOptions::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "tiny");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].id(), "notes.txt_chunk_0");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunk_text("empty.txt", "", None, ChunkingOptions::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn windows_cover_full_text_with_shorter_tail() {
        // 23 chars, chunk_size 10, overlap 2: positions 2, 12, 22 produce
        // [0,12), [10,22), [20,23).
        let text = "abcdefghijklmnopqrstuvw";
        let chunks = chunk_text("doc.txt", text, None, opts(10, 2));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "abcdefghijkl");
        assert_eq!(chunks[1].text, "klmnopqrstuv");
        assert_eq!(chunks[2].text, "uvw");
        assert!(chunks[2].text.ends_with('w'), "tail must not be dropped");
    }

    #[test]
    fn exactly_covered_text_has_no_empty_tail() {
        // 22 chars = overlap + 2 * chunk_size; the step at 22 is out of
        // range, so exactly two windows are emitted.
        let text = "abcdefghijklmnopqrstuv";
        let chunks = chunk_text("doc.txt", text, None, opts(10, 2));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "klmnopqrstuv");
        assert!(chunks.iter().all(|chunk| !chunk.text.is_empty()));
    }

    #[test]
    fn chunk_indices_are_dense_and_ids_unique() {
        let text = "x".repeat(95);
        let chunks = chunk_text("doc.txt", &text, None, opts(10, 2));
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, expected);
        }
        let mut ids: Vec<String> = chunks.iter().map(Chunk::id).collect();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn multibyte_text_slices_on_char_boundaries() {
        let text = "日本語のテキスト、絵文字🦀も含む。".repeat(4);
        let chunks = chunk_text("unicode.md", &text, None, opts(7, 3));
        assert!(chunks.len() > 1);
        let total: usize = text.chars().count();
        let last = chunks.last().unwrap();
        // Tail of the last window lines up with the end of the text.
        assert!(text.ends_with(&last.text));
        assert!(last.text.chars().count() <= 7 + 3);
        assert!(total >= chunks.len());
    }

    #[test]
    fn file_path_defaults_to_source_file() {
        let chunks = chunk_text("a.md", "hello", None, ChunkingOptions::default());
        assert_eq!(chunks[0].file_path, "a.md");

        let chunks = chunk_text("a.md", "hello", Some("/srv/docs/a.md"), ChunkingOptions::default());
        assert_eq!(chunks[0].file_path, "/srv/docs/a.md");
        assert_eq!(chunks[0].source_file, "a.md");
    }

    #[test]
    fn options_reject_degenerate_parameters() {
        assert!(ChunkingOptions::new(0, 0).is_err());
        assert!(ChunkingOptions::new(10, 10).is_err());
        assert!(ChunkingOptions::new(10, 9).is_ok());
    }

    #[test]
    fn rechunking_is_deterministic() {
        let text = "determinism matters for idempotent re-ingestion".repeat(20);
        let first = chunk_text("doc.txt", &text, None, opts(50, 10));
        let second = chunk_text("doc.txt", &text, None, opts(50, 10));
        assert_eq!(first, second);
    }
}
