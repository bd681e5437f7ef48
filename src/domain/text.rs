//! Text helpers shared by ingestion and retrieval.
//!
//! Everything sent to the embedding API goes through [`truncate_to_bytes`]
//! first; documents under analysis are split with [`chunk_text`] before one
//! similarity search is issued per chunk.

/// Byte ceiling for any text handed to the embedding API.
pub const DEFAULT_MAX_BYTES: usize = 9900;

/// Window size, in characters, used when splitting a document for search.
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Returns the longest prefix of `text` whose UTF-8 encoding fits in
/// `max_bytes`, never splitting a multi-byte character.
///
/// The cut starts at `max_bytes` and steps back to the nearest character
/// boundary, at most three bytes away.
pub fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Splits `text` into consecutive, non-overlapping windows of `window`
/// characters. The final window may be shorter; empty text yields nothing.
///
/// A `window` of zero is treated as one.
pub fn chunk_text(text: &str, window: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        window: window.max(1),
    }
}

/// Lazy iterator returned by [`chunk_text`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    window: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let end = self
            .rest
            .char_indices()
            .nth(self.window)
            .map_or(self.rest.len(), |(offset, _)| offset);

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
