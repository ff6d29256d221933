//! Splitting a payload into bounded fragments and joining it back.

use crate::config::RECORD_OVERHEAD;
use crate::error::{EngineError, EngineResult};

/// Bytes left for payload in a record of `chunk_size` once `meta_len`
/// bytes of metadata are accounted for.
pub fn payload_size(chunk_size: usize, meta_len: usize) -> EngineResult<usize> {
    if chunk_size <= RECORD_OVERHEAD || chunk_size <= meta_len {
        return Err(EngineError::Configuration(format!(
            "chunk size must be at least {}, got {chunk_size}",
            RECORD_OVERHEAD.max(meta_len) + 1
        )));
    }
    Ok(chunk_size - meta_len)
}

/// Split `text` into consecutive pieces of at most `max_bytes` bytes.
///
/// Pieces end on character boundaries. A piece always holds at least one
/// character, so a character wider than `max_bytes` gets a piece of its
/// own. Empty input yields a single empty piece.
pub fn split(text: &str, max_bytes: usize) -> Vec<&str> {
    if text.is_empty() {
        return vec![""];
    }
    let max_bytes = max_bytes.max(1);
    let mut pieces = Vec::with_capacity(text.len().div_ceil(max_bytes));
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(max_bytes);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(end);
        pieces.push(head);
        rest = tail;
    }
    pieces
}

/// Concatenate pieces in order.
pub fn join<'a, I>(pieces: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    pieces.into_iter().collect()
}
