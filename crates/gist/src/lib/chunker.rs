//! # Chunker
//!
//! Packs ordered text segments into chunks that fit a character budget.
//! Small segments are batched greedily, one per line. A segment that alone
//! exceeds the budget is cut into near-equal pieces on word boundaries, each
//! piece wrapped in ellipsis markers to flag it as a fragment.

use crate::Error;

pub const ELLIPSIS: char = '…';

/// Maximum distance past the nominal cut point scanned for a space before
/// the piece is cut mid-word.
pub const WORD_SEARCH_LIMIT: usize = 64;

/// Splits `segments` into chunks that fit a budget of `max_size` characters.
///
/// Every chunk built from whole segments holds each segment followed by a
/// newline. The segments and the newlines between them fit the budget, so
/// with the trailing newline such a chunk is at most `max_size + 1` long.
/// Pieces of an oversized segment look like `… piece …` and are at most
/// `chunk_width + WORD_SEARCH_LIMIT + 4` characters long.
pub fn chunk<S: AsRef<str>>(segments: &[S], max_size: usize) -> Result<Vec<String>, Error> {
    if max_size == 0 {
        return Err(Error::InvalidConfiguration(
            "max_size must be a positive number of characters".into(),
        ));
    }

    let mut chunks = Vec::new();
    let mut para = String::new();
    let mut para_len = 0;

    for segment in segments {
        let segment = segment.as_ref();
        let len = segment.chars().count();

        if para_len > 0 && para_len + len > max_size {
            chunks.push(std::mem::take(&mut para));
            para_len = 0;
        }

        if len <= max_size {
            para.push_str(segment);
            para.push('\n');
            para_len += len + 1;
        } else {
            if para_len > 0 {
                chunks.push(std::mem::take(&mut para));
                para_len = 0;
            }
            slice_oversized(segment, len, max_size, &mut chunks);
        }
    }

    if para_len > 0 {
        chunks.push(para);
    }

    Ok(chunks)
}

/// Width of the pieces an oversized segment of `len` characters is cut into.
pub fn chunk_width(len: usize, max_size: usize) -> usize {
    (len / (len / max_size + 1)).max(1)
}

fn slice_oversized(segment: &str, len: usize, max_size: usize, chunks: &mut Vec<String>) {
    let chars = segment.chars().collect::<Vec<_>>();
    let width = chunk_width(len, max_size);
    tracing::debug!(len, width, "Slicing oversized segment");

    let mut i = 0;
    while i < len {
        if len - i <= width {
            chunks.push(wrap(&chars[i..]));
            break;
        }

        let nominal = i + width;
        let window_end = (nominal + WORD_SEARCH_LIMIT).min(len);
        match chars[nominal..window_end].iter().position(|c| *c == ' ') {
            Some(offset) => {
                let cut = nominal + offset;
                chunks.push(wrap(&chars[i..cut]));
                // the space itself is dropped
                i = cut + 1;
            }
            None => {
                chunks.push(wrap(&chars[i..nominal]));
                i = nominal;
            }
        }
    }
}

fn wrap(piece: &[char]) -> String {
    let mut out = String::with_capacity(piece.len() + 8);
    out.push(ELLIPSIS);
    out.push(' ');
    out.extend(piece);
    out.push(' ');
    out.push(ELLIPSIS);
    out
}
