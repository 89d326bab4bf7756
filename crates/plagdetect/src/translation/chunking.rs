//! Splitting long texts into request-sized pieces

/// Split `text` into consecutive slices of at most `max_chars` characters
///
/// Cuts prefer a paragraph break, then a line break, then any whitespace, and
/// only split inside a word when a window has no whitespace at all. The
/// slices concatenate back to `text` exactly.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let limit = match rest.char_indices().nth(max_chars) {
            Some((byte_index, _)) => byte_index,
            None => {
                chunks.push(rest);
                break;
            }
        };

        let window = &rest[..limit];
        let cut = window
            .rfind("\n\n")
            .map(|i| i + 2)
            .or_else(|| window.rfind('\n').map(|i| i + 1))
            .or_else(|| {
                window
                    .char_indices()
                    .rev()
                    .find(|(_, c)| c.is_whitespace())
                    .map(|(i, c)| i + c.len_utf8())
            })
            .unwrap_or(limit);

        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    chunks
}
