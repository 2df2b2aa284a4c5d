use unicode_segmentation::UnicodeSegmentation;

/// Clamp a byte offset into `s` and snap it back to the start of the
/// grapheme cluster it falls in.
pub fn snap_to_grapheme(s: &str, byte_offset: usize) -> usize {
    if byte_offset >= s.len() {
        return s.len();
    }
    let mut start = 0;
    for (i, _) in s.grapheme_indices(true) {
        if i > byte_offset {
            break;
        }
        start = i;
    }
    start
}

/// Next grapheme boundary after `byte_offset`. Returns None if at end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset >= s.len() {
        return None;
    }
    if let Some((i, _)) = s[byte_offset..].grapheme_indices(true).nth(1) {
        return Some(byte_offset + i);
    }
    Some(s.len())
}

/// Previous grapheme boundary before `byte_offset`. Returns None if at start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    let prefix = &s[..byte_offset.min(s.len())];
    let mut last_start = 0;
    for (i, _) in prefix.grapheme_indices(true) {
        last_start = i;
    }
    Some(last_start)
}

/// Convert a character index to a byte offset. Past the end maps to `s.len()`.
pub fn char_to_byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Number of characters before `byte_offset`.
pub fn byte_to_char_offset(s: &str, byte_offset: usize) -> usize {
    let clamped = byte_offset.min(s.len());
    s.char_indices().take_while(|(i, _)| *i < clamped).count()
}
