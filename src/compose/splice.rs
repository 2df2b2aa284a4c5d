use crate::util::unicode::snap_to_grapheme;

/// Buffer contents and cursor after a splice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    /// Byte offset just past the inserted trailing space
    pub cursor: usize,
}

/// Replace the in-progress token ending at `cursor` with
/// `trigger + replacement + " "`.
///
/// The token starts at the last `trigger` before the cursor. Text before it
/// and text after the cursor are kept as they are. Without a trigger in
/// range the input comes back unchanged.
pub fn commit_suggestion(text: &str, cursor: usize, trigger: char, replacement: &str) -> Splice {
    let cursor = snap_to_grapheme(text, cursor);
    let Some(start) = text[..cursor].rfind(trigger) else {
        return Splice {
            text: text.to_string(),
            cursor,
        };
    };

    let mut out = String::with_capacity(text.len() + replacement.len() + 2);
    out.push_str(&text[..start]);
    out.push(trigger);
    out.push_str(replacement);
    out.push(' ');
    let new_cursor = out.len();
    out.push_str(&text[cursor..]);

    Splice {
        text: out,
        cursor: new_cursor,
    }
}
