use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `@` followed by a run of anything but whitespace or `#`
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^\s#]+)").expect("mention pattern is valid"));

/// An `@topic` occurrence in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'a> {
    pub name: &'a str,
    /// Byte span of the whole match, `@` included
    pub span: Range<usize>,
}

/// The first `@name` mention in the text, if any.
pub fn find_mention(text: &str) -> Option<Mention<'_>> {
    let caps = MENTION_RE.captures(text)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?;
    Some(Mention {
        name: name.as_str(),
        span: whole.start()..whole.end(),
    })
}

/// Remove one mention from the text and trim the result.
///
/// When the mention sat between two spaces, one of them goes with it so the
/// surrounding words stay single-spaced.
pub fn strip_mention(text: &str, mention: &Mention<'_>) -> String {
    let before = &text[..mention.span.start];
    let mut after = &text[mention.span.end..];
    let spaced_before = before.is_empty() || before.ends_with(char::is_whitespace);
    if spaced_before && after.starts_with(' ') {
        after = &after[1..];
    }
    format!("{}{}", before, after).trim().to_string()
}
