use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `#` followed by a run of anything but whitespace or another `#`
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^\s#]+)").expect("tag pattern is valid"));

/// Inline image reference `[图片:<http(s) url>]`
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[图片:(https?://[^\]]+)\]").expect("image pattern is valid")
});

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("space pattern is valid"));

/// Prefix of the inline image token
pub const IMAGE_TOKEN_PREFIX: &str = "[图片:";

/// A `#tag` occurrence in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    /// Token text without the leading `#`, `/` preserved
    pub name: &'a str,
    /// Byte span of the whole match, `#` included
    pub span: Range<usize>,
}

/// Iterate `#tag` tokens left to right. Duplicates are preserved.
///
/// `##tag` yields `tag`: the first `#` has nothing after it and the second
/// starts a fresh token.
pub fn tag_tokens(text: &str) -> impl Iterator<Item = TagToken<'_>> {
    TAG_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(TagToken {
            name: name.as_str(),
            span: whole.start()..whole.end(),
        })
    })
}

/// Raw tag strings in order of appearance, without the `#`.
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_tokens(text).map(|t| t.name.to_string()).collect()
}

/// Tag strings with repeats removed, first occurrence order kept.
pub fn distinct_tags(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in tag_tokens(text) {
        if !seen.iter().any(|s: &String| s == token.name) {
            seen.push(token.name.to_string());
        }
    }
    seen
}

/// URLs of every `[图片:<url>]` token, left to right.
pub fn extract_image_urls(text: &str) -> Vec<String> {
    IMAGE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Build the inline token for an uploaded image URL
pub fn image_token(url: &str) -> String {
    format!("{}{}]", IMAGE_TOKEN_PREFIX, url)
}

/// Remove `#tag` runs and image tokens for display.
///
/// Text without either is returned borrowed and untouched. Otherwise the
/// leftover space runs are collapsed and the ends trimmed.
pub fn strip_tags_and_images(text: &str) -> Cow<'_, str> {
    if !TAG_RE.is_match(text) && !IMAGE_RE.is_match(text) {
        return Cow::Borrowed(text);
    }
    let without_images = IMAGE_RE.replace_all(text, "");
    let without_tags = TAG_RE.replace_all(&without_images, "");
    let collapsed = SPACE_RUN_RE.replace_all(&without_tags, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim_end).collect();
    Cow::Owned(lines.join("\n").trim().to_string())
}

/// Stripped content cut to `max_chars` characters, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let stripped = strip_tags_and_images(text);
    if stripped.chars().count() <= max_chars {
        return stripped.into_owned();
    }
    let mut out: String = stripped.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// A run of text that either is or is not a `#tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub is_tag: bool,
}

/// Split text into alternating plain and tag segments for highlighting.
pub fn highlight_tags(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for token in tag_tokens(text) {
        if token.span.start > last {
            segments.push(Segment {
                text: &text[last..token.span.start],
                is_tag: false,
            });
        }
        segments.push(Segment {
            text: &text[token.span.clone()],
            is_tag: true,
        });
        last = token.span.end;
    }
    if last < text.len() {
        segments.push(Segment {
            text: &text[last..],
            is_tag: false,
        });
    }
    segments
}
