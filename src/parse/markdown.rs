use std::sync::LazyLock;

use regex::Regex;

static MD_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("markdown image pattern is valid")
});

static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link pattern is valid")
});

/// Rewrite Markdown into the stored inline format.
///
/// `![alt](url)` becomes `[图片:url]` first, then `[text](url)` becomes
/// `text (url)`. Each is one global pass.
pub fn rewrite_markdown(text: &str) -> String {
    let images = MD_IMAGE_RE.replace_all(text, "[图片:${2}]");
    MD_LINK_RE.replace_all(&images, "${1} (${2})").into_owned()
}
