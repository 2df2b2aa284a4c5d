pub mod hierarchy;
pub mod markdown;
pub mod mention;
pub mod tokens;

pub use hierarchy::{TagPath, parse_hierarchy};
pub use markdown::rewrite_markdown;
pub use mention::{Mention, find_mention, strip_mention};
pub use tokens::{
    Segment, TagToken, distinct_tags, extract_image_urls, extract_tags, highlight_tags,
    image_token, preview, strip_tags_and_images, tag_tokens,
};
