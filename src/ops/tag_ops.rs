use std::sync::LazyLock;

use rand::seq::IndexedRandom;
use regex::Regex;

use crate::model::tag::{DEFAULT_TAG_COLOR, NewTag, Tag, TagScope, TagUpdate};
use crate::parse::TagPath;
use crate::store::{Store, StoreError};

/// Emoji handed out to tags that don't have one yet
pub const COMMON_EMOJIS: [&str; 20] = [
    "📌", "⭐", "🔥", "💡", "📝", "🎯", "✅", "⚡", "🚀", "💼", "🏠", "🎨", "📚", "💰", "🎮",
    "🌟", "💪", "🎉", "📱", "⏰",
];

/// Colours offered by `tf tag edit --color`
pub const COLOR_PRESETS: [&str; 8] = [
    "#4A90E2", "#50C878", "#F5A623", "#D0021B", "#9013FE", "#FF6B9D", "#7ED321", "#8B572A",
];

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern is valid"));

/// Error type for tag management operations
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("tag not found: {0}")]
    NotFound(String),
    #[error("tag name cannot be empty")]
    EmptyName,
    #[error("invalid tag name \"{0}\": no spaces, '#', '@' or '/'")]
    InvalidName(String),
    #[error("invalid color \"{0}\": expected #RRGGBB")]
    InvalidColor(String),
    #[error("a tag named \"{0}\" already exists here")]
    Duplicate(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn random_emoji() -> String {
    COMMON_EMOJIS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("📌")
        .to_string()
}

pub fn is_valid_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

/// Look up the tag keyed by (user, name, parent, scope), creating it when
/// missing. New tags get a random emoji and the default colour; an existing
/// tag without an emoji gets one backfilled.
pub fn find_or_create_tag<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    name: &str,
    parent_id: Option<&str>,
    scope: &TagScope,
) -> Result<Tag, StoreError> {
    if let Some(tag) = store.find_tag(user_id, name, parent_id, scope)? {
        if tag.emoji.is_some() {
            return Ok(tag);
        }
        let update = TagUpdate {
            emoji: Some(Some(random_emoji())),
            ..Default::default()
        };
        // Cosmetic; a failed backfill still resolves to the existing tag
        return match store.update_tag(&tag.id, update) {
            Ok(updated) => Ok(updated),
            Err(e) => {
                tracing::warn!(tag = %tag.id, error = %e, "emoji backfill failed");
                Ok(tag)
            }
        };
    }

    let tag = store.create_tag(NewTag {
        user_id: user_id.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(String::from),
        scope: scope.clone(),
        emoji: Some(random_emoji()),
        color: DEFAULT_TAG_COLOR.to_string(),
    })?;
    tracing::debug!(tag = %tag.id, name = %tag.name, "created tag");
    Ok(tag)
}

/// Resolve a `parent/child` path: the parent (always top-level) first, then
/// the child under it. Returns `(parent, child)`.
pub fn resolve_tag_path<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    path: &TagPath<'_>,
    scope: &TagScope,
) -> Result<(Option<Tag>, Tag), StoreError> {
    let parent = match path.parent {
        Some(name) => Some(find_or_create_tag(store, user_id, name, None, scope)?),
        None => None,
    };
    let child = find_or_create_tag(
        store,
        user_id,
        path.child,
        parent.as_ref().map(|p| p.id.as_str()),
        scope,
    )?;
    Ok((parent, child))
}

fn validate_name(name: &str) -> Result<(), TagError> {
    if name.is_empty() {
        return Err(TagError::EmptyName);
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '@' | '/'))
    {
        return Err(TagError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// User-facing edit of a tag's name, emoji or colour
#[derive(Debug, Clone, Default)]
pub struct TagEdit {
    pub name: Option<String>,
    /// `Some(None)` clears the emoji
    pub emoji: Option<Option<String>>,
    pub color: Option<String>,
}

pub fn edit_tag<S: Store + ?Sized>(
    store: &mut S,
    tag_id: &str,
    edit: TagEdit,
) -> Result<Tag, TagError> {
    let tag = store
        .get_tag(tag_id)?
        .ok_or_else(|| TagError::NotFound(tag_id.to_string()))?;

    let name = match edit.name {
        Some(name) => {
            let name = name.trim().to_string();
            validate_name(&name)?;
            if name != tag.name {
                let clash = store.find_tag(
                    &tag.user_id,
                    &name,
                    tag.parent_id.as_deref(),
                    &tag.scope(),
                )?;
                if clash.is_some() {
                    return Err(TagError::Duplicate(name));
                }
            }
            Some(name)
        }
        None => None,
    };
    if let Some(color) = &edit.color {
        if !is_valid_color(color) {
            return Err(TagError::InvalidColor(color.clone()));
        }
    }
    let emoji = edit
        .emoji
        .map(|e| e.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));

    Ok(store.update_tag(
        tag_id,
        TagUpdate {
            name,
            emoji,
            color: edit.color,
        },
    )?)
}

/// Delete a tag. Children of a parent go with it.
pub fn delete_tag<S: Store + ?Sized>(store: &mut S, tag_id: &str) -> Result<(), TagError> {
    if store.get_tag(tag_id)?.is_none() {
        return Err(TagError::NotFound(tag_id.to_string()));
    }
    store.delete_tag(tag_id)?;
    Ok(())
}

/// Find a tag by id, or by full name (`name` or `parent/child`) in `scope`
pub fn lookup_tag<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    key: &str,
    scope: &TagScope,
) -> Result<Tag, TagError> {
    if let Some(tag) = store.get_tag(key)? {
        return Ok(tag);
    }
    let path = crate::parse::parse_hierarchy(key);
    let parent = match path.parent {
        Some(name) => Some(
            store
                .find_tag(user_id, name, None, scope)?
                .ok_or_else(|| TagError::NotFound(key.to_string()))?,
        ),
        None => None,
    };
    store
        .find_tag(
            user_id,
            path.child,
            parent.as_ref().map(|p| p.id.as_str()),
            scope,
        )?
        .ok_or_else(|| TagError::NotFound(key.to_string()))
}
