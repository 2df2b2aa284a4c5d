use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Colour given to tags created from composed text
pub const DEFAULT_TAG_COLOR: &str = "#4A90E2";

/// A label attached to tasks. Nested at most one level through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    /// `None` means the tag is global to the user
    #[serde(default)]
    pub topic_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

impl Tag {
    pub fn scope(&self) -> TagScope {
        TagScope::from_topic_id(self.topic_id.as_deref())
    }

    /// `parent/child` when a parent is given, otherwise the tag's own name.
    pub fn full_name(&self, parent: Option<&Tag>) -> String {
        match parent {
            Some(p) => format!("{}/{}", p.name, self.name),
            None => self.name.clone(),
        }
    }

    /// Full name looked up against a set of known tags. A dangling
    /// `parent_id` falls back to the bare name.
    pub fn full_name_in(&self, all: &[Tag]) -> String {
        let parent = self
            .parent_id
            .as_deref()
            .and_then(|pid| all.iter().find(|t| t.id == pid));
        self.full_name(parent)
    }
}

/// Where a tag lives: global to the user, or inside one topic.
///
/// Resolution and suggestion always run against an explicit scope; an
/// unspecified scope is treated as `Global`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TagScope {
    #[default]
    Global,
    Topic(String),
}

impl TagScope {
    pub fn from_topic_id(topic_id: Option<&str>) -> Self {
        match topic_id {
            Some(id) => TagScope::Topic(id.to_string()),
            None => TagScope::Global,
        }
    }

    pub fn topic_id(&self) -> Option<&str> {
        match self {
            TagScope::Global => None,
            TagScope::Topic(id) => Some(id),
        }
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.topic_id() == tag.topic_id.as_deref()
    }
}

/// Listing filter over tag scopes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    Any,
    Scope(TagScope),
}

impl TagFilter {
    pub fn matches(&self, tag: &Tag) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Scope(scope) => scope.contains(tag),
        }
    }
}

/// Fields supplied when creating a tag
#[derive(Debug, Clone)]
pub struct NewTag {
    pub user_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub scope: TagScope,
    pub emoji: Option<String>,
    pub color: String,
}

/// Partial update of the user-editable tag fields
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub emoji: Option<Option<String>>,
    pub color: Option<String>,
}

impl TagUpdate {
    pub fn apply(self, tag: &mut Tag) {
        if let Some(name) = self.name {
            tag.name = name;
        }
        if let Some(emoji) = self.emoji {
            tag.emoji = emoji;
        }
        if let Some(color) = self.color {
            tag.color = color;
        }
    }
}
