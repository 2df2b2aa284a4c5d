use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned container of tasks, referenced from text as `@name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Icon URL or emoji
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a topic
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub is_archived: Option<bool>,
    pub is_pinned: Option<bool>,
}

impl TopicUpdate {
    pub fn apply(self, topic: &mut Topic) {
        if let Some(name) = self.name {
            topic.name = name;
        }
        if let Some(description) = self.description {
            topic.description = description;
        }
        if let Some(icon) = self.icon {
            topic.icon = icon;
        }
        if let Some(archived) = self.is_archived {
            topic.is_archived = archived;
        }
        if let Some(pinned) = self.is_pinned {
            topic.is_pinned = pinned;
        }
    }
}
