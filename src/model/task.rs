use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::tag::Tag;

/// A chat-style entry posted into a topic.
///
/// `content` is the raw text as composed, with `#tag` runs kept inline and
/// images stored as `[图片:<url>]` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub topic_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub topic_id: String,
    pub user_id: String,
    pub content: String,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub is_pinned: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl TaskUpdate {
    pub fn apply(self, task: &mut Task) {
        if let Some(content) = self.content {
            task.content = content;
        }
        if let Some(v) = self.is_completed {
            task.is_completed = v;
        }
        if let Some(v) = self.is_pinned {
            task.is_pinned = v;
        }
        if let Some(v) = self.is_favorite {
            task.is_favorite = v;
        }
    }
}

/// Boolean task fields that can be flipped independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFlag {
    Completed,
    Pinned,
    Favorite,
}

impl TaskFlag {
    pub fn get(self, task: &Task) -> bool {
        match self {
            TaskFlag::Completed => task.is_completed,
            TaskFlag::Pinned => task.is_pinned,
            TaskFlag::Favorite => task.is_favorite,
        }
    }

    pub fn set(self, task: &mut Task, value: bool) {
        match self {
            TaskFlag::Completed => task.is_completed = value,
            TaskFlag::Pinned => task.is_pinned = value,
            TaskFlag::Favorite => task.is_favorite = value,
        }
    }

    /// An update that writes only this flag
    pub fn update(self, value: bool) -> TaskUpdate {
        let mut update = TaskUpdate::default();
        match self {
            TaskFlag::Completed => update.is_completed = Some(value),
            TaskFlag::Pinned => update.is_pinned = Some(value),
            TaskFlag::Favorite => update.is_favorite = Some(value),
        }
        update
    }

    pub fn parse(s: &str) -> Option<TaskFlag> {
        match s {
            "done" | "complete" | "completed" => Some(TaskFlag::Completed),
            "pin" | "pinned" => Some(TaskFlag::Pinned),
            "fav" | "favorite" | "favourite" => Some(TaskFlag::Favorite),
            _ => None,
        }
    }
}

/// Many-to-many association between tasks and tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTag {
    pub task_id: String,
    pub tag_id: String,
    /// When the association was written; drives "recently used" ordering
    pub created_at: DateTime<Utc>,
}

/// A file attached to a task alongside the inline image tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub task_id: String,
    pub user_id: String,
    pub file_url: String,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

/// A task joined with its tags and attachments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskWithTags {
    #[serde(flatten)]
    pub task: Task,
    pub tags: Vec<Tag>,
    pub attachments: Vec<Attachment>,
}
