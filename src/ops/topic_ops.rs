use crate::model::{NewTopic, Topic, TopicUpdate};
use crate::store::{Store, StoreError};

/// Error type for topic operations
#[derive(Debug, thiserror::Error)]
pub enum TopicError {
    #[error("topic not found: {0}")]
    NotFound(String),
    #[error("topic name cannot be empty")]
    EmptyName,
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn clean_name(name: &str) -> Result<String, TopicError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TopicError::EmptyName);
    }
    if name.chars().any(char::is_whitespace) {
        // @mentions stop at whitespace, so this topic can only be targeted
        // by id or composer context
        tracing::debug!(name, "topic name contains whitespace");
    }
    Ok(name.to_string())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn create_topic<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    name: &str,
    description: Option<String>,
    icon: Option<String>,
) -> Result<Topic, TopicError> {
    let topic = store.create_topic(NewTopic {
        user_id: user_id.to_string(),
        name: clean_name(name)?,
        description: clean_optional(description),
        icon: clean_optional(icon),
    })?;
    tracing::info!(topic = %topic.id, name = %topic.name, "created topic");
    Ok(topic)
}

/// Edit of a topic's descriptive fields. Empty strings clear the optional
/// ones.
#[derive(Debug, Clone, Default)]
pub struct TopicEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

pub fn edit_topic<S: Store + ?Sized>(
    store: &mut S,
    topic_id: &str,
    edit: TopicEdit,
) -> Result<Topic, TopicError> {
    require_topic(&*store, topic_id)?;
    let update = TopicUpdate {
        name: edit.name.as_deref().map(clean_name).transpose()?,
        description: edit.description.map(|d| clean_optional(Some(d))),
        icon: edit.icon.map(|i| clean_optional(Some(i))),
        ..Default::default()
    };
    Ok(store.update_topic(topic_id, update)?)
}

pub fn set_archived<S: Store + ?Sized>(
    store: &mut S,
    topic_id: &str,
    archived: bool,
) -> Result<Topic, TopicError> {
    require_topic(&*store, topic_id)?;
    let update = TopicUpdate {
        is_archived: Some(archived),
        ..Default::default()
    };
    Ok(store.update_topic(topic_id, update)?)
}

pub fn set_pinned<S: Store + ?Sized>(
    store: &mut S,
    topic_id: &str,
    pinned: bool,
) -> Result<Topic, TopicError> {
    require_topic(&*store, topic_id)?;
    let update = TopicUpdate {
        is_pinned: Some(pinned),
        ..Default::default()
    };
    Ok(store.update_topic(topic_id, update)?)
}

/// Delete a topic with all of its tasks
pub fn delete_topic<S: Store + ?Sized>(store: &mut S, topic_id: &str) -> Result<(), TopicError> {
    require_topic(&*store, topic_id)?;
    store.delete_topic(topic_id)?;
    tracing::info!(topic = topic_id, "deleted topic");
    Ok(())
}

fn require_topic<S: Store + ?Sized>(store: &S, topic_id: &str) -> Result<Topic, TopicError> {
    store
        .get_topic(topic_id)?
        .ok_or_else(|| TopicError::NotFound(topic_id.to_string()))
}

/// Find one of the user's topics by id or exact name, archived or not.
/// Active topics win over archived ones with the same name.
pub fn lookup_topic<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    key: &str,
) -> Result<Topic, TopicError> {
    if let Some(topic) = store.get_topic(key)?.filter(|t| t.user_id == user_id) {
        return Ok(topic);
    }
    for archived in [false, true] {
        let hit = store
            .list_topics(user_id, Some(key), archived)?
            .into_iter()
            .find(|t| t.name == key);
        if let Some(topic) = hit {
            return Ok(topic);
        }
    }
    Err(TopicError::NotFound(key.to_string()))
}
