//! Turning composed text into stored records.
//!
//! A task submission runs: validate, resolve the target topic, strip the
//! mention, collect tags, rewrite Markdown, create the task, find-or-create
//! each tag, attach. The store has no transactions, so if anything after
//! task creation fails the task is deleted again before the error is
//! returned. Tags created along the way are kept; orphan tags are allowed.

use crate::auth::Session;
use crate::compose::{Composer, ComposerMode};
use crate::model::{Comment, NewComment, NewTask, Tag, TagScope, Task, Topic};
use crate::ops::tag_ops::resolve_tag_path;
use crate::parse::{distinct_tags, find_mention, parse_hierarchy, rewrite_markdown, strip_mention};
use crate::store::{Store, StoreError};

/// Why a submission was refused or failed
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),
    #[error("no topic to post into: mention one with @name")]
    MissingTarget,
    #[error("topic not found: @{0}")]
    TargetNotFound(String),
    /// The composer's own topic id no longer resolves
    #[error("topic not found: {0}")]
    ContextNotFound(String),
    #[error("topic \"{0}\" is archived")]
    ArchivedTopic(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("a submission is already in progress")]
    Busy,
    #[error("could not save: {0}")]
    Persistence(#[from] StoreError),
}

/// A created task with the topic it landed in and the tags attached to it
#[derive(Debug, Clone)]
pub struct Submitted {
    pub task: Task,
    pub topic: Topic,
    /// Attached tags, parents before their children, first mention first
    pub tags: Vec<Tag>,
}

/// What [`post_from_composer`] created
#[derive(Debug, Clone)]
pub enum Posted {
    Task(Submitted),
    Comment(Comment),
}

fn require_user(session: &dyn Session) -> Result<String, SubmitError> {
    session
        .current_user_id()
        .map(String::from)
        .ok_or(SubmitError::NotSignedIn)
}

/// Find the user's topic called exactly `name`. Several matches resolve to
/// the first in listing order (pinned, then most recently updated).
pub fn resolve_topic_by_name<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    name: &str,
) -> Result<Topic, SubmitError> {
    let mut active: Vec<Topic> = store
        .list_topics(user_id, Some(name), false)?
        .into_iter()
        .filter(|t| t.name == name)
        .collect();
    if active.len() > 1 {
        tracing::warn!(name, count = active.len(), "ambiguous topic mention, using the first");
    }
    if !active.is_empty() {
        return Ok(active.swap_remove(0));
    }
    let archived = store
        .list_topics(user_id, Some(name), true)?
        .into_iter()
        .any(|t| t.name == name);
    if archived {
        return Err(SubmitError::ArchivedTopic(name.to_string()));
    }
    Err(SubmitError::TargetNotFound(name.to_string()))
}

fn resolve_context_topic<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    topic_id: &str,
) -> Result<Topic, SubmitError> {
    let topic = store
        .get_topic(topic_id)?
        .filter(|t| t.user_id == user_id)
        .ok_or_else(|| SubmitError::ContextNotFound(topic_id.to_string()))?;
    if topic.is_archived {
        return Err(SubmitError::ArchivedTopic(topic.name));
    }
    Ok(topic)
}

/// Post `text` as a new task.
///
/// The target is the `@name` topic when the text has a mention, otherwise
/// `context_topic`. Tag tokens stay inline in the stored content.
pub fn submit_task<S: Store + ?Sized>(
    store: &mut S,
    session: &dyn Session,
    text: &str,
    context_topic: Option<&str>,
) -> Result<Submitted, SubmitError> {
    if text.trim().is_empty() {
        return Err(SubmitError::Validation("content cannot be empty".into()));
    }
    let user_id = require_user(session)?;

    // Target topic, then the content without the mention
    let (topic, content) = match find_mention(text) {
        Some(mention) => {
            let topic = resolve_topic_by_name(&*store, &user_id, mention.name)?;
            (topic, strip_mention(text, &mention))
        }
        None => {
            let topic_id = context_topic.ok_or(SubmitError::MissingTarget)?;
            let topic = resolve_context_topic(&*store, &user_id, topic_id)?;
            (topic, text.trim().to_string())
        }
    };
    if content.is_empty() {
        return Err(SubmitError::Validation(
            "nothing to post besides the topic mention".into(),
        ));
    }
    tracing::debug!(topic = %topic.id, "resolved target topic");

    let tokens = distinct_tags(&content);
    let content = rewrite_markdown(&content);

    let task = store.create_task(NewTask {
        topic_id: topic.id.clone(),
        user_id: user_id.clone(),
        content,
    })?;
    tracing::info!(task = %task.id, topic = %topic.id, tags = tokens.len(), "created task");

    match attach_tokens(store, &user_id, &task, &topic, &tokens) {
        Ok(tags) => Ok(Submitted { task, topic, tags }),
        Err(e) => {
            tracing::warn!(task = %task.id, error = %e, "tagging failed, removing task");
            if let Err(cleanup) = store.delete_task(&task.id) {
                tracing::warn!(task = %task.id, error = %cleanup, "could not remove task");
            }
            Err(SubmitError::Persistence(e))
        }
    }
}

/// Find-or-create every token's tags in the topic's scope and link them
/// to `task` in one write.
fn attach_tokens<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    task: &Task,
    topic: &Topic,
    tokens: &[String],
) -> Result<Vec<Tag>, StoreError> {
    let scope = TagScope::Topic(topic.id.clone());
    let mut tags: Vec<Tag> = Vec::new();
    for token in tokens {
        let path = parse_hierarchy(token);
        if path.is_empty() {
            continue;
        }
        let (parent, child) = resolve_tag_path(store, user_id, &path, &scope)?;
        for tag in parent.into_iter().chain(std::iter::once(child)) {
            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }
    }
    if tags.is_empty() {
        return Ok(tags);
    }
    let ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
    store.attach_tags(&task.id, &ids)?;
    tracing::debug!(task = %task.id, count = ids.len(), "attached tags");
    Ok(tags)
}

/// Post `text` as a comment on `task_id`. Markdown is rewritten the same way
/// as for tasks; tags are not parsed.
pub fn submit_comment<S: Store + ?Sized>(
    store: &mut S,
    session: &dyn Session,
    task_id: &str,
    text: &str,
) -> Result<Comment, SubmitError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::Validation("comment cannot be empty".into()));
    }
    let user_id = require_user(session)?;
    let comment = store.create_comment(NewComment {
        task_id: task_id.to_string(),
        user_id,
        content: rewrite_markdown(trimmed),
    })?;
    tracing::info!(comment = %comment.id, task = task_id, "created comment");
    Ok(comment)
}

/// Submit whatever the composer holds. The composer refuses a second
/// submission while this one runs, keeps its buffer on failure and clears
/// it on success.
pub fn post_from_composer<S: Store + ?Sized>(
    composer: &mut Composer,
    store: &mut S,
    session: &dyn Session,
) -> Result<Posted, SubmitError> {
    let text = composer.begin_submit()?;
    let result = match composer.mode().clone() {
        ComposerMode::Task { topic_id } => {
            submit_task(store, session, &text, topic_id.as_deref()).map(Posted::Task)
        }
        ComposerMode::Comment { task_id } => {
            submit_comment(store, session, &task_id, &text).map(Posted::Comment)
        }
    };
    composer.finish_submit(result.is_ok());
    result
}
