//! Persistence for topics, tasks, tags and comments.
//!
//! [`Store`] is the seam the rest of the crate talks to. Records are keyed
//! by UUID strings; every call may fail and nothing spans more than one
//! call, so multi-step writes have to clean up after themselves.

pub mod fault;
pub mod file;
pub mod memory;

use std::path::PathBuf;

pub use fault::{FaultyStore, WriteOp};
pub use file::FileStore;
pub use memory::{MemoryStore, Snapshot};

use crate::model::{
    Attachment, Comment, CommentWithAuthor, NewAttachment, NewComment, NewTag, NewTask,
    NewTopic, Profile, Tag, TagFilter, TagScope, TagUpdate, Task, TaskUpdate, TaskWithTags,
    Topic, TopicUpdate,
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse store file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize store: {0}")]
    SerializeError(#[from] serde_json::Error),
    /// Parent tags must be top-level and share the child's scope
    #[error("tag {id} cannot be a parent: {reason}")]
    InvalidParent { id: String, reason: &'static str },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Record CRUD and the handful of queries the composer and views need.
///
/// Orderings are part of the contract:
/// - topics: pinned first, then most recently updated
/// - tasks: pinned first, then newest
/// - tag search: newest first; tag listing: oldest first
/// - comments: oldest first
pub trait Store {
    // --- Profiles ---

    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;
    fn upsert_profile(&mut self, profile: Profile) -> Result<Profile, StoreError>;

    // --- Topics ---

    /// Topics of `user_id` with the given archived flag. `query` matches a
    /// case-insensitive substring of the name or description.
    fn list_topics(
        &self,
        user_id: &str,
        query: Option<&str>,
        archived: bool,
    ) -> Result<Vec<Topic>, StoreError>;
    fn get_topic(&self, id: &str) -> Result<Option<Topic>, StoreError>;
    fn create_topic(&mut self, new: NewTopic) -> Result<Topic, StoreError>;
    fn update_topic(&mut self, id: &str, update: TopicUpdate) -> Result<Topic, StoreError>;
    /// Deletes the topic and everything under it
    fn delete_topic(&mut self, id: &str) -> Result<(), StoreError>;

    // --- Tasks ---

    fn list_tasks(&self, topic_id: &str) -> Result<Vec<TaskWithTags>, StoreError>;
    fn get_task(&self, id: &str) -> Result<Option<TaskWithTags>, StoreError>;
    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError>;
    fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError>;
    /// Deletes the task with its tag links, comments and attachments
    fn delete_task(&mut self, id: &str) -> Result<(), StoreError>;
    /// Tasks of `user_id` across topics whose content contains `keyword`,
    /// newest first
    fn search_tasks(
        &self,
        user_id: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<TaskWithTags>, StoreError>;
    /// Incomplete tasks in non-archived topics, newest first
    fn ongoing_tasks(&self, user_id: &str) -> Result<Vec<TaskWithTags>, StoreError>;

    // --- Tags ---

    fn list_tags(&self, user_id: &str, filter: &TagFilter) -> Result<Vec<Tag>, StoreError>;
    fn get_tag(&self, id: &str) -> Result<Option<Tag>, StoreError>;
    /// Case-insensitive substring match on the tag's own name
    fn search_tags(
        &self,
        user_id: &str,
        keyword: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError>;
    /// Distinct tags ordered by their most recent task association
    fn recent_tags(
        &self,
        user_id: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError>;
    /// Exact match on (user, name, parent, scope)
    fn find_tag(
        &self,
        user_id: &str,
        name: &str,
        parent_id: Option<&str>,
        scope: &TagScope,
    ) -> Result<Option<Tag>, StoreError>;
    fn create_tag(&mut self, new: NewTag) -> Result<Tag, StoreError>;
    fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag, StoreError>;
    /// Deletes the tag, its children and their task links
    fn delete_tag(&mut self, id: &str) -> Result<(), StoreError>;

    // --- Task-tag links ---

    /// Link tags to a task in one write. Pairs already linked are skipped.
    fn attach_tags(&mut self, task_id: &str, tag_ids: &[String]) -> Result<(), StoreError>;
    fn detach_tags(&mut self, task_id: &str) -> Result<(), StoreError>;

    // --- Comments ---

    fn list_comments(&self, task_id: &str) -> Result<Vec<CommentWithAuthor>, StoreError>;
    fn create_comment(&mut self, new: NewComment) -> Result<Comment, StoreError>;
    fn update_comment(&mut self, id: &str, content: &str) -> Result<Comment, StoreError>;
    fn delete_comment(&mut self, id: &str) -> Result<(), StoreError>;

    // --- Attachments ---

    fn create_attachment(&mut self, new: NewAttachment) -> Result<Attachment, StoreError>;
    fn delete_attachment(&mut self, id: &str) -> Result<(), StoreError>;
}
