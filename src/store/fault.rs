use std::collections::HashSet;

use crate::model::{
    Attachment, Comment, CommentWithAuthor, NewAttachment, NewComment, NewTag, NewTask,
    NewTopic, Profile, Tag, TagFilter, TagScope, TagUpdate, Task, TaskUpdate, TaskWithTags,
    Topic, TopicUpdate,
};
use crate::store::{Store, StoreError};

/// Write operations that [`FaultyStore`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOp {
    CreateTopic,
    UpdateTopic,
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateTag,
    UpdateTag,
    AttachTags,
    CreateComment,
}

/// Wraps a store and fails chosen writes with [`StoreError::Unavailable`].
/// Reads and all other writes pass through.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    failing: HashSet<WriteOp>,
}

impl<S: Store> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            failing: HashSet::new(),
        }
    }

    pub fn fail_on(mut self, op: WriteOp) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn heal(&mut self, op: WriteOp) {
        self.failing.remove(&op);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn check(&self, op: WriteOp) -> Result<(), StoreError> {
        if self.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} rejected")));
        }
        Ok(())
    }
}

impl<S: Store> Store for FaultyStore<S> {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.inner.get_profile(user_id)
    }

    fn upsert_profile(&mut self, profile: Profile) -> Result<Profile, StoreError> {
        self.inner.upsert_profile(profile)
    }

    fn list_topics(
        &self,
        user_id: &str,
        query: Option<&str>,
        archived: bool,
    ) -> Result<Vec<Topic>, StoreError> {
        self.inner.list_topics(user_id, query, archived)
    }

    fn get_topic(&self, id: &str) -> Result<Option<Topic>, StoreError> {
        self.inner.get_topic(id)
    }

    fn create_topic(&mut self, new: NewTopic) -> Result<Topic, StoreError> {
        self.check(WriteOp::CreateTopic)?;
        self.inner.create_topic(new)
    }

    fn update_topic(&mut self, id: &str, update: TopicUpdate) -> Result<Topic, StoreError> {
        self.check(WriteOp::UpdateTopic)?;
        self.inner.update_topic(id, update)
    }

    fn delete_topic(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_topic(id)
    }

    fn list_tasks(&self, topic_id: &str) -> Result<Vec<TaskWithTags>, StoreError> {
        self.inner.list_tasks(topic_id)
    }

    fn get_task(&self, id: &str) -> Result<Option<TaskWithTags>, StoreError> {
        self.inner.get_task(id)
    }

    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        self.check(WriteOp::CreateTask)?;
        self.inner.create_task(new)
    }

    fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        self.check(WriteOp::UpdateTask)?;
        self.inner.update_task(id, update)
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.check(WriteOp::DeleteTask)?;
        self.inner.delete_task(id)
    }

    fn search_tasks(
        &self,
        user_id: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<TaskWithTags>, StoreError> {
        self.inner.search_tasks(user_id, keyword, limit)
    }

    fn ongoing_tasks(&self, user_id: &str) -> Result<Vec<TaskWithTags>, StoreError> {
        self.inner.ongoing_tasks(user_id)
    }

    fn list_tags(&self, user_id: &str, filter: &TagFilter) -> Result<Vec<Tag>, StoreError> {
        self.inner.list_tags(user_id, filter)
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>, StoreError> {
        self.inner.get_tag(id)
    }

    fn search_tags(
        &self,
        user_id: &str,
        keyword: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        self.inner.search_tags(user_id, keyword, scope, limit)
    }

    fn recent_tags(
        &self,
        user_id: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        self.inner.recent_tags(user_id, scope, limit)
    }

    fn find_tag(
        &self,
        user_id: &str,
        name: &str,
        parent_id: Option<&str>,
        scope: &TagScope,
    ) -> Result<Option<Tag>, StoreError> {
        self.inner.find_tag(user_id, name, parent_id, scope)
    }

    fn create_tag(&mut self, new: NewTag) -> Result<Tag, StoreError> {
        self.check(WriteOp::CreateTag)?;
        self.inner.create_tag(new)
    }

    fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag, StoreError> {
        self.check(WriteOp::UpdateTag)?;
        self.inner.update_tag(id, update)
    }

    fn delete_tag(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_tag(id)
    }

    fn attach_tags(&mut self, task_id: &str, tag_ids: &[String]) -> Result<(), StoreError> {
        self.check(WriteOp::AttachTags)?;
        self.inner.attach_tags(task_id, tag_ids)
    }

    fn detach_tags(&mut self, task_id: &str) -> Result<(), StoreError> {
        self.inner.detach_tags(task_id)
    }

    fn list_comments(&self, task_id: &str) -> Result<Vec<CommentWithAuthor>, StoreError> {
        self.inner.list_comments(task_id)
    }

    fn create_comment(&mut self, new: NewComment) -> Result<Comment, StoreError> {
        self.check(WriteOp::CreateComment)?;
        self.inner.create_comment(new)
    }

    fn update_comment(&mut self, id: &str, content: &str) -> Result<Comment, StoreError> {
        self.inner.update_comment(id, content)
    }

    fn delete_comment(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_comment(id)
    }

    fn create_attachment(&mut self, new: NewAttachment) -> Result<Attachment, StoreError> {
        self.inner.create_attachment(new)
    }

    fn delete_attachment(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_attachment(id)
    }
}
