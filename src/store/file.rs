use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::atomic_write;
use crate::model::{
    Attachment, Comment, CommentWithAuthor, NewAttachment, NewComment, NewTag, NewTask,
    NewTopic, Profile, Tag, TagFilter, TagScope, TagUpdate, Task, TaskUpdate, TaskWithTags,
    Topic, TopicUpdate,
};
use crate::store::memory::{MemoryStore, Snapshot};
use crate::store::{Store, StoreError};

/// A [`MemoryStore`] persisted as one JSON document.
///
/// The whole snapshot is rewritten after every successful mutation. If the
/// write fails the in-memory state keeps the change but the call reports
/// the error, so callers treat it like any other failed store call.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            Snapshot::default()
        };
        tracing::debug!(path = %path.display(), "opened store");
        Ok(FileStore {
            path: path.to_path_buf(),
            inner: MemoryStore::from_snapshot(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current snapshot to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self.inner.snapshot())?;
        atomic_write(&self.path, json.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }

    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let out = f(&mut self.inner)?;
        self.flush()?;
        Ok(out)
    }
}

impl Store for FileStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.inner.get_profile(user_id)
    }

    fn upsert_profile(&mut self, profile: Profile) -> Result<Profile, StoreError> {
        self.mutate(|s| s.upsert_profile(profile))
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
        self.mutate(|s| s.create_topic(new))
    }

    fn update_topic(&mut self, id: &str, update: TopicUpdate) -> Result<Topic, StoreError> {
        self.mutate(|s| s.update_topic(id, update))
    }

    fn delete_topic(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_topic(id))
    }

    fn list_tasks(&self, topic_id: &str) -> Result<Vec<TaskWithTags>, StoreError> {
        self.inner.list_tasks(topic_id)
    }

    fn get_task(&self, id: &str) -> Result<Option<TaskWithTags>, StoreError> {
        self.inner.get_task(id)
    }

    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        self.mutate(|s| s.create_task(new))
    }

    fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        self.mutate(|s| s.update_task(id, update))
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_task(id))
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
        self.mutate(|s| s.create_tag(new))
    }

    fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag, StoreError> {
        self.mutate(|s| s.update_tag(id, update))
    }

    fn delete_tag(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_tag(id))
    }

    fn attach_tags(&mut self, task_id: &str, tag_ids: &[String]) -> Result<(), StoreError> {
        self.mutate(|s| s.attach_tags(task_id, tag_ids))
    }

    fn detach_tags(&mut self, task_id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.detach_tags(task_id))
    }

    fn list_comments(&self, task_id: &str) -> Result<Vec<CommentWithAuthor>, StoreError> {
        self.inner.list_comments(task_id)
    }

    fn create_comment(&mut self, new: NewComment) -> Result<Comment, StoreError> {
        self.mutate(|s| s.create_comment(new))
    }

    fn update_comment(&mut self, id: &str, content: &str) -> Result<Comment, StoreError> {
        self.mutate(|s| s.update_comment(id, content))
    }

    fn delete_comment(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_comment(id))
    }

    fn create_attachment(&mut self, new: NewAttachment) -> Result<Attachment, StoreError> {
        self.mutate(|s| s.create_attachment(new))
    }

    fn delete_attachment(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_attachment(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(&dir.path().join("store.json")).unwrap();
        assert!(store.list_topics("u1", None, false).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        let topic = store
            .create_topic(NewTopic {
                user_id: "u1".into(),
                name: "Groceries".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .create_task(NewTask {
                topic_id: topic.id.clone(),
                user_id: "u1".into(),
                content: "milk".into(),
            })
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let tasks = reopened.list_tasks(&topic.id).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task.content, "milk");
    }

    #[test]
    fn test_failed_mutation_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        assert!(store.delete_task("ghost").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }
}
