use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    Attachment, Comment, CommentWithAuthor, NewAttachment, NewComment, NewTag, NewTask,
    NewTopic, Profile, Tag, TagFilter, TagScope, TagUpdate, Task, TaskTag, TaskUpdate,
    TaskWithTags, Topic, TopicUpdate,
};
use crate::store::{Store, StoreError};

/// Every record the store holds, in insertion order. This is also the
/// on-disk shape used by [`FileStore`](crate::store::FileStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub profiles: IndexMap<String, Profile>,
    #[serde(default)]
    pub topics: IndexMap<String, Topic>,
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
    #[serde(default)]
    pub tags: IndexMap<String, Tag>,
    #[serde(default)]
    pub task_tags: Vec<TaskTag>,
    #[serde(default)]
    pub comments: IndexMap<String, Comment>,
    #[serde(default)]
    pub attachments: IndexMap<String, Attachment>,
}

/// A [`Store`] kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Snapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(data: Snapshot) -> Self {
        MemoryStore { data }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn with_tags(&self, task: &Task) -> TaskWithTags {
        let tags = self
            .data
            .task_tags
            .iter()
            .filter(|tt| tt.task_id == task.id)
            .filter_map(|tt| self.data.tags.get(&tt.tag_id).cloned())
            .collect();
        let attachments = self
            .data
            .attachments
            .values()
            .filter(|a| a.task_id == task.id)
            .cloned()
            .collect();
        TaskWithTags {
            task: task.clone(),
            tags,
            attachments,
        }
    }

    fn remove_task_children(&mut self, task_id: &str) {
        self.data.task_tags.retain(|tt| tt.task_id != task_id);
        self.data.comments.retain(|_, c| c.task_id != task_id);
        self.data.attachments.retain(|_, a| a.task_id != task_id);
    }
}

/// Sort newest first by `key`. Records sharing a timestamp keep the later
/// insert first.
fn newest_first<'a, T: 'a>(
    items: impl DoubleEndedIterator<Item = &'a T>,
    key: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<&'a T> {
    let mut out: Vec<&T> = items.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Store for MemoryStore {
    // ---- profiles ----

    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.data.profiles.get(user_id).cloned())
    }

    fn upsert_profile(&mut self, profile: Profile) -> Result<Profile, StoreError> {
        self.data
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    // ---- topics ----

    fn list_topics(
        &self,
        user_id: &str,
        query: Option<&str>,
        archived: bool,
    ) -> Result<Vec<Topic>, StoreError> {
        let needle = query.map(str::to_lowercase).filter(|q| !q.is_empty());
        let mut topics = newest_first(
            self.data.topics.values().filter(|t| {
                t.user_id == user_id
                    && t.is_archived == archived
                    && needle.as_deref().is_none_or(|q| {
                        contains_ci(&t.name, q)
                            || t.description.as_deref().is_some_and(|d| contains_ci(d, q))
                    })
            }),
            |t| t.updated_at,
        );
        topics.sort_by_key(|t| !t.is_pinned);
        Ok(topics.into_iter().cloned().collect())
    }

    fn get_topic(&self, id: &str) -> Result<Option<Topic>, StoreError> {
        Ok(self.data.topics.get(id).cloned())
    }

    fn create_topic(&mut self, new: NewTopic) -> Result<Topic, StoreError> {
        let now = Utc::now();
        let topic = Topic {
            id: Self::new_id(),
            user_id: new.user_id,
            name: new.name,
            description: new.description,
            icon: new.icon,
            is_archived: false,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        };
        self.data.topics.insert(topic.id.clone(), topic.clone());
        Ok(topic)
    }

    fn update_topic(&mut self, id: &str, update: TopicUpdate) -> Result<Topic, StoreError> {
        let topic = self
            .data
            .topics
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("topic", id))?;
        update.apply(topic);
        topic.updated_at = Utc::now();
        Ok(topic.clone())
    }

    fn delete_topic(&mut self, id: &str) -> Result<(), StoreError> {
        if self.data.topics.shift_remove(id).is_none() {
            return Err(StoreError::not_found("topic", id));
        }
        let task_ids: Vec<String> = self
            .data
            .tasks
            .values()
            .filter(|t| t.topic_id == id)
            .map(|t| t.id.clone())
            .collect();
        for task_id in &task_ids {
            self.data.tasks.shift_remove(task_id);
            self.remove_task_children(task_id);
        }
        let tag_ids: HashSet<String> = self
            .data
            .tags
            .values()
            .filter(|t| t.topic_id.as_deref() == Some(id))
            .map(|t| t.id.clone())
            .collect();
        self.data.tags.retain(|tid, _| !tag_ids.contains(tid));
        self.data
            .task_tags
            .retain(|tt| !tag_ids.contains(&tt.tag_id));
        Ok(())
    }

    // ---- tasks ----

    fn list_tasks(&self, topic_id: &str) -> Result<Vec<TaskWithTags>, StoreError> {
        let mut tasks = newest_first(
            self.data.tasks.values().filter(|t| t.topic_id == topic_id),
            |t| t.created_at,
        );
        tasks.sort_by_key(|t| !t.is_pinned);
        Ok(tasks.into_iter().map(|t| self.with_tags(t)).collect())
    }

    fn get_task(&self, id: &str) -> Result<Option<TaskWithTags>, StoreError> {
        Ok(self.data.tasks.get(id).map(|t| self.with_tags(t)))
    }

    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        if !self.data.topics.contains_key(&new.topic_id) {
            return Err(StoreError::not_found("topic", &new.topic_id));
        }
        let now = Utc::now();
        let task = Task {
            id: Self::new_id(),
            topic_id: new.topic_id,
            user_id: new.user_id,
            content: new.content,
            is_completed: false,
            is_pinned: false,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.data.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        let task = self
            .data
            .tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("task", id))?;
        update.apply(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        if self.data.tasks.shift_remove(id).is_none() {
            return Err(StoreError::not_found("task", id));
        }
        self.remove_task_children(id);
        Ok(())
    }

    fn search_tasks(
        &self,
        user_id: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<TaskWithTags>, StoreError> {
        let needle = keyword.to_lowercase();
        let tasks = newest_first(
            self.data
                .tasks
                .values()
                .filter(|t| t.user_id == user_id && contains_ci(&t.content, &needle)),
            |t| t.created_at,
        );
        Ok(tasks
            .into_iter()
            .take(limit)
            .map(|t| self.with_tags(t))
            .collect())
    }

    fn ongoing_tasks(&self, user_id: &str) -> Result<Vec<TaskWithTags>, StoreError> {
        let tasks = newest_first(
            self.data.tasks.values().filter(|t| {
                t.user_id == user_id
                    && !t.is_completed
                    && self
                        .data
                        .topics
                        .get(&t.topic_id)
                        .is_some_and(|topic| !topic.is_archived)
            }),
            |t| t.created_at,
        );
        Ok(tasks.into_iter().map(|t| self.with_tags(t)).collect())
    }

    // ---- tags ----

    fn list_tags(&self, user_id: &str, filter: &TagFilter) -> Result<Vec<Tag>, StoreError> {
        let mut tags: Vec<Tag> = self
            .data
            .tags
            .values()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect();
        tags.sort_by_key(|t| t.created_at);
        Ok(tags)
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>, StoreError> {
        Ok(self.data.tags.get(id).cloned())
    }

    fn search_tags(
        &self,
        user_id: &str,
        keyword: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        let needle = keyword.to_lowercase();
        let tags = newest_first(
            self.data.tags.values().filter(|t| {
                t.user_id == user_id && scope.contains(t) && contains_ci(&t.name, &needle)
            }),
            |t| t.created_at,
        );
        Ok(tags.into_iter().take(limit).cloned().collect())
    }

    fn recent_tags(
        &self,
        user_id: &str,
        scope: &TagScope,
        limit: usize,
    ) -> Result<Vec<Tag>, StoreError> {
        let links = newest_first(self.data.task_tags.iter(), |tt| tt.created_at);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for link in links {
            if out.len() >= limit {
                break;
            }
            let Some(tag) = self.data.tags.get(&link.tag_id) else {
                continue;
            };
            if tag.user_id != user_id || !scope.contains(tag) {
                continue;
            }
            if seen.insert(tag.id.as_str()) {
                out.push(tag.clone());
            }
        }
        Ok(out)
    }

    fn find_tag(
        &self,
        user_id: &str,
        name: &str,
        parent_id: Option<&str>,
        scope: &TagScope,
    ) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .data
            .tags
            .values()
            .find(|t| {
                t.user_id == user_id
                    && t.name == name
                    && t.parent_id.as_deref() == parent_id
                    && scope.contains(t)
            })
            .cloned())
    }

    fn create_tag(&mut self, new: NewTag) -> Result<Tag, StoreError> {
        if let Some(pid) = new.parent_id.as_deref() {
            let parent = self
                .data
                .tags
                .get(pid)
                .ok_or_else(|| StoreError::not_found("tag", pid))?;
            let reason = if parent.parent_id.is_some() {
                Some("it is already a child tag")
            } else if !new.scope.contains(parent) {
                Some("it belongs to another scope")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(StoreError::InvalidParent {
                    id: pid.to_string(),
                    reason,
                });
            }
        }
        let tag = Tag {
            id: Self::new_id(),
            user_id: new.user_id,
            topic_id: new.scope.topic_id().map(String::from),
            name: new.name,
            parent_id: new.parent_id,
            emoji: new.emoji,
            color: new.color,
            created_at: Utc::now(),
        };
        self.data.tags.insert(tag.id.clone(), tag.clone());
        Ok(tag)
    }

    fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag, StoreError> {
        let tag = self
            .data
            .tags
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("tag", id))?;
        update.apply(tag);
        Ok(tag.clone())
    }

    fn delete_tag(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.data.tags.contains_key(id) {
            return Err(StoreError::not_found("tag", id));
        }
        let doomed: HashSet<String> = self
            .data
            .tags
            .values()
            .filter(|t| t.id == id || t.parent_id.as_deref() == Some(id))
            .map(|t| t.id.clone())
            .collect();
        self.data.tags.retain(|tid, _| !doomed.contains(tid));
        self.data.task_tags.retain(|tt| !doomed.contains(&tt.tag_id));
        Ok(())
    }

    // ---- task-tag links ----

    fn attach_tags(&mut self, task_id: &str, tag_ids: &[String]) -> Result<(), StoreError> {
        if !self.data.tasks.contains_key(task_id) {
            return Err(StoreError::not_found("task", task_id));
        }
        if let Some(missing) = tag_ids.iter().find(|id| !self.data.tags.contains_key(*id)) {
            return Err(StoreError::not_found("tag", missing));
        }
        let now = Utc::now();
        for tag_id in tag_ids {
            let linked = self
                .data
                .task_tags
                .iter()
                .any(|tt| tt.task_id == task_id && tt.tag_id == *tag_id);
            if !linked {
                self.data.task_tags.push(TaskTag {
                    task_id: task_id.to_string(),
                    tag_id: tag_id.clone(),
                    created_at: now,
                });
            }
        }
        Ok(())
    }

    fn detach_tags(&mut self, task_id: &str) -> Result<(), StoreError> {
        self.data.task_tags.retain(|tt| tt.task_id != task_id);
        Ok(())
    }

    // ---- comments ----

    fn list_comments(&self, task_id: &str) -> Result<Vec<CommentWithAuthor>, StoreError> {
        let mut comments: Vec<&Comment> = self
            .data
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments
            .into_iter()
            .map(|c| CommentWithAuthor {
                comment: c.clone(),
                author: self.data.profiles.get(&c.user_id).cloned(),
            })
            .collect())
    }

    fn create_comment(&mut self, new: NewComment) -> Result<Comment, StoreError> {
        if !self.data.tasks.contains_key(&new.task_id) {
            return Err(StoreError::not_found("task", &new.task_id));
        }
        let now = Utc::now();
        let comment = Comment {
            id: Self::new_id(),
            task_id: new.task_id,
            user_id: new.user_id,
            content: new.content,
            created_at: now,
            updated_at: now,
        };
        self.data
            .comments
            .insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    fn update_comment(&mut self, id: &str, content: &str) -> Result<Comment, StoreError> {
        let comment = self
            .data
            .comments
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("comment", id))?;
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    fn delete_comment(&mut self, id: &str) -> Result<(), StoreError> {
        self.data
            .comments
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("comment", id))
    }

    // ---- attachments ----

    fn create_attachment(&mut self, new: NewAttachment) -> Result<Attachment, StoreError> {
        if !self.data.tasks.contains_key(&new.task_id) {
            return Err(StoreError::not_found("task", &new.task_id));
        }
        let attachment = Attachment {
            id: Self::new_id(),
            task_id: new.task_id,
            user_id: new.user_id,
            file_url: new.file_url,
            file_type: new.file_type,
            file_name: new.file_name,
            created_at: Utc::now(),
        };
        self.data
            .attachments
            .insert(attachment.id.clone(), attachment.clone());
        Ok(attachment)
    }

    fn delete_attachment(&mut self, id: &str) -> Result<(), StoreError> {
        self.data
            .attachments
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("attachment", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_TAG_COLOR;
    use pretty_assertions::assert_eq;

    fn topic(store: &mut MemoryStore, name: &str) -> Topic {
        store
            .create_topic(NewTopic {
                user_id: "u1".into(),
                name: name.into(),
                ..Default::default()
            })
            .unwrap()
    }

    fn task(store: &mut MemoryStore, topic_id: &str, content: &str) -> Task {
        store
            .create_task(NewTask {
                topic_id: topic_id.into(),
                user_id: "u1".into(),
                content: content.into(),
            })
            .unwrap()
    }

    fn tag(store: &mut MemoryStore, name: &str, parent: Option<&str>, scope: TagScope) -> Tag {
        store
            .create_tag(NewTag {
                user_id: "u1".into(),
                name: name.into(),
                parent_id: parent.map(String::from),
                scope,
                emoji: None,
                color: DEFAULT_TAG_COLOR.into(),
            })
            .unwrap()
    }

    fn names(topics: &[Topic]) -> Vec<&str> {
        topics.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_topics_pinned_then_recent() {
        let mut s = MemoryStore::new();
        let a = topic(&mut s, "Alpha");
        topic(&mut s, "Beta");
        let c = topic(&mut s, "Gamma");
        s.update_topic(
            &a.id,
            TopicUpdate {
                is_pinned: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        s.update_topic(
            &c.id,
            TopicUpdate {
                is_archived: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let active = s.list_topics("u1", None, false).unwrap();
        assert_eq!(names(&active), vec!["Alpha", "Beta"]);
        let archived = s.list_topics("u1", None, true).unwrap();
        assert_eq!(names(&archived), vec!["Gamma"]);
        assert!(s.list_topics("someone-else", None, false).unwrap().is_empty());
    }

    #[test]
    fn test_topic_query_matches_name_or_description() {
        let mut s = MemoryStore::new();
        topic(&mut s, "Groceries");
        s.create_topic(NewTopic {
            user_id: "u1".into(),
            name: "Errands".into(),
            description: Some("grocery runs and more".into()),
            icon: None,
        })
        .unwrap();
        topic(&mut s, "Work");

        let hits = s.list_topics("u1", Some("GROC"), false).unwrap();
        assert_eq!(names(&hits), vec!["Errands", "Groceries"]);
    }

    #[test]
    fn test_delete_topic_cascades() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "Home");
        let keep = topic(&mut s, "Work");
        let doomed = task(&mut s, &t.id, "fix sink");
        let kept = task(&mut s, &keep.id, "report");
        let scoped = tag(&mut s, "plumbing", None, TagScope::Topic(t.id.clone()));
        s.attach_tags(&doomed.id, &[scoped.id.clone()]).unwrap();
        s.create_comment(NewComment {
            task_id: doomed.id.clone(),
            user_id: "u1".into(),
            content: "soon".into(),
        })
        .unwrap();

        s.delete_topic(&t.id).unwrap();
        let snap = s.snapshot();
        assert!(snap.tasks.contains_key(&kept.id));
        assert!(!snap.tasks.contains_key(&doomed.id));
        assert!(snap.tags.is_empty());
        assert!(snap.task_tags.is_empty());
        assert!(snap.comments.is_empty());
    }

    #[test]
    fn test_tasks_pinned_then_newest() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let first = task(&mut s, &t.id, "first");
        task(&mut s, &t.id, "second");
        task(&mut s, &t.id, "third");
        s.update_task(
            &first.id,
            TaskUpdate {
                is_pinned: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let contents: Vec<String> = s
            .list_tasks(&t.id)
            .unwrap()
            .into_iter()
            .map(|t| t.task.content)
            .collect();
        assert_eq!(contents, vec!["first", "third", "second"]);
    }

    #[test]
    fn test_create_task_requires_topic() {
        let mut s = MemoryStore::new();
        let err = s
            .create_task(NewTask {
                topic_id: "nope".into(),
                user_id: "u1".into(),
                content: "x".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "topic", .. }));
    }

    #[test]
    fn test_attach_dedupes_and_joins() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        let a = tag(&mut s, "a", None, TagScope::Global);
        let b = tag(&mut s, "b", None, TagScope::Global);
        s.attach_tags(&k.id, &[a.id.clone(), b.id.clone()]).unwrap();
        s.attach_tags(&k.id, &[a.id.clone()]).unwrap();

        assert_eq!(s.snapshot().task_tags.len(), 2);
        let joined = s.get_task(&k.id).unwrap().unwrap();
        let tag_names: Vec<&str> = joined.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["a", "b"]);
    }

    #[test]
    fn test_attach_unknown_tag_writes_nothing() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        let a = tag(&mut s, "a", None, TagScope::Global);
        let err = s.attach_tags(&k.id, &[a.id, "ghost".into()]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "tag", .. }));
        assert!(s.snapshot().task_tags.is_empty());
    }

    #[test]
    fn test_find_tag_respects_parent_and_scope() {
        let mut s = MemoryStore::new();
        let work = tag(&mut s, "work", None, TagScope::Global);
        let urgent = tag(&mut s, "urgent", Some(&work.id), TagScope::Global);
        let scoped = TagScope::Topic("t1".into());
        let local = tag(&mut s, "work", None, scoped.clone());

        let found = s.find_tag("u1", "urgent", Some(&work.id), &TagScope::Global);
        assert_eq!(found.unwrap().unwrap().id, urgent.id);
        assert!(s.find_tag("u1", "urgent", None, &TagScope::Global).unwrap().is_none());
        let found = s.find_tag("u1", "work", None, &scoped).unwrap().unwrap();
        assert_eq!(found.id, local.id);
        assert!(s.find_tag("u1", "Work", None, &scoped).unwrap().is_none());
    }

    #[test]
    fn test_search_tags_scoped_newest_first() {
        let mut s = MemoryStore::new();
        tag(&mut s, "shopping", None, TagScope::Global);
        tag(&mut s, "Shop", None, TagScope::Global);
        tag(&mut s, "shoes", None, TagScope::Topic("t1".into()));

        let hits: Vec<String> = s
            .search_tags("u1", "sho", &TagScope::Global, 10)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(hits, vec!["Shop", "shopping"]);
        assert_eq!(s.search_tags("u1", "sho", &TagScope::Global, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_recent_tags_distinct_by_latest_use() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let a = tag(&mut s, "a", None, TagScope::Global);
        let b = tag(&mut s, "b", None, TagScope::Global);
        tag(&mut s, "unused", None, TagScope::Global);
        let k1 = task(&mut s, &t.id, "1");
        let k2 = task(&mut s, &t.id, "2");
        let k3 = task(&mut s, &t.id, "3");
        s.attach_tags(&k1.id, &[a.id.clone()]).unwrap();
        s.attach_tags(&k2.id, &[b.id.clone()]).unwrap();
        s.attach_tags(&k3.id, &[a.id.clone()]).unwrap();

        let recent: Vec<String> = s
            .recent_tags("u1", &TagScope::Global, 10)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(recent, vec!["a", "b"]);
        assert_eq!(s.recent_tags("u1", &TagScope::Global, 1).unwrap().len(), 1);
        assert!(
            s.recent_tags("u1", &TagScope::Topic(t.id), 10)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_delete_parent_tag_removes_children() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        let work = tag(&mut s, "work", None, TagScope::Global);
        let urgent = tag(&mut s, "urgent", Some(&work.id), TagScope::Global);
        let other = tag(&mut s, "home", None, TagScope::Global);
        s.attach_tags(&k.id, &[work.id.clone(), urgent.id.clone(), other.id.clone()])
            .unwrap();

        s.delete_tag(&work.id).unwrap();
        let left: Vec<&str> = s.snapshot().tags.values().map(|t| t.name.as_str()).collect();
        assert_eq!(left, vec!["home"]);
        assert_eq!(s.snapshot().task_tags.len(), 1);
    }

    #[test]
    fn test_create_tag_with_unknown_parent() {
        let mut s = MemoryStore::new();
        let err = s
            .create_tag(NewTag {
                user_id: "u1".into(),
                name: "x".into(),
                parent_id: Some("ghost".into()),
                scope: TagScope::Global,
                emoji: None,
                color: DEFAULT_TAG_COLOR.into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "tag", .. }));
    }

    #[test]
    fn test_create_tag_rejects_nested_or_foreign_parent() {
        let mut s = MemoryStore::new();
        let work = tag(&mut s, "work", None, TagScope::Global);
        let urgent = tag(&mut s, "urgent", Some(&work.id), TagScope::Global);
        let new_child = |parent: &str, scope: TagScope| NewTag {
            user_id: "u1".into(),
            name: "now".into(),
            parent_id: Some(parent.into()),
            scope,
            emoji: None,
            color: DEFAULT_TAG_COLOR.into(),
        };

        let err = s
            .create_tag(new_child(urgent.id.as_str(), TagScope::Global))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidParent { ref id, .. } if *id == urgent.id));

        let err = s
            .create_tag(new_child(work.id.as_str(), TagScope::Topic("t1".into())))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidParent { ref id, .. } if *id == work.id));
        assert_eq!(s.snapshot().tags.len(), 2);
    }

    #[test]
    fn test_search_and_ongoing() {
        let mut s = MemoryStore::new();
        let home = topic(&mut s, "Home");
        let old = topic(&mut s, "Old");
        task(&mut s, &home.id, "Buy milk");
        let done = task(&mut s, &home.id, "buy bread");
        task(&mut s, &old.id, "buy nails");
        s.update_task(
            &done.id,
            TaskUpdate {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        s.update_topic(
            &old.id,
            TopicUpdate {
                is_archived: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let found: Vec<String> = s
            .search_tasks("u1", "BUY", 50)
            .unwrap()
            .into_iter()
            .map(|t| t.task.content)
            .collect();
        assert_eq!(found, vec!["buy nails", "buy bread", "Buy milk"]);
        assert_eq!(s.search_tasks("u1", "buy", 2).unwrap().len(), 2);

        let ongoing: Vec<String> = s
            .ongoing_tasks("u1")
            .unwrap()
            .into_iter()
            .map(|t| t.task.content)
            .collect();
        assert_eq!(ongoing, vec!["Buy milk"]);
    }

    #[test]
    fn test_comments_oldest_first_with_author() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        s.upsert_profile(Profile {
            id: "u1".into(),
            nickname: Some("ann".into()),
            avatar_url: None,
        })
        .unwrap();
        for content in ["one", "two"] {
            s.create_comment(NewComment {
                task_id: k.id.clone(),
                user_id: "u1".into(),
                content: content.into(),
            })
            .unwrap();
        }

        let comments = s.list_comments(&k.id).unwrap();
        let bodies: Vec<&str> = comments.iter().map(|c| c.comment.content.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two"]);
        assert_eq!(
            comments[0].author.as_ref().and_then(|p| p.nickname.as_deref()),
            Some("ann")
        );

        let id = comments[0].comment.id.clone();
        s.update_comment(&id, "uno").unwrap();
        s.delete_comment(&comments[1].comment.id).unwrap();
        let left = s.list_comments(&k.id).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].comment.content, "uno");
    }

    #[test]
    fn test_attachments_joined_and_tags_detached() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        let a = tag(&mut s, "a", None, TagScope::Global);
        s.attach_tags(&k.id, &[a.id.clone()]).unwrap();
        let img = s
            .create_attachment(NewAttachment {
                task_id: k.id.clone(),
                user_id: "u1".into(),
                file_url: "https://x/a.png".into(),
                file_type: Some("image/png".into()),
                file_name: Some("a.png".into()),
            })
            .unwrap();

        let joined = s.get_task(&k.id).unwrap().unwrap();
        assert_eq!(joined.attachments, vec![img.clone()]);
        assert_eq!(joined.tags.len(), 1);

        s.detach_tags(&k.id).unwrap();
        s.delete_attachment(&img.id).unwrap();
        let joined = s.get_task(&k.id).unwrap().unwrap();
        assert!(joined.tags.is_empty());
        assert!(joined.attachments.is_empty());
        // The tag itself stays
        assert_eq!(s.list_tags("u1", &TagFilter::Any).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_task_cascades() {
        let mut s = MemoryStore::new();
        let t = topic(&mut s, "T");
        let k = task(&mut s, &t.id, "x");
        let a = tag(&mut s, "a", None, TagScope::Global);
        s.attach_tags(&k.id, &[a.id.clone()]).unwrap();
        s.create_attachment(NewAttachment {
            task_id: k.id.clone(),
            user_id: "u1".into(),
            file_url: "https://x/a.png".into(),
            file_type: Some("image/png".into()),
            file_name: None,
        })
        .unwrap();

        s.delete_task(&k.id).unwrap();
        let snap = s.snapshot();
        assert!(snap.task_tags.is_empty());
        assert!(snap.attachments.is_empty());
        assert_eq!(snap.tags.len(), 1);
        assert!(matches!(
            s.delete_task(&k.id),
            Err(StoreError::NotFound { kind: "task", .. })
        ));
    }
}
