use crate::compose::{Candidate, SuggestDomain, SuggestionQuery};
use crate::model::{Tag, TagScope, TaskWithTags};
use crate::parse::find_mention;
use crate::store::{Store, StoreError};

/// Result cap for global task search
pub const TASK_SEARCH_LIMIT: usize = 50;

/// Scope that `#` suggestions should come from while composing `text`:
/// the mentioned topic if it resolves, else the composer's topic, else
/// global tags.
pub fn suggestion_scope<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    text: &str,
    context_topic: Option<&str>,
) -> Result<TagScope, StoreError> {
    if let Some(mention) = find_mention(text) {
        let hit = store
            .list_topics(user_id, Some(mention.name), false)?
            .into_iter()
            .find(|t| t.name == mention.name);
        if let Some(topic) = hit {
            return Ok(TagScope::Topic(topic.id));
        }
    }
    Ok(TagScope::from_topic_id(context_topic))
}

/// Candidates for an active suggestion query.
///
/// A bare trigger lists defaults: recently used tags, or all active topics.
/// Otherwise tags are matched by name within `scope` and topics by name or
/// description, most recently updated first. Archived topics are never
/// offered.
pub fn suggest<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    query: &SuggestionQuery,
    scope: &TagScope,
    limit: usize,
) -> Result<Vec<Candidate>, StoreError> {
    match query.domain() {
        SuggestDomain::Tag => {
            let tags = if query.wants_defaults() {
                store.recent_tags(user_id, scope, limit)?
            } else {
                store.search_tags(user_id, &query.query, scope, limit)?
            };
            tags.iter().map(|t| tag_candidate(store, t)).collect()
        }
        SuggestDomain::Topic => {
            let keyword = Some(query.query.as_str()).filter(|q| !q.is_empty());
            let mut topics = store.list_topics(user_id, keyword, false)?;
            // Most recent first; pinning only orders the topic list
            topics.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(topics
                .into_iter()
                .take(limit)
                .map(|t| Candidate::Topic {
                    id: t.id,
                    name: t.name,
                })
                .collect())
        }
    }
}

fn tag_candidate<S: Store + ?Sized>(store: &S, tag: &Tag) -> Result<Candidate, StoreError> {
    let parent = match tag.parent_id.as_deref() {
        Some(pid) => store.get_tag(pid)?,
        None => None,
    };
    Ok(Candidate::Tag {
        id: tag.id.clone(),
        full_name: tag.full_name(parent.as_ref()),
        emoji: tag.emoji.clone(),
    })
}

/// Tasks across all of the user's topics containing `keyword`
pub fn search_tasks<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    keyword: &str,
) -> Result<Vec<TaskWithTags>, StoreError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(Vec::new());
    }
    store.search_tasks(user_id, keyword, TASK_SEARCH_LIMIT)
}
