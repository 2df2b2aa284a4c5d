use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::compose::{Candidate, SuggestionQuery};
use crate::model::{CommentWithAuthor, Tag, TaskWithTags, Topic};
use crate::parse::{extract_image_urls, highlight_tags, preview};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TopicJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub topic_id: String,
    pub content: String,
    /// Content with tags and image tokens removed
    pub preview: String,
    pub completed: bool,
    pub pinned: bool,
    pub favorite: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub topic: TopicJson,
    pub incomplete: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct SegmentJson {
    pub text: String,
    pub is_tag: bool,
}

#[derive(Serialize)]
pub struct CommentJson {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TaskDetailJson {
    #[serde(flatten)]
    pub task: TaskJson,
    pub segments: Vec<SegmentJson>,
    pub comments: Vec<CommentJson>,
}

#[derive(Serialize)]
pub struct PostedJson {
    pub topic: String,
    #[serde(flatten)]
    pub task: TaskJson,
}

#[derive(Serialize)]
pub struct TagJson {
    pub id: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
}

#[derive(Serialize)]
pub struct SuggestJson<'a> {
    /// Absent when no token is in progress at the cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<&'a SuggestionQuery>,
    pub candidates: &'a [Candidate],
}

#[derive(Serialize)]
pub struct CompleteJson {
    pub text: String,
    /// Cursor position in characters
    pub cursor: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn topic_to_json(topic: &Topic) -> TopicJson {
    TopicJson {
        id: topic.id.clone(),
        name: topic.name.clone(),
        description: topic.description.clone(),
        icon: topic.icon.clone(),
        pinned: topic.is_pinned,
        archived: topic.is_archived,
        updated_at: topic.updated_at,
    }
}

/// Full names of the task's tags, resolving parents among the task's own
/// tags
pub fn tag_names(task: &TaskWithTags) -> Vec<String> {
    task.tags.iter().map(|t| t.full_name_in(&task.tags)).collect()
}

pub fn task_to_json(task: &TaskWithTags, preview_chars: usize) -> TaskJson {
    let t = &task.task;
    TaskJson {
        id: t.id.clone(),
        topic_id: t.topic_id.clone(),
        content: t.content.clone(),
        preview: preview(&t.content, preview_chars),
        completed: t.is_completed,
        pinned: t.is_pinned,
        favorite: t.is_favorite,
        tags: tag_names(task),
        images: extract_image_urls(&t.content),
        created_at: t.created_at,
    }
}

pub fn comment_to_json(c: &CommentWithAuthor) -> CommentJson {
    CommentJson {
        id: c.comment.id.clone(),
        author: author_name(c),
        content: c.comment.content.clone(),
        created_at: c.comment.created_at,
    }
}

pub fn task_detail_json(
    task: &TaskWithTags,
    comments: &[CommentWithAuthor],
    preview_chars: usize,
) -> TaskDetailJson {
    TaskDetailJson {
        task: task_to_json(task, preview_chars),
        segments: highlight_tags(&task.task.content)
            .into_iter()
            .map(|s| SegmentJson {
                text: s.text.to_string(),
                is_tag: s.is_tag,
            })
            .collect(),
        comments: comments.iter().map(comment_to_json).collect(),
    }
}

/// `all` is the set used to resolve parent names
pub fn tag_to_json(tag: &Tag, all: &[Tag]) -> TagJson {
    TagJson {
        id: tag.id.clone(),
        full_name: tag.full_name_in(all),
        emoji: tag.emoji.clone(),
        color: tag.color.clone(),
        topic_id: tag.topic_id.clone(),
    }
}

fn author_name(c: &CommentWithAuthor) -> Option<String> {
    c.author
        .as_ref()
        .and_then(|p| p.nickname.clone())
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line topic summary: `* 🏠 Home  <id>` (`*` marks pinned)
pub fn format_topic_line(topic: &Topic) -> String {
    let pin = if topic.is_pinned { "* " } else { "  " };
    let icon = topic
        .icon
        .as_ref()
        .map(|i| format!("{} ", i))
        .unwrap_or_default();
    format!("{}{}{}  {}", pin, icon, topic.name, topic.id)
}

fn flags(task: &TaskWithTags) -> String {
    let t = &task.task;
    let mut out = String::new();
    if t.is_pinned {
        out.push('^');
    }
    if t.is_favorite {
        out.push('*');
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out
}

/// `[x] ^* preview  #tag #parent/child  <id>`
pub fn format_task_line(task: &TaskWithTags, preview_chars: usize) -> String {
    let t = &task.task;
    let check = if t.is_completed { 'x' } else { ' ' };
    let mut line = format!(
        "[{}] {}{}",
        check,
        flags(task),
        preview(&t.content, preview_chars)
    );
    let tags = tag_names(task);
    if !tags.is_empty() {
        line.push_str("  ");
        line.push_str(
            &tags
                .iter()
                .map(|n| format!("#{}", n))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    let images = extract_image_urls(&t.content).len();
    if images > 0 {
        line.push_str(&format!("  [{} image{}]", images, if images == 1 { "" } else { "s" }));
    }
    line.push_str("  ");
    line.push_str(&t.id);
    line
}

pub fn format_task_detail(task: &TaskWithTags, comments: &[CommentWithAuthor]) -> Vec<String> {
    let t = &task.task;
    let mut lines = Vec::new();
    let check = if t.is_completed { 'x' } else { ' ' };
    lines.push(format!("[{}] {}{}", check, flags(task), t.id));
    for line in t.content.lines() {
        lines.push(format!("  {}", line));
    }

    let tags = tag_names(task);
    if !tags.is_empty() {
        lines.push(format!(
            "tags: {}",
            tags.iter()
                .map(|n| format!("#{}", n))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    for url in extract_image_urls(&t.content) {
        lines.push(format!("image: {}", url));
    }
    for a in &task.attachments {
        lines.push(format!(
            "attachment: {}",
            a.file_name.as_deref().unwrap_or(&a.file_url)
        ));
    }
    lines.push(format!("created: {}", t.created_at.format("%Y-%m-%d %H:%M")));

    if !comments.is_empty() {
        lines.push(String::new());
        lines.push("comments:".to_string());
        for c in comments {
            let who = author_name(c).unwrap_or_else(|| c.comment.user_id.clone());
            lines.push(format!("  {}: {}", who, c.comment.content));
        }
    }
    lines
}

/// `🔥 work/urgent  #4A90E2  <id>`
pub fn format_tag_line(tag: &Tag, all: &[Tag]) -> String {
    let emoji = tag.emoji.as_deref().unwrap_or(" ");
    format!("{} {}  {}  {}", emoji, tag.full_name_in(all), tag.color, tag.id)
}

pub fn format_candidate(index: usize, candidate: &Candidate) -> String {
    match candidate {
        Candidate::Tag {
            full_name, emoji, ..
        } => match emoji {
            Some(e) => format!("{:>2}. #{} {}", index, full_name, e),
            None => format!("{:>2}. #{}", index, full_name),
        },
        Candidate::Topic { name, .. } => format!("{:>2}. @{}", index, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comment, Profile, Task};
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn tag(id: &str, name: &str, parent: Option<&str>) -> Tag {
        Tag {
            id: id.into(),
            user_id: "u1".into(),
            topic_id: Some("t1".into()),
            name: name.into(),
            parent_id: parent.map(String::from),
            emoji: Some("🔥".into()),
            color: "#4A90E2".into(),
            created_at: at(),
        }
    }

    fn task(content: &str) -> TaskWithTags {
        TaskWithTags {
            task: Task {
                id: "k1".into(),
                topic_id: "t1".into(),
                user_id: "u1".into(),
                content: content.into(),
                is_completed: false,
                is_pinned: true,
                is_favorite: false,
                created_at: at(),
                updated_at: at(),
            },
            tags: vec![tag("a", "shopping", None), tag("b", "urgent", Some("a"))],
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_task_line() {
        let t = task("#shopping/urgent buy milk [图片:https://x.com/a.png]");
        assert_snapshot!(format_task_line(&t, 100), @"[ ] ^ buy milk  #shopping #shopping/urgent  [1 image]  k1");
    }

    #[test]
    fn test_task_line_truncates_preview() {
        let mut t = task("abcdefghij");
        t.tags.clear();
        t.task.is_pinned = false;
        assert_snapshot!(format_task_line(&t, 4), @"[ ] abcd...  k1");
    }

    #[test]
    fn test_task_detail() {
        let t = task("buy milk #shopping/urgent");
        let comments = vec![CommentWithAuthor {
            comment: Comment {
                id: "c1".into(),
                task_id: "k1".into(),
                user_id: "u1".into(),
                content: "done soon".into(),
                created_at: at(),
                updated_at: at(),
            },
            author: Some(Profile {
                id: "u1".into(),
                nickname: Some("ann".into()),
                avatar_url: None,
            }),
        }];
        assert_snapshot!(format_task_detail(&t, &comments).join("\n"), @r"
        [ ] ^ k1
          buy milk #shopping/urgent
        tags: #shopping #shopping/urgent
        created: 2024-05-01 09:30

        comments:
          ann: done soon
        ");
    }

    #[test]
    fn test_tag_and_candidate_lines() {
        let all = vec![tag("a", "work", None), tag("b", "urgent", Some("a"))];
        assert_snapshot!(format_tag_line(&all[1], &all), @"🔥 work/urgent  #4A90E2  b");
        let c = Candidate::Topic {
            id: "t1".into(),
            name: "Groceries".into(),
        };
        assert_eq!(format_candidate(3, &c), " 3. @Groceries");
    }

    #[test]
    fn test_detail_json_segments() {
        let t = task("hi #shopping");
        let json = task_detail_json(&t, &[], 100);
        let tags: Vec<&str> = json
            .segments
            .iter()
            .filter(|s| s.is_tag)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(tags, vec!["#shopping"]);
        assert_eq!(json.task.preview, "hi");
    }
}
