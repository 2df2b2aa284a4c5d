use crate::model::{Task, TaskFlag, TaskUpdate, TaskWithTags};
use crate::store::{Store, StoreError};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task content cannot be empty")]
    EmptyContent,
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Flag toggles
// ---------------------------------------------------------------------------

/// Flip `flag` on the caller's copy of `task` right away, then persist it.
/// On failure the copy is put back the way it was.
pub fn toggle_flag<S: Store + ?Sized>(
    store: &mut S,
    task: &mut Task,
    flag: TaskFlag,
) -> Result<bool, TaskError> {
    let previous = flag.get(task);
    flag.set(task, !previous);
    match store.update_task(&task.id, flag.update(!previous)) {
        Ok(saved) => {
            *task = saved;
            Ok(!previous)
        }
        Err(e) => {
            flag.set(task, previous);
            tracing::warn!(task = %task.id, ?flag, error = %e, "toggle failed, rolled back");
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// Replace a task's content. Attached tags are left as they are, even if
/// the new text mentions different ones.
pub fn edit_content<S: Store + ?Sized>(
    store: &mut S,
    task_id: &str,
    content: &str,
) -> Result<Task, TaskError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(TaskError::EmptyContent);
    }
    find_task(&*store, task_id)?;
    let update = TaskUpdate {
        content: Some(content.to_string()),
        ..Default::default()
    };
    Ok(store.update_task(task_id, update)?)
}

pub fn delete_task<S: Store + ?Sized>(store: &mut S, task_id: &str) -> Result<(), TaskError> {
    find_task(&*store, task_id)?;
    store.delete_task(task_id)?;
    tracing::info!(task = task_id, "deleted task");
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn find_task<S: Store + ?Sized>(store: &S, task_id: &str) -> Result<TaskWithTags, TaskError> {
    store
        .get_task(task_id)?
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
}

/// A topic's tasks split by completion, each half in listing order
#[derive(Debug, Clone, Default)]
pub struct TaskSplit {
    pub incomplete: Vec<TaskWithTags>,
    pub completed: Vec<TaskWithTags>,
}

pub fn list_topic_tasks<S: Store + ?Sized>(
    store: &S,
    topic_id: &str,
) -> Result<TaskSplit, TaskError> {
    let (completed, incomplete) = store
        .list_tasks(topic_id)?
        .into_iter()
        .partition(|t| t.task.is_completed);
    Ok(TaskSplit {
        incomplete,
        completed,
    })
}
