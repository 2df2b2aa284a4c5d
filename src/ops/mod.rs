pub mod search;
pub mod submit;
pub mod tag_ops;
pub mod task_ops;
pub mod topic_ops;
