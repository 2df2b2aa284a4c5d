pub mod comment;
pub mod config;
pub mod tag;
pub mod task;
pub mod topic;

pub use comment::*;
pub use config::*;
pub use tag::*;
pub use task::*;
pub use topic::*;
