//! In-memory topic tree for mind maps.
//!
//! The [`MindMap`] owns every topic in an arena and hands out [`TopicId`]
//! handles. Parent links are plain indices used only for upward navigation,
//! so ownership stays singular and the tree cannot form reference cycles.
//! The model knows nothing about the container or the markup format.

mod task;
mod topic;

pub use task::{Hyperlink, IconMarker, Note, Task, TaskPriority, TaskStatus};
pub use topic::{MindMap, StructuralViolation, Topic, TopicId, Walk};
