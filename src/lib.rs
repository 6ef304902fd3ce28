//! Read, edit, and convert MindManager `.mmap` mind maps.
//!
//! A `.mmap` file is a ZIP container whose `Document.xml` entry describes a
//! tree of topics. This crate reads that tree into an in-memory [`MindMap`],
//! lets callers navigate and edit it, and writes it back while preserving
//! every piece of the original container and document that was not
//! intentionally changed.

pub mod model;
pub use model::{
    Hyperlink, IconMarker, MindMap, Note, StructuralViolation, Task, TaskPriority, TaskStatus,
    Topic, TopicId,
};

/// Parsing and serialization of the `Document.xml` markup.
pub mod document;
pub use document::DocumentError;

/// Conversion between mind maps and plain-text outlines.
pub mod outline;

/// Reading and writing the `.mmap` ZIP container.
pub mod container;
pub use container::ContainerError;
