//! The arena-backed topic tree.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use super::task::{Task, TaskStatus};
use super::{Hyperlink, IconMarker, Note};

/// Handle to a topic stored in a [`MindMap`] arena.
///
/// Ids are only minted by the map that owns the topic and remain valid for
/// the lifetime of the map; detaching a topic does not invalidate its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicId(usize);

/// A single topic node in a mind map.
///
/// Payload fields are public and freely editable. The tree structure
/// (parent link and child order) is owned by the [`MindMap`] and changed
/// only through its methods, which is what keeps the tree acyclic and
/// single-rooted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topic {
    /// Stable identifier from the document (`OId`). Empty for topics created
    /// in memory; the encoder mints a fresh one on write.
    pub oid: String,
    /// Display text.
    pub text: String,
    /// Optional task metadata.
    pub task: Option<Task>,
    /// Icon markers, in document order.
    pub icons: Vec<IconMarker>,
    /// Hyperlinks, in document order.
    pub hyperlinks: Vec<Hyperlink>,
    /// Optional note.
    pub note: Option<Note>,
    /// Unrecognized markup attributes, retained verbatim for fidelity.
    ///
    /// Ordered name/value pairs, never interpreted. The `OId` attribute is
    /// excluded (it lives in [`Topic::oid`]).
    pub attributes: Vec<(String, String)>,
    /// Opaque serialized style sub-markup, passed through unchanged.
    pub style: Option<String>,

    parent: Option<TopicId>,
    children: Vec<TopicId>,
}

impl Topic {
    /// The parent topic, or `None` for the root and detached topics.
    #[must_use]
    pub const fn parent(&self) -> Option<TopicId> {
        self.parent
    }

    /// Child topic ids, in order.
    #[must_use]
    pub fn children(&self) -> &[TopicId] {
        &self.children
    }

    /// Whether this topic has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A tree-invariant violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralViolation {
    /// The destination of a move is the moved topic itself or one of its
    /// descendants, which would create a cycle.
    #[error("cannot move a topic beneath itself or its own descendant")]
    Cycle,
    /// The root topic cannot be reparented.
    #[error("the root topic cannot be moved")]
    Root,
}

/// A complete mind map: one root topic plus document-level metadata.
///
/// The map exclusively owns every topic, including detached ones, in an
/// internal arena.
#[derive(Debug, Clone)]
pub struct MindMap {
    arena: Vec<Topic>,
    root: TopicId,

    /// Document creation timestamp, when known.
    pub created: Option<NaiveDateTime>,
    /// Document modification timestamp, when known.
    pub modified: Option<NaiveDateTime>,

    source_path: PathBuf,
    namespace: String,
}

impl MindMap {
    /// Creates a map containing a single root topic with the given text.
    #[must_use]
    pub fn new(root_text: impl Into<String>) -> Self {
        let root = Topic {
            text: root_text.into(),
            ..Topic::default()
        };
        Self {
            arena: vec![root],
            root: TopicId(0),
            created: None,
            modified: None,
            source_path: PathBuf::new(),
            namespace: String::new(),
        }
    }

    /// The root topic id.
    #[must_use]
    pub const fn root(&self) -> TopicId {
        self.root
    }

    /// The map title, which mirrors the root topic's text.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.topic(self.root).text
    }

    /// Borrows a topic.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different map.
    #[must_use]
    pub fn topic(&self, id: TopicId) -> &Topic {
        &self.arena[id.0]
    }

    /// Mutably borrows a topic's payload.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different map.
    pub fn topic_mut(&mut self, id: TopicId) -> &mut Topic {
        &mut self.arena[id.0]
    }

    /// The container path this map was read from. Empty if the map was
    /// created in memory, which makes a write produce a fresh container.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Sets the originating container path.
    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        self.source_path = path.into();
    }

    /// The document namespace URI. Empty until read from a document; the
    /// encoder substitutes the standard MindManager namespace then.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sets the document namespace URI.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    /// Number of parent links between `id` and the root (the root has
    /// depth 0). Detached topics report depth relative to their own subtree
    /// root.
    #[must_use]
    pub fn depth(&self, id: TopicId) -> usize {
        let mut depth = 0;
        let mut current = self.topic(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.topic(parent).parent;
        }
        depth
    }

    /// Topic texts from the root to `id`, inclusive, root first.
    #[must_use]
    pub fn path(&self, id: TopicId) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(topic) = current {
            parts.push(self.topic(topic).text.as_str());
            current = self.topic(topic).parent;
        }
        parts.reverse();
        parts
    }

    /// Depth-first pre-order traversal of the subtree rooted at `start`,
    /// including `start` itself. Each call returns a fresh iterator.
    #[must_use]
    pub fn walk(&self, start: TopicId) -> Walk<'_> {
        Walk {
            map: self,
            stack: vec![start],
        }
    }

    /// Number of topics in the subtree rooted at `start`, including `start`.
    #[must_use]
    pub fn count(&self, start: TopicId) -> usize {
        self.walk(start).count()
    }

    /// Number of topics reachable from the root.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.count(self.root)
    }

    /// First topic under `start` (pre-order) whose text equals `text`,
    /// compared case-insensitively.
    #[must_use]
    pub fn find(&self, start: TopicId, text: &str) -> Option<TopicId> {
        let needle = text.to_lowercase();
        self.walk(start)
            .find(|&id| self.topic(id).text.to_lowercase() == needle)
    }

    /// All topics under `start` whose text equals `text`, in traversal
    /// order, compared case-insensitively.
    #[must_use]
    pub fn find_all(&self, start: TopicId, text: &str) -> Vec<TopicId> {
        let needle = text.to_lowercase();
        self.walk(start)
            .filter(|&id| self.topic(id).text.to_lowercase() == needle)
            .collect()
    }

    /// Creates a topic with the given text and appends it as the last child
    /// of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was minted by a different map.
    pub fn add_child(&mut self, parent: TopicId, text: impl Into<String>) -> TopicId {
        let id = TopicId(self.arena.len());
        self.arena.push(Topic {
            text: text.into(),
            parent: Some(parent),
            ..Topic::default()
        });
        self.arena[parent.0].children.push(id);
        id
    }

    /// Detaches `id` from its parent. No-op if the topic has no parent.
    ///
    /// The detached subtree stays internally valid and can be re-attached
    /// with [`MindMap::move_to`], but is no longer reachable from the root.
    pub fn remove(&mut self, id: TopicId) {
        let Some(parent) = self.arena[id.0].parent.take() else {
            return;
        };
        self.arena[parent.0].children.retain(|&child| child != id);
    }

    /// Moves `id` to be the last child of `new_parent`.
    ///
    /// The move is atomic: on success the topic is attached to exactly its
    /// new parent, and on failure the tree is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralViolation::Root`] when `id` is the map root, or
    /// [`StructuralViolation::Cycle`] when `new_parent` is `id` itself or
    /// one of its descendants.
    pub fn move_to(
        &mut self,
        id: TopicId,
        new_parent: TopicId,
    ) -> Result<(), StructuralViolation> {
        if id == self.root {
            return Err(StructuralViolation::Root);
        }

        // Reject before mutating: if `id` sits on the destination's parent
        // chain, attaching under it would close a cycle.
        let mut current = Some(new_parent);
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(StructuralViolation::Cycle);
            }
            current = self.topic(ancestor).parent;
        }

        self.remove(id);
        self.arena[id.0].parent = Some(new_parent);
        self.arena[new_parent.0].children.push(id);
        Ok(())
    }

    /// All topics reachable from the root that carry a task, in walk order,
    /// optionally restricted to tasks with the given derived status.
    pub fn tasks(&self, status: Option<TaskStatus>) -> impl Iterator<Item = TopicId> + '_ {
        self.walk(self.root).filter(move |&id| {
            self.topic(id)
                .task
                .as_ref()
                .is_some_and(|task| status.is_none_or(|status| task.status() == status))
        })
    }
}

/// Lazy depth-first pre-order traversal over a subtree.
///
/// Created by [`MindMap::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    map: &'a MindMap,
    stack: Vec<TopicId>,
}

impl Iterator for Walk<'_> {
    type Item = TopicId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.map.topic(id).children().iter().rev());
        Some(id)
    }
}
