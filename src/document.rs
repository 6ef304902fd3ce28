//! Parse and serialize the `Document.xml` markup.
//!
//! The decoder turns document bytes into a [`crate::MindMap`]; the encoder
//! does the reverse. The round trip is *structural*, not byte-identical:
//! attribute order and whitespace may differ, but every field the model does
//! not touch decodes back to an equal value, including unrecognized topic
//! attributes and the opaque style blob.

mod decode;
mod element;
mod encode;

pub use decode::decode;
pub use element::Element;
pub use encode::{encode, encode_into};
use thiserror::Error;

/// The MindManager document namespace URI.
///
/// Used for maps that were not read from an existing document. The encoder
/// always receives the namespace explicitly through the map; there is no
/// process-wide registration.
pub const NAMESPACE: &str = "http://schemas.mindjet.com/MindManager/Application/2003";

/// Timestamp format used by date attributes in the document.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors raised while decoding or re-encoding a document.
///
/// Only *structural* problems are errors. Malformed field values
/// (percentages, priorities, dates) degrade to defaults and are logged,
/// never surfaced.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A required markup structure is missing.
    #[error("malformed document: {0}")]
    Malformed(&'static str),
    /// The underlying markup could not be parsed.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

/// Element and attribute names of the document schema.
pub(crate) mod name {
    pub const MAP: &str = "Map";
    pub const ONE_TOPIC: &str = "OneTopic";
    pub const TOPIC: &str = "Topic";
    pub const TEXT: &str = "Text";
    pub const TASK: &str = "Task";
    pub const ICON_MARKERS: &str = "IconMarkers";
    pub const ICON_MARKER: &str = "IconMarker";
    pub const HYPERLINK: &str = "Hyperlink";
    pub const HYPERLINK_GROUP: &str = "HyperlinkGroup";
    pub const NOTES_GROUP: &str = "NotesGroup";
    pub const NOTES: &str = "Notes";
    pub const HTML: &str = "Html";
    pub const SUB_TOPIC_SHAPE: &str = "SubTopicShape";
    pub const SUB_TOPICS: &str = "SubTopics";

    pub const OID: &str = "OId";
    pub const PLAIN_TEXT: &str = "PlainText";
    pub const TASK_PERCENTAGE: &str = "TaskPercentage";
    pub const TASK_PRIORITY: &str = "TaskPriority";
    pub const TASK_DUE_DATE: &str = "TaskDueDate";
    pub const TASK_START_DATE: &str = "TaskStartDate";
    pub const URL: &str = "Url";
    pub const LINK_TEXT: &str = "Text";
    pub const ICON_TYPE: &str = "IconType";
    pub const ICON_SIGNATURE: &str = "IconSignature";
}
