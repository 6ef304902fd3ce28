//! Task metadata and the other per-topic payloads.

use chrono::NaiveDateTime;

/// Task metadata attached to a topic.
///
/// Completion status is never stored: it is always derived from the
/// percentage via [`Task::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    /// Completion percentage, clamped to `0..=100`.
    percentage: u8,
    /// Task priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<NaiveDateTime>,
    /// Optional start date.
    pub start_date: Option<NaiveDateTime>,
}

impl Task {
    /// Creates an empty, not-started task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The completion percentage (0–100).
    #[must_use]
    pub const fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Sets the completion percentage, clamping to 100.
    pub const fn set_percentage(&mut self, percentage: u8) {
        self.percentage = if percentage > 100 { 100 } else { percentage };
    }

    /// The status derived from the completion percentage.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        match self.percentage {
            0 => TaskStatus::NotStarted,
            1..=99 => TaskStatus::InProgress,
            _ => TaskStatus::Complete,
        }
    }
}

/// Task priority levels.
///
/// The document format stores these as numeric code strings with severity
/// *inverted*: `"1"` is high and `"3"` is low. That mapping is dictated by
/// the format and preserved here as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    /// No priority assigned (stored as an empty code).
    #[default]
    None,
    /// Low priority (code `"3"`).
    Low,
    /// Medium priority (code `"2"`).
    Medium,
    /// High priority (code `"1"`).
    High,
}

impl TaskPriority {
    /// The code string used by the document format.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Low => "3",
            Self::Medium => "2",
            Self::High => "1",
        }
    }

    /// Parses a document code string. Unrecognized codes map to `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Self::High,
            "2" => Self::Medium,
            "3" => Self::Low,
            _ => Self::None,
        }
    }
}

/// Task status, derived from the completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Percentage is 0.
    NotStarted,
    /// Percentage is strictly between 0 and 100.
    InProgress,
    /// Percentage is 100 (or more, before clamping).
    Complete,
}

/// An icon/marker attached to a topic.
///
/// A handful of type URIs are well known, but unknown URIs round-trip
/// through the codec unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconMarker {
    /// Icon type URI.
    pub icon_type: String,
    /// Opaque icon signature.
    pub signature: String,
}

impl IconMarker {
    /// Priority 1 marker.
    pub const PRIORITY_1: &'static str = "urn:mindjet:Priority1";
    /// Priority 2 marker.
    pub const PRIORITY_2: &'static str = "urn:mindjet:Priority2";
    /// Priority 3 marker.
    pub const PRIORITY_3: &'static str = "urn:mindjet:Priority3";
    /// Flag marker.
    pub const FLAG: &'static str = "urn:mindjet:Flag";
    /// Star marker.
    pub const STAR: &'static str = "urn:mindjet:Star";
    /// Green tick marker.
    pub const TICK_GREEN: &'static str = "urn:mindjet:TickGreen";
    /// Yellow tick marker.
    pub const TICK_YELLOW: &'static str = "urn:mindjet:TickYellow";
    /// Red cross marker.
    pub const CROSS_RED: &'static str = "urn:mindjet:CrossRed";

    /// Creates a marker with the given type URI and no signature.
    #[must_use]
    pub fn new(icon_type: impl Into<String>) -> Self {
        Self {
            icon_type: icon_type.into(),
            signature: String::new(),
        }
    }
}

/// A hyperlink attached to a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hyperlink {
    /// Link target URL.
    pub url: String,
    /// Optional display text (empty if absent).
    pub text: String,
}

impl Hyperlink {
    /// Creates a hyperlink with no display text.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: String::new(),
        }
    }
}

/// A note attached to a topic.
///
/// Plain text and rich markup are kept as parallel fields; the plain text is
/// authoritative for outline conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    /// Plain-text representation.
    pub plain_text: String,
    /// Serialized rich-text markup (the document's `Html` payload).
    pub html: String,
}
