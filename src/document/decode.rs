//! Document bytes → [`MindMap`].
//!
//! Structural problems (missing `OneTopic` / root `Topic`) abort the decode;
//! malformed field values degrade to defaults silently, so one bad attribute
//! never costs the rest of the map.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::element::Element;
use super::{name, DocumentError};
use crate::model::{Hyperlink, IconMarker, MindMap, Note, Task, TaskPriority, TopicId};

/// Decodes document bytes into a mind map.
///
/// # Errors
///
/// Returns [`DocumentError::Xml`] when the bytes are not well-formed markup,
/// or [`DocumentError::Malformed`] when the topic container structure is
/// missing.
pub fn decode(bytes: &[u8]) -> Result<MindMap, DocumentError> {
    let document = Element::parse(bytes)?;
    from_element(&document)
}

/// Decodes an already-parsed document element tree.
pub(crate) fn from_element(document: &Element) -> Result<MindMap, DocumentError> {
    let one_topic = document
        .find_descendant(name::ONE_TOPIC)
        .ok_or(DocumentError::Malformed("no OneTopic element"))?;
    let root_element = one_topic
        .find(name::TOPIC)
        .ok_or(DocumentError::Malformed("no root Topic under OneTopic"))?;

    let mut map = MindMap::new("");
    if let Some(namespace) = document.attr("xmlns") {
        map.set_namespace(namespace);
    }
    let root = map.root();
    decode_topic(&mut map, root, root_element);
    Ok(map)
}

fn decode_topic(map: &mut MindMap, id: TopicId, element: &Element) {
    let topic = map.topic_mut(id);

    topic.oid = element.attr(name::OID).unwrap_or_default().to_string();
    // Everything except the identifier is retained verbatim for fidelity.
    topic.attributes = element
        .attributes()
        .iter()
        .filter(|(key, _)| key != name::OID)
        .cloned()
        .collect();

    topic.text = element
        .find(name::TEXT)
        .and_then(|text| text.attr(name::PLAIN_TEXT))
        .unwrap_or_default()
        .to_string();

    topic.task = element.find(name::TASK).map(decode_task);

    if let Some(group) = element.find(name::ICON_MARKERS) {
        topic.icons = group
            .find_all(name::ICON_MARKER)
            .map(|icon| IconMarker {
                icon_type: icon.attr(name::ICON_TYPE).unwrap_or_default().to_string(),
                signature: icon
                    .attr(name::ICON_SIGNATURE)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
    }

    // The single-link and grouped forms are mutually exclusive in
    // well-formed input, but accumulate from both rather than assuming.
    if let Some(link) = element.find(name::HYPERLINK) {
        topic.hyperlinks.push(decode_hyperlink(link));
    }
    if let Some(group) = element.find(name::HYPERLINK_GROUP) {
        topic
            .hyperlinks
            .extend(group.find_all(name::HYPERLINK).map(decode_hyperlink));
    }

    if let Some(notes) = element
        .find(name::NOTES_GROUP)
        .and_then(|group| group.find(name::NOTES))
    {
        topic.note = Some(Note {
            plain_text: notes.attr(name::PLAIN_TEXT).unwrap_or_default().to_string(),
            html: notes.find(name::HTML).map(Element::text).unwrap_or_default(),
        });
    }

    topic.style = element
        .find(name::SUB_TOPIC_SHAPE)
        .map(Element::to_fragment_string);

    if let Some(subtopics) = element.find(name::SUB_TOPICS) {
        // Collect first: decoding children mutates the map.
        let children: Vec<&Element> = subtopics.find_all(name::TOPIC).collect();
        for child_element in children {
            let child = map.add_child(id, "");
            decode_topic(map, child, child_element);
        }
    }
}

// The clamp bounds the float before the narrowing cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn decode_task(element: &Element) -> Task {
    let mut task = Task::new();

    if let Some(raw) = element.attr(name::TASK_PERCENTAGE) {
        // The format writes integers but some producers emit floats;
        // truncate rather than round, as MindManager does.
        if let Ok(value) = raw.parse::<f64>() {
            task.set_percentage(value.clamp(0.0, 100.0).trunc() as u8);
        } else if !raw.is_empty() {
            debug!(value = raw, "ignoring unparseable task percentage");
        }
    }

    if let Some(code) = element.attr(name::TASK_PRIORITY) {
        task.priority = TaskPriority::from_code(code);
        if task.priority == TaskPriority::None && !code.is_empty() {
            debug!(code, "unrecognized task priority code");
        }
    }

    task.due_date = element.attr(name::TASK_DUE_DATE).and_then(parse_date);
    task.start_date = element.attr(name::TASK_START_DATE).and_then(parse_date);

    task
}

fn decode_hyperlink(element: &Element) -> Hyperlink {
    Hyperlink {
        url: element.attr(name::URL).unwrap_or_default().to_string(),
        text: element.attr(name::LINK_TEXT).unwrap_or_default().to_string(),
    }
}

/// Parses the date formats the document format uses, most specific first.
///
/// Returns `None` when no format matches; a malformed date leaves the field
/// absent rather than failing the decode.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, super::DATE_FORMAT) {
        return Some(datetime);
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    debug!(value, "ignoring unparseable date");
    None
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;
    use crate::model::TaskStatus;

    const DOC: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Map xmlns="http://schemas.mindjet.com/MindManager/Application/2003">
  <OneTopic>
    <Topic OId="ROOT-1" Custom="kept">
      <Text PlainText="Project"/>
      <SubTopics>
        <Topic OId="A-1">
          <Text PlainText="Alpha"/>
          <Task TaskPercentage="50" TaskPriority="1" TaskDueDate="2025-03-01T00:00:00"/>
          <IconMarkers>
            <IconMarker IconType="urn:mindjet:Flag" IconSignature="sig"/>
          </IconMarkers>
          <Hyperlink Url="https://example.com" Text="Example"/>
          <NotesGroup>
            <Notes PlainText="a note"><Html>&lt;p&gt;a note&lt;/p&gt;</Html></Notes>
          </NotesGroup>
          <SubTopicShape Shape="Rounded"/>
        </Topic>
        <Topic OId="B-1">
          <Text PlainText="Beta"/>
          <HyperlinkGroup>
            <Hyperlink Url="https://one.example"/>
            <Hyperlink Url="https://two.example"/>
          </HyperlinkGroup>
        </Topic>
      </SubTopics>
    </Topic>
  </OneTopic>
</Map>"#;

    #[test]
    fn decodes_full_tree() {
        let map = decode(DOC).unwrap();

        assert_eq!(map.title(), "Project");
        assert_eq!(map.topic_count(), 3);
        assert_eq!(
            map.namespace(),
            "http://schemas.mindjet.com/MindManager/Application/2003"
        );

        let root = map.topic(map.root());
        assert_eq!(root.oid, "ROOT-1");
        // Unknown attributes land in the bag; the identifier does not.
        assert_eq!(
            root.attributes,
            vec![("Custom".to_string(), "kept".to_string())]
        );
    }

    #[test]
    fn decodes_task_fields() {
        let map = decode(DOC).unwrap();
        let alpha = map.find(map.root(), "alpha").unwrap();
        let task = map.topic(alpha).task.as_ref().unwrap();

        assert_eq!(task.percentage(), 50);
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        let due = task.due_date.unwrap();
        assert_eq!((due.year(), due.month(), due.day()), (2025, 3, 1));
        assert!(task.start_date.is_none());
    }

    #[test]
    fn decodes_icons_links_note_and_style() {
        let map = decode(DOC).unwrap();
        let alpha = map.topic(map.find(map.root(), "Alpha").unwrap());

        assert_eq!(alpha.icons.len(), 1);
        assert_eq!(alpha.icons[0].icon_type, IconMarker::FLAG);
        assert_eq!(alpha.icons[0].signature, "sig");

        assert_eq!(alpha.hyperlinks.len(), 1);
        assert_eq!(alpha.hyperlinks[0].url, "https://example.com");
        assert_eq!(alpha.hyperlinks[0].text, "Example");

        let note = alpha.note.as_ref().unwrap();
        assert_eq!(note.plain_text, "a note");
        assert_eq!(note.html, "<p>a note</p>");

        assert!(alpha.style.as_deref().unwrap().contains("SubTopicShape"));
    }

    #[test]
    fn grouped_hyperlinks_all_decode() {
        let map = decode(DOC).unwrap();
        let beta = map.topic(map.find(map.root(), "Beta").unwrap());
        let urls: Vec<_> = beta.hyperlinks.iter().map(|link| link.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.example", "https://two.example"]);
    }

    #[test]
    fn missing_one_topic_is_malformed() {
        let err = decode(b"<Map><SomethingElse/></Map>").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }

    #[test]
    fn missing_root_topic_is_malformed() {
        let err = decode(b"<Map><OneTopic/></Map>").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let doc = br#"<Map><OneTopic><Topic>
            <Task TaskPercentage="lots" TaskPriority="9" TaskDueDate="someday"/>
        </Topic></OneTopic></Map>"#;
        let map = decode(doc).unwrap();

        let topic = map.topic(map.root());
        assert_eq!(topic.text, "");
        assert_eq!(topic.oid, "");

        let task = topic.task.as_ref().unwrap();
        assert_eq!(task.percentage(), 0);
        assert_eq!(task.priority, TaskPriority::None);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn float_percentages_truncate() {
        let doc = br#"<Map><OneTopic><Topic>
            <Task TaskPercentage="66.9"/>
        </Topic></OneTopic></Map>"#;
        let map = decode(doc).unwrap();
        let task = map.topic(map.root()).task.as_ref().unwrap();
        assert_eq!(task.percentage(), 66);
    }

    #[test]
    fn date_fallback_formats() {
        let datetime = parse_date("2025-03-01T12:30:00").unwrap();
        assert_eq!(datetime.hour(), 12);

        let date_only = parse_date("2025-03-01").unwrap();
        assert_eq!(date_only.hour(), 0);

        let us_form = parse_date("03/01/2025").unwrap();
        assert_eq!((us_form.month(), us_form.day()), (3, 1));

        assert!(parse_date("yesterday").is_none());
    }
}
