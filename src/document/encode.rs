//! [`MindMap`] → document bytes.
//!
//! Two paths: [`encode`] builds a minimal fresh document, while
//! [`encode_into`] grafts the rebuilt topic tree into an existing document
//! so that unmodeled document-level structure survives a read-modify-write
//! cycle.

use tracing::warn;
use uuid::Uuid;

use super::element::Element;
use super::{name, DocumentError, DATE_FORMAT, NAMESPACE};
use crate::model::{MindMap, Task, TaskPriority, TopicId};

/// Encodes a map as a minimal, freshly-built document.
#[must_use]
pub fn encode(map: &MindMap) -> Vec<u8> {
    let mut document = Element::new(name::MAP);
    let mut one_topic = Element::new(name::ONE_TOPIC);
    one_topic.push_element(build_topic(map, map.root()));
    document.push_element(one_topic);
    document.to_document_bytes(namespace_of(map))
}

/// Encodes a map by replacing the topic tree inside an existing document.
///
/// Every element and attribute of the original document outside the root
/// topic subtree is carried over unchanged.
///
/// # Errors
///
/// Returns [`DocumentError::Xml`] when the original bytes are not
/// well-formed markup, or [`DocumentError::Malformed`] when they contain no
/// `OneTopic` container to graft into.
pub fn encode_into(map: &MindMap, original: &[u8]) -> Result<Vec<u8>, DocumentError> {
    let mut document = Element::parse(original)?;
    let one_topic = document
        .find_descendant_mut(name::ONE_TOPIC)
        .ok_or(DocumentError::Malformed("no OneTopic in source document"))?;

    one_topic.remove_child(name::TOPIC);
    one_topic.push_element(build_topic(map, map.root()));

    Ok(document.to_document_bytes(namespace_of(map)))
}

fn namespace_of(map: &MindMap) -> &str {
    if map.namespace().is_empty() {
        NAMESPACE
    } else {
        map.namespace()
    }
}

fn build_topic(map: &MindMap, id: TopicId) -> Element {
    let topic = map.topic(id);
    let mut element = Element::new(name::TOPIC);

    let oid = if topic.oid.is_empty() {
        mint_oid()
    } else {
        topic.oid.clone()
    };
    element.set_attr(name::OID, oid);

    for (key, value) in &topic.attributes {
        // The identifier never travels through the bag.
        if key != name::OID {
            element.set_attr(key.clone(), value.clone());
        }
    }

    if !topic.text.is_empty() {
        let mut text = Element::new(name::TEXT);
        text.set_attr(name::PLAIN_TEXT, topic.text.clone());
        element.push_element(text);
    }

    if let Some(task) = &topic.task {
        element.push_element(build_task(task));
    }

    if !topic.icons.is_empty() {
        let mut group = Element::new(name::ICON_MARKERS);
        for icon in &topic.icons {
            let mut marker = Element::new(name::ICON_MARKER);
            if !icon.icon_type.is_empty() {
                marker.set_attr(name::ICON_TYPE, icon.icon_type.clone());
            }
            if !icon.signature.is_empty() {
                marker.set_attr(name::ICON_SIGNATURE, icon.signature.clone());
            }
            group.push_element(marker);
        }
        element.push_element(group);
    }

    match topic.hyperlinks.as_slice() {
        [] => {}
        [link] => element.push_element(build_hyperlink(link)),
        links => {
            let mut group = Element::new(name::HYPERLINK_GROUP);
            for link in links {
                group.push_element(build_hyperlink(link));
            }
            element.push_element(group);
        }
    }

    // Presence of the note object gates emission, not its content.
    if let Some(note) = &topic.note {
        let mut notes = Element::new(name::NOTES);
        notes.set_attr(name::PLAIN_TEXT, note.plain_text.clone());
        if !note.html.is_empty() {
            let mut html = Element::new(name::HTML);
            html.push_text(note.html.clone());
            notes.push_element(html);
        }
        let mut group = Element::new(name::NOTES_GROUP);
        group.push_element(notes);
        element.push_element(group);
    }

    if let Some(style) = &topic.style {
        match Element::parse(style.as_bytes()) {
            Ok(shape) => element.push_element(shape),
            Err(error) => warn!(%error, "dropping unparseable style blob"),
        }
    }

    if !topic.children().is_empty() {
        let mut subtopics = Element::new(name::SUB_TOPICS);
        for &child in topic.children() {
            subtopics.push_element(build_topic(map, child));
        }
        element.push_element(subtopics);
    }

    element
}

fn build_task(task: &Task) -> Element {
    let mut element = Element::new(name::TASK);
    if task.percentage() > 0 {
        element.set_attr(name::TASK_PERCENTAGE, task.percentage().to_string());
    }
    if task.priority != TaskPriority::None {
        element.set_attr(name::TASK_PRIORITY, task.priority.code());
    }
    if let Some(due) = task.due_date {
        element.set_attr(name::TASK_DUE_DATE, due.format(DATE_FORMAT).to_string());
    }
    if let Some(start) = task.start_date {
        element.set_attr(name::TASK_START_DATE, start.format(DATE_FORMAT).to_string());
    }
    element
}

fn build_hyperlink(link: &crate::model::Hyperlink) -> Element {
    let mut element = Element::new(name::HYPERLINK);
    element.set_attr(name::URL, link.url.clone());
    if !link.text.is_empty() {
        element.set_attr(name::LINK_TEXT, link.text.clone());
    }
    element
}

/// Mints a fresh topic identifier in the uppercase-GUID shape MindManager
/// uses. Uniqueness within one document is all that matters.
fn mint_oid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::decode::decode;
    use super::*;
    use crate::model::{Hyperlink, IconMarker, Note, TaskStatus};

    fn sample_map() -> MindMap {
        let mut map = MindMap::new("Project");
        let alpha = map.add_child(map.root(), "Alpha");

        let mut task = Task::new();
        task.set_percentage(50);
        task.priority = TaskPriority::High;
        task.due_date = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        map.topic_mut(alpha).task = Some(task);
        map.topic_mut(alpha).icons.push(IconMarker::new(IconMarker::STAR));
        map.topic_mut(alpha)
            .hyperlinks
            .push(Hyperlink::new("https://example.com"));
        map.topic_mut(alpha).note = Some(Note {
            plain_text: "remember".to_string(),
            html: "<p>remember</p>".to_string(),
        });

        map.add_child(alpha, "Beta");
        map
    }

    #[test]
    fn round_trip_preserves_fields() {
        let original = sample_map();
        let decoded = decode(&encode(&original)).unwrap();

        assert_eq!(decoded.topic_count(), 3);
        assert_eq!(decoded.title(), "Project");

        let alpha = decoded.topic(decoded.find(decoded.root(), "Alpha").unwrap());
        let task = alpha.task.as_ref().unwrap();
        assert_eq!(task.percentage(), 50);
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(
            task.due_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(alpha.icons, vec![IconMarker::new(IconMarker::STAR)]);
        assert_eq!(alpha.hyperlinks[0].url, "https://example.com");
        assert_eq!(alpha.note.as_ref().unwrap().plain_text, "remember");

        let beta = decoded.find(decoded.root(), "Beta").unwrap();
        assert_eq!(decoded.path(beta), vec!["Project", "Alpha", "Beta"]);
    }

    #[test]
    fn minted_oids_are_unique_and_stable_oids_survive() {
        let mut map = sample_map();
        let root = map.root();
        map.topic_mut(root).oid = "KEEP-ME".to_string();

        let decoded = decode(&encode(&map)).unwrap();
        assert_eq!(decoded.topic(decoded.root()).oid, "KEEP-ME");

        let mut oids: Vec<String> = decoded
            .walk(decoded.root())
            .map(|id| decoded.topic(id).oid.clone())
            .collect();
        assert!(oids.iter().all(|oid| !oid.is_empty()));
        oids.sort();
        oids.dedup();
        assert_eq!(oids.len(), 3, "OIds must be distinct");
    }

    #[test]
    fn two_hyperlinks_use_the_grouped_form() {
        let mut map = MindMap::new("Root");
        let child = map.add_child(map.root(), "Linked");
        map.topic_mut(child)
            .hyperlinks
            .push(Hyperlink::new("https://one.example"));
        map.topic_mut(child)
            .hyperlinks
            .push(Hyperlink::new("https://two.example"));

        let bytes = encode(&map);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("HyperlinkGroup"));

        let decoded = decode(&bytes).unwrap();
        let linked = decoded.topic(decoded.find(decoded.root(), "Linked").unwrap());
        let urls: Vec<_> = linked.hyperlinks.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.example", "https://two.example"]);
    }

    #[test]
    fn emission_gating() {
        let mut map = MindMap::new("Root");
        let bare = map.add_child(map.root(), "Bare");
        map.topic_mut(bare).task = Some(Task::new());
        map.topic_mut(bare).note = Some(Note::default());

        let bytes = encode(&map);
        let text = String::from_utf8_lossy(&bytes);

        // A fresh task emits no percentage or priority attributes, but the
        // empty note still emits its group.
        assert!(text.contains("<Task/>"));
        assert!(text.contains("NotesGroup"));
        assert!(!text.contains("TaskPercentage"));
        assert!(!text.contains("Hyperlink"));
        assert!(!text.contains("IconMarkers"));
    }

    #[test]
    fn unrecognized_attributes_and_style_survive() {
        let mut map = sample_map();
        let root = map.root();
        map.topic_mut(root)
            .attributes
            .push(("TextAlignment".to_string(), "Center".to_string()));
        map.topic_mut(root).style =
            Some(r#"<SubTopicShape Shape="Rounded"/>"#.to_string());

        let decoded = decode(&encode(&map)).unwrap();
        let root = decoded.topic(decoded.root());
        assert_eq!(
            root.attributes,
            vec![("TextAlignment".to_string(), "Center".to_string())]
        );
        assert_eq!(root.style.as_deref(), Some(r#"<SubTopicShape Shape="Rounded"/>"#));
    }

    #[test]
    fn encode_into_preserves_sibling_structure() {
        let original = br#"<Map xmlns="urn:test">
            <Styles Kind="global"/>
            <OneTopic><Topic OId="OLD"><Text PlainText="Old"/></Topic></OneTopic>
            <Trailer Keep="yes"/>
        </Map>"#;

        let mut map = MindMap::new("New");
        map.set_namespace("urn:test");
        let bytes = encode_into(&map, original).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains(r#"<Styles Kind="global"/>"#));
        assert!(text.contains(r#"<Trailer Keep="yes"/>"#));
        assert!(!text.contains("Old"));

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.title(), "New");
        assert_eq!(decoded.namespace(), "urn:test");
    }

    #[test]
    fn encode_into_requires_a_topic_container() {
        let map = MindMap::new("New");
        let err = encode_into(&map, b"<Map><NoContainer/></Map>").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }
}
