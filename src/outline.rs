//! Convert between mind maps and Obsidian-style plain-text outlines.
//!
//! The outline is headings plus nested task lists: the root becomes the
//! top-level heading, each of its children a second-level heading, and
//! everything below that a list item with task glyphs (priority, due date,
//! completion percentage) and `[🔗](url)` links.
//!
//! The conversion is lossy by contract. Encoding drops hyperlink display
//! text and renders notes as blockquotes that decoding does not
//! reconstruct; decoding is best-effort and never fails, skipping lines it
//! does not recognize.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate, NaiveTime};
use regex::Regex;

use crate::model::{Hyperlink, MindMap, Task, TaskPriority, TaskStatus, TopicId};

static DUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"📅\s*(\d{4}-\d{2}-\d{2})").expect("valid regex"));
static PERCENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)%\)").expect("valid regex"));
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[🔗\]\(([^)]+)\)").expect("valid regex"));

/// Renders a map as an outline.
///
/// When `include_frontmatter` is set, the output starts with a frontmatter
/// block carrying the title, the source path (when known), a generation
/// timestamp, and the topic count.
#[must_use]
pub fn to_outline(map: &MindMap, include_frontmatter: bool) -> String {
    let mut lines = Vec::new();

    if include_frontmatter {
        lines.push("---".to_string());
        lines.push(format!("title: \"{}\"", map.title()));
        if !map.source_path().as_os_str().is_empty() {
            lines.push(format!("source: \"{}\"", map.source_path().display()));
        }
        lines.push(format!(
            "exported: \"{}\"",
            Local::now().format("%Y-%m-%d %H:%M")
        ));
        lines.push(format!("topics: {}", map.topic_count()));
        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.push(format!("# {}", map.title()));
    lines.push(String::new());

    // Direct children of the root become headings; the list nesting starts
    // one level below them.
    for &branch in map.topic(map.root()).children() {
        lines.push(format!("## {}", map.topic(branch).text));
        lines.push(String::new());
        for &child in map.topic(branch).children() {
            push_topic(map, child, 0, &mut lines);
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn push_topic(map: &MindMap, id: TopicId, depth: usize, lines: &mut Vec<String>) {
    let topic = map.topic(id);
    let indent = "  ".repeat(depth);

    let mut line = format!("{indent}- ");
    if let Some(task) = &topic.task {
        line.push_str(if task.status() == TaskStatus::Complete {
            "[x] "
        } else {
            "[ ] "
        });
    }
    line.push_str(&topic.text);

    if let Some(task) = &topic.task {
        match task.priority {
            TaskPriority::High => line.push_str(" ⏫"),
            TaskPriority::Medium => line.push_str(" 🔼"),
            TaskPriority::Low => line.push_str(" 🔽"),
            TaskPriority::None => {}
        }
        if let Some(due) = task.due_date {
            line.push_str(&format!(" 📅 {}", due.format("%Y-%m-%d")));
        }
        let percentage = task.percentage();
        if percentage > 0 && percentage < 100 {
            line.push_str(&format!(" ({percentage}%)"));
        }
    }

    for link in &topic.hyperlinks {
        line.push_str(&format!(" [🔗]({})", link.url));
    }
    lines.push(line);

    if let Some(note) = &topic.note {
        if !note.plain_text.is_empty() {
            for note_line in note.plain_text.lines() {
                lines.push(format!("{indent}  > {note_line}"));
            }
        }
    }

    for &child in topic.children() {
        push_topic(map, child, depth + 1, lines);
    }
}

/// Parses an outline back into a map, best-effort.
///
/// Unrecognized lines are skipped; malformed input never fails. Hyperlink
/// display text and blockquoted notes are not reconstructed.
#[must_use]
pub fn from_outline(text: &str) -> MindMap {
    let lines: Vec<&str> = text.lines().collect();
    let mut map = MindMap::new("");
    let mut index = 0;

    // Skip a leading frontmatter block.
    if lines.first().map(|line| line.trim()) == Some("---") {
        index = 1;
        while index < lines.len() && lines[index].trim() != "---" {
            index += 1;
        }
        index += 1;
    }

    // The first top-level heading names the root.
    while index < lines.len() {
        let line = lines[index].trim();
        if let Some(title) = line.strip_prefix("# ") {
            let root = map.root();
            map.topic_mut(root).text = title.trim().to_string();
            break;
        }
        index += 1;
    }
    index += 1;

    let mut current_branch: Option<TopicId> = None;
    // (indent level, topic) pairs tracking the open list nesting.
    let mut stack: Vec<(usize, TopicId)> = Vec::new();

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();

        if let Some(heading) = trimmed.strip_prefix("## ") {
            let root = map.root();
            current_branch = Some(map.add_child(root, heading.trim()));
            stack.clear();
        } else if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some(branch) = current_branch {
                let spaces = line.len() - line.trim_start_matches(' ').len();
                let indent = spaces / 2;

                while stack.last().is_some_and(|&(level, _)| level >= indent) {
                    stack.pop();
                }
                let parent = stack.last().map_or(branch, |&(_, id)| id);

                let topic = map.add_child(parent, "");
                parse_item(&mut map, topic, item);
                stack.push((indent, topic));
            }
        }

        index += 1;
    }

    map
}

/// Parses one list item: checkbox, task glyphs, links, remaining text.
fn parse_item(map: &mut MindMap, id: TopicId, item: &str) {
    let mut text = item.to_string();

    let mut task = if let Some(rest) = text.strip_prefix("[x] ") {
        text = rest.to_string();
        let mut task = Task::new();
        task.set_percentage(100);
        Some(task)
    } else if let Some(rest) = text.strip_prefix("[ ] ") {
        text = rest.to_string();
        Some(Task::new())
    } else {
        None
    };

    if let Some(task) = &mut task {
        // Glyph extraction order: priority, due date, percentage; each
        // removes its first match only.
        for (glyph, priority) in [
            ("⏫", TaskPriority::High),
            ("🔼", TaskPriority::Medium),
            ("🔽", TaskPriority::Low),
        ] {
            if text.contains(glyph) {
                task.priority = priority;
                text = text.replacen(glyph, "", 1).trim().to_string();
                break;
            }
        }

        if let Some(capture) = DUE_PATTERN.captures(&text) {
            if let Ok(date) = NaiveDate::parse_from_str(&capture[1], "%Y-%m-%d") {
                task.due_date = Some(date.and_time(NaiveTime::MIN));
            }
            let matched = capture.get(0).expect("capture 0 always exists").range();
            text.replace_range(matched, "");
            text = text.trim().to_string();
        }

        // A checked box already means 100%; an explicit percentage only
        // applies below that.
        if task.percentage() < 100 {
            if let Some(capture) = PERCENT_PATTERN.captures(&text) {
                if let Ok(percentage) = capture[1].parse::<u8>() {
                    task.set_percentage(percentage);
                }
                let matched = capture.get(0).expect("capture 0 always exists").range();
                text.replace_range(matched, "");
                text = text.trim().to_string();
            }
        }
    }

    let links: Vec<Hyperlink> = LINK_PATTERN
        .captures_iter(&text)
        .map(|capture| Hyperlink::new(&capture[1]))
        .collect();
    let text = LINK_PATTERN.replace_all(&text, "").trim().to_string();

    let topic = map.topic_mut(id);
    topic.text = text;
    topic.task = task;
    topic.hyperlinks = links;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;

    fn sample_map() -> MindMap {
        let mut map = MindMap::new("Plan");
        let work = map.add_child(map.root(), "Work");

        let report = map.add_child(work, "Write report");
        let mut task = Task::new();
        task.set_percentage(40);
        task.priority = TaskPriority::High;
        task.due_date = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        map.topic_mut(report).task = Some(task);

        let shipped = map.add_child(report, "Ship it");
        let mut done = Task::new();
        done.set_percentage(100);
        map.topic_mut(shipped).task = Some(done);

        map
    }

    #[test]
    fn encode_emits_headings_and_glyphs() {
        let outline = to_outline(&sample_map(), false);

        assert!(outline.starts_with("# Plan"));
        assert!(outline.contains("## Work"));
        assert!(outline.contains("- [ ] Write report ⏫ 📅 2025-06-01 (40%)"));
        assert!(outline.contains("  - [x] Ship it"));
    }

    #[test]
    fn frontmatter_contains_title_and_count() {
        let outline = to_outline(&sample_map(), true);
        assert!(outline.starts_with("---\n"));
        assert!(outline.contains("title: \"Plan\""));
        assert!(outline.contains("topics: 4"));
    }

    #[test]
    fn notes_render_as_blockquotes() {
        let mut map = sample_map();
        let report = map.find(map.root(), "Write report").unwrap();
        map.topic_mut(report).note = Some(Note {
            plain_text: "first line\nsecond line".to_string(),
            html: String::new(),
        });

        let outline = to_outline(&map, false);
        assert!(outline.contains("- [ ] Write report"));
        assert!(outline.contains("\n  > first line\n  > second line\n"));
    }

    #[test]
    fn round_trip_preserves_task_fields() {
        let original = sample_map();
        let decoded = from_outline(&to_outline(&original, true));

        assert_eq!(decoded.title(), "Plan");
        assert_eq!(decoded.topic_count(), 4);

        let report = decoded.topic(decoded.find(decoded.root(), "Write report").unwrap());
        let task = report.task.as_ref().unwrap();
        assert_eq!(task.percentage(), 40);
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(
            task.due_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0)
        );

        let shipped = decoded.topic(decoded.find(decoded.root(), "Ship it").unwrap());
        assert_eq!(shipped.task.as_ref().unwrap().status(), TaskStatus::Complete);
    }

    #[test]
    fn links_decode_with_empty_display_text() {
        let outline = "# Map\n\n## Branch\n\n- Reference [🔗](https://a.example) [🔗](https://b.example)\n";
        let map = from_outline(outline);

        let topic = map.topic(map.find(map.root(), "Reference").unwrap());
        assert_eq!(topic.hyperlinks.len(), 2);
        assert_eq!(topic.hyperlinks[0].url, "https://a.example");
        assert_eq!(topic.hyperlinks[0].text, "");
        assert_eq!(topic.hyperlinks[1].url, "https://b.example");
    }

    #[test]
    fn indentation_builds_nesting() {
        let outline = "# Map\n\n## Branch\n\n- top\n  - middle\n    - deep\n- second top\n";
        let map = from_outline(outline);

        let deep = map.find(map.root(), "deep").unwrap();
        assert_eq!(map.path(deep), vec!["Map", "Branch", "top", "middle", "deep"]);
        let second = map.find(map.root(), "second top").unwrap();
        assert_eq!(map.depth(second), 2);
    }

    #[test]
    fn new_heading_resets_the_stack() {
        let outline = "# Map\n\n## One\n\n- a\n  - b\n\n## Two\n\n- c\n";
        let map = from_outline(outline);

        let b = map.find(map.root(), "b").unwrap();
        assert_eq!(map.path(b), vec!["Map", "One", "a", "b"]);
        let c = map.find(map.root(), "c").unwrap();
        assert_eq!(map.path(c), vec!["Map", "Two", "c"]);
    }

    #[test]
    fn unchecked_item_with_percentage_is_in_progress() {
        let map = from_outline("# M\n\n## B\n\n- [ ] partial (30%)\n");
        let topic = map.topic(map.find(map.root(), "partial").unwrap());
        let task = topic.task.as_ref().unwrap();
        assert_eq!(task.percentage(), 30);
        assert_eq!(task.status(), TaskStatus::InProgress);
    }

    #[test]
    fn malformed_input_never_fails() {
        let map = from_outline("just some prose\nwithout structure\n");
        assert_eq!(map.title(), "");
        assert_eq!(map.topic_count(), 1);

        // Items before any heading are ignored.
        let map = from_outline("- [ ] stray item\n# Title\n\n## B\n\n- kept\n");
        assert_eq!(map.title(), "Title");
        assert!(map.find(map.root(), "stray item").is_none());
        assert!(map.find(map.root(), "kept").is_some());
    }

    #[test]
    fn blockquote_notes_are_not_reconstructed() {
        let mut map = sample_map();
        let report = map.find(map.root(), "Write report").unwrap();
        map.topic_mut(report).note = Some(Note {
            plain_text: "context".to_string(),
            html: String::new(),
        });

        let decoded = from_outline(&to_outline(&map, false));
        let report = decoded.topic(decoded.find(decoded.root(), "Write report").unwrap());
        assert!(report.note.is_none());
        assert_eq!(decoded.topic_count(), map.topic_count());
    }
}
