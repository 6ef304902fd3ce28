use std::path::PathBuf;

use clap::Parser;
use mmap_tools::Topic;
use tracing::instrument;

/// Command arguments for `mmt tree`.
#[derive(Debug, Parser)]
pub struct Tree {
    /// Path to the .mmap file
    pub(super) file: PathBuf,

    /// Max depth
    #[arg(long, default_value_t = 99)]
    pub(super) depth: usize,

    /// Only show topics with tasks
    #[arg(long)]
    pub(super) tasks_only: bool,
}

impl Tree {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let map = mmap_tools::container::read(&self.file)?;

        for id in map.walk(map.root()) {
            let depth = map.depth(id);
            if depth > self.depth {
                continue;
            }
            let topic = map.topic(id);
            if self.tasks_only && topic.task.is_none() {
                continue;
            }
            println!("{}{}{}", "  ".repeat(depth), topic.text, task_info(topic));
        }
        Ok(())
    }
}

fn task_info(topic: &Topic) -> String {
    let Some(task) = &topic.task else {
        return String::new();
    };

    let mut parts = Vec::new();
    if task.percentage() >= 100 {
        parts.push("✅".to_string());
    } else if task.percentage() > 0 {
        parts.push(format!("{}%", task.percentage()));
    }
    if let Some(due) = task.due_date {
        parts.push(format!("📅 {}", due.format("%Y-%m-%d")));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mmap_tools::{MindMap, Task};

    use super::*;

    fn topic_with(task: Task) -> MindMap {
        let mut map = MindMap::new("root");
        let root = map.root();
        map.topic_mut(root).task = Some(task);
        map
    }

    #[test]
    fn task_info_formats() {
        let bare = MindMap::new("root");
        assert_eq!(task_info(bare.topic(bare.root())), "");

        let fresh = topic_with(Task::new());
        assert_eq!(task_info(fresh.topic(fresh.root())), "");

        let mut done = Task::new();
        done.set_percentage(100);
        let done = topic_with(done);
        assert_eq!(task_info(done.topic(done.root())), " [✅]");

        let mut partial = Task::new();
        partial.set_percentage(30);
        partial.due_date = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        let partial = topic_with(partial);
        assert_eq!(
            task_info(partial.topic(partial.root())),
            " [30% 📅 2025-06-01]"
        );
    }
}
