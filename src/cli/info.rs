use std::path::PathBuf;

use clap::Parser;
use mmap_tools::{container, MindMap, TopicId};
use tracing::instrument;

/// Command arguments for `mmt info`.
#[derive(Debug, Parser)]
pub struct Info {
    /// Path to the .mmap file
    pub(super) file: PathBuf,

    /// Tree depth to show
    #[arg(long, default_value_t = 2)]
    pub(super) depth: usize,
}

impl Info {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let map = container::read(&self.file)?;

        println!("File: {}", self.file.display());
        println!("Title: {}", map.title());
        println!("Topics: {}", map.topic_count());
        println!("Tasks: {}", map.tasks(None).count());
        println!();

        for &branch in map.topic(map.root()).children() {
            show(&map, branch, 0, self.depth);
        }
        Ok(())
    }
}

fn show(map: &MindMap, id: TopicId, depth: usize, max_depth: usize) {
    if depth > max_depth {
        return;
    }
    let topic = map.topic(id);

    let descendants = map.count(id) - 1;
    let suffix = if descendants > 0 {
        format!(" ({descendants} items)")
    } else {
        String::new()
    };
    let mark = topic.task.as_ref().map_or("", |task| match task.percentage() {
        100.. => " ✓",
        1..=99 => " ◔",
        0 => "",
    });

    println!("{}• {}{suffix}{mark}", "  ".repeat(depth), topic.text);
    for &child in topic.children() {
        show(map, child, depth + 1, max_depth);
    }
}
