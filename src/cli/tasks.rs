use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mmap_tools::{container, TaskStatus};
use tracing::instrument;

/// Command arguments for `mmt tasks`.
#[derive(Debug, Parser)]
pub struct Tasks {
    /// Path to the .mmap file
    pub(super) file: PathBuf,

    /// Filter by status
    #[arg(long, value_enum)]
    pub(super) status: Option<StatusFilter>,
}

/// Task status filter, in CLI vocabulary.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusFilter {
    Open,
    Done,
    InProgress,
}

impl From<StatusFilter> for TaskStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Open => Self::NotStarted,
            StatusFilter::Done => Self::Complete,
            StatusFilter::InProgress => Self::InProgress,
        }
    }
}

impl Tasks {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let map = container::read(&self.file)?;
        let filter = self.status.map(TaskStatus::from);

        for id in map.tasks(filter) {
            let topic = map.topic(id);
            let task = topic.task.as_ref().expect("tasks() only yields topics with a task");

            let status = if task.percentage() >= 100 {
                "✅".to_string()
            } else {
                format!("{}%", task.percentage())
            };
            let due = task
                .due_date
                .map(|date| format!(" 📅 {}", date.format("%Y-%m-%d")))
                .unwrap_or_default();

            // Last three levels keep deep maps readable.
            let path = map.path(id);
            let tail = &path[path.len().saturating_sub(3)..];
            println!("[{status}] {}{due}", tail.join(" → "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_maps_to_derived_status() {
        assert_eq!(TaskStatus::from(StatusFilter::Open), TaskStatus::NotStarted);
        assert_eq!(TaskStatus::from(StatusFilter::Done), TaskStatus::Complete);
        assert_eq!(
            TaskStatus::from(StatusFilter::InProgress),
            TaskStatus::InProgress
        );
    }
}
