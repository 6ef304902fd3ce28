use std::path::PathBuf;

use clap::Parser;
use mmap_tools::container;
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `mmt find`.
#[derive(Debug, Parser)]
pub struct Find {
    /// Path to the .mmap file
    pub(super) file: PathBuf,

    /// Text to search for
    pub(super) query: String,
}

impl Find {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let map = container::read(&self.file)?;
        let query = self.query.to_lowercase();

        for id in map.walk(map.root()) {
            let topic = map.topic(id);
            if !topic.text.to_lowercase().contains(&query) {
                continue;
            }
            let path = map.path(id).join(" → ");
            match &topic.task {
                Some(task) => {
                    let info = format!(" [{}%]", task.percentage());
                    println!("{path}{}", info.dim());
                }
                None => println!("{path}"),
            }
        }
        Ok(())
    }
}
