use std::{fs, path::PathBuf};

use clap::Parser;
use mmap_tools::{container, outline};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `mmt export`.
#[derive(Debug, Parser)]
pub struct Export {
    /// Path to the .mmap file
    pub(super) file: PathBuf,

    /// Output markdown file (default: stdout)
    #[arg(long, short)]
    pub(super) output: Option<PathBuf>,
}

impl Export {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let map = container::read(&self.file)?;
        let markdown = outline::to_outline(&map, true);

        if let Some(output) = self.output {
            fs::write(&output, &markdown)?;
            println!(
                "{}",
                format!("Exported to {}", output.display()).success()
            );
        } else {
            print!("{markdown}");
        }
        Ok(())
    }
}
