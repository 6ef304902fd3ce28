//! `mmt`: read, convert, and query MindManager `.mmap` files.

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
