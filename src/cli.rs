mod export;
mod find;
mod info;
mod tasks;
mod terminal;
mod tree;

use clap::ArgAction;
use export::Export;
use find::Find;
use info::Info;
use tasks::Tasks;
use tree::Tree;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show a map summary
    Info(Info),

    /// Print the topic tree
    Tree(Tree),

    /// Export a map to a markdown outline
    Export(Export),

    /// Search for topics by text
    Find(Find),

    /// List tasks
    Tasks(Tasks),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Info(command) => command.run()?,
            Self::Tree(command) => command.run()?,
            Self::Export(command) => command.run()?,
            Self::Find(command) => command.run()?,
            Self::Tasks(command) => command.run()?,
        }
        Ok(())
    }
}
