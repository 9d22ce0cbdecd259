use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    Run {
        config: PathBuf,
        #[arg(long)]
        subtree: Option<String>,
        #[arg(long)]
        parallel: Option<usize>,
        #[arg(long, short)]
        yes: bool,
        #[arg(long)]
        no_serve: bool,
        #[arg(long)]
        fail_fast: bool,
        #[arg(long, default_value = "none")]
        events: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    Serve {
        config: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    Plan {
        config: PathBuf,
        #[arg(long)]
        subtree: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    Validate {
        config: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    Doctor {
        config: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}
