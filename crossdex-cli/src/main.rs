use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "crossdex", version, about = "Cross-reference index builder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            config,
            subtree,
            parallel,
            yes,
            no_serve,
            fail_fast,
            events,
            output,
        } => {
            cmd::run::run_cmd(
                &config,
                subtree.as_deref(),
                parallel,
                yes,
                no_serve,
                fail_fast,
                &events,
                output,
            )
            .await
        }
        Command::Serve { config, output } => cmd::serve::serve_cmd(&config, output).await,
        Command::Plan {
            config,
            subtree,
            output,
        } => cmd::plan::plan_cmd(&config, subtree.as_deref(), output).await,
        Command::Validate { config, output } => cmd::validate::validate_cmd(&config, output).await,
        Command::Doctor { config, output } => cmd::doctor::doctor_cmd(&config, output).await,
    }
}
