pub mod commands;
pub mod repl;
pub mod setup;

pub use commands::run_command;
pub use repl::{parse_command, run_repl, ReplCommand};
pub use setup::{build_controller, setup_from_cli, AppConfig, TerminalController};

use anyhow::Result;

use crate::cli::Cli;

/// Run a one-shot subcommand, or the interactive REPL when none is given.
pub async fn run(cli: Cli) -> Result<()> {
    let app_config = setup_from_cli(&cli)?;
    let controller = build_controller(&app_config)?;

    match cli.command {
        Some(command) => run_command(&controller, command).await,
        None => run_repl(controller, app_config.work_dir).await,
    }
}
