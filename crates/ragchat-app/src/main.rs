use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio::task::LocalSet;

use ragchat::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Some(shell) = cli.generate {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "ragchat-cli", &mut std::io::stdout());
        return Ok(());
    }

    // The controller is not Send; everything runs on this thread.
    let local = LocalSet::new();
    local.run_until(ragchat::run(cli)).await
}
