use std::io::Write;

use anyhow::{bail, Result};

use ragchat_client::RagApi;
use ragchat_ui::{Controller, SendOutcome};

use crate::cli::Commands;
use crate::terminal::TerminalSurface;

/// Execute a one-shot subcommand. Failures have already been printed by the
/// surface; the returned error only sets the exit status.
pub async fn run_command<A, W>(
    controller: &Controller<A, TerminalSurface<W>>,
    command: Commands,
) -> Result<()>
where
    A: RagApi,
    W: Write,
{
    match command {
        Commands::Health => {
            let status = controller.check_health().await;
            if !status.assistant.online {
                bail!("The assistant is not available");
            }
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            match controller.send_message(&question).await {
                SendOutcome::Answered => {}
                SendOutcome::Ignored => bail!("The question is empty"),
                SendOutcome::Failed | SendOutcome::Stale => {
                    bail!("The question could not be answered")
                }
            }
        }
        Commands::Sessions => {
            if !controller.show_history().await {
                bail!("Could not list the sessions");
            }
        }
        Commands::Stats => {
            if !controller.show_statistics().await {
                bail!("Could not load the statistics");
            }
        }
        Commands::Search { query, limit } => {
            let query = query.join(" ");
            if !controller.search(&query, limit).await {
                bail!("Search failed");
            }
        }
    }
    Ok(())
}
