use std::env;
use std::io::Stdout;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};

use ragchat_client::{native_client, ClientConfig, RagClient, ReqwestTransport};
use ragchat_types::QueryOptions;
use ragchat_ui::Controller;

use crate::cli::Cli;
use crate::terminal::{ConfirmMode, TerminalSurface};

pub type TerminalController = Controller<RagClient<ReqwestTransport>, TerminalSurface<Stdout>>;

/// Application configuration derived from CLI arguments and environment
pub struct AppConfig {
    pub client_config: ClientConfig,
    pub options: QueryOptions,
    pub confirm_mode: ConfirmMode,
    /// Where `!export` writes its files.
    pub work_dir: PathBuf,
}

pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let client_config = cli.client_config();
    if client_config.base_url.trim().is_empty() {
        anyhow::bail!("A server URL is required (--url or RAGCHAT_URL)");
    }
    log::debug!("Using API at {}{}", client_config.base_url, client_config.api_base);

    Ok(AppConfig {
        client_config,
        options: cli.query_options(),
        confirm_mode: if cli.yes {
            ConfirmMode::AutoYes
        } else {
            ConfirmMode::Prompt
        },
        work_dir: env::current_dir().context("Failed to get current working directory")?,
    })
}

pub fn build_controller(app_config: &AppConfig) -> Result<Rc<TerminalController>> {
    let api = native_client(app_config.client_config.clone())
        .context("Failed to create the HTTP client")?;
    Ok(Rc::new(Controller::new(
        api,
        TerminalSurface::stdout(app_config.confirm_mode),
        app_config.client_config.clone(),
        app_config.options,
    )))
}
