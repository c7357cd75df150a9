//! ragchat terminal client
//!
//! Interactive REPL and one-shot commands for the RAG documentation
//! assistant, built on the shared `ragchat-ui` controller.

pub mod app;
pub mod cli;
pub mod export;
pub mod markdown;
pub mod refresh;
pub mod terminal;

pub use app::{run, run_command, run_repl, AppConfig};
pub use cli::{Cli, Commands};
pub use export::{export_conversation, ExportFormat};
pub use markdown::render_terminal;
pub use refresh::{schedule_resync, AutoRefresh};
pub use terminal::{ConfirmMode, TerminalSurface};
