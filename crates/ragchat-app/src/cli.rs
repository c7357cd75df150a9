use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use ragchat_client::{ClientConfig, DEFAULT_API_BASE, DEFAULT_SERVER_URL};
use ragchat_types::QueryOptions;

/// CLI arguments for ragchat
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(about = "Terminal client for the RAG documentation assistant")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server URL (scheme, host and port)
    #[arg(long, env = "RAGCHAT_URL", default_value = DEFAULT_SERVER_URL)]
    pub url: String,

    /// Path the RAG API is mounted under
    #[arg(long, env = "RAGCHAT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Do not request source citations
    #[arg(long)]
    pub no_sources: bool,

    /// Do not send the conversation context with questions
    #[arg(long)]
    pub no_conversation: bool,

    /// Seconds between background history resyncs (0 disables)
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub refresh_secs: u64,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Auto-confirm load, delete, clear and new without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Check the server status
    Health,
    /// Ask a single question and print the answer
    Ask {
        /// The question (remaining words are joined)
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// List saved conversation sessions
    Sessions,
    /// Show usage and index statistics
    Stats,
    /// Search the indexed documents without generating an answer
    Search {
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of passages
        #[arg(short, long, default_value_t = 5)]
        limit: u32,
    },
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.url.clone(),
            api_base: self.api_base.clone(),
            refresh_interval: Duration::from_secs(self.refresh_secs),
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_sources: !self.no_sources,
            include_conversation: !self.no_conversation,
        }
    }
}
