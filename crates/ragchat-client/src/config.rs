use std::time::Duration;

use ragchat_types::{DEFAULT_MAX_SOURCES, DEFAULT_MODEL_LABEL};

/// Default mount point of the RAG blueprint on the server.
pub const DEFAULT_API_BASE: &str = "/api/rag";

/// Default server for the terminal client.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Every call the client makes, relative to the API base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Examples,
    Modules,
    Query,
    Stats,
    Sessions,
    LoadSession,
    DeleteSession,
    History,
    Clear,
    NewConversation,
    Search,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Health => "/health",
            Endpoint::Examples => "/questions/examples",
            Endpoint::Modules => "/modules",
            Endpoint::Query => "/query",
            Endpoint::Stats => "/stats",
            Endpoint::Sessions => "/conversation/sessions",
            Endpoint::LoadSession => "/conversation/load",
            Endpoint::DeleteSession => "/conversation/delete",
            Endpoint::History => "/conversation/history",
            Endpoint::Clear => "/conversation/clear",
            Endpoint::NewConversation => "/conversation/new",
            Endpoint::Search => "/search",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Health
            | Endpoint::Examples
            | Endpoint::Modules
            | Endpoint::Stats
            | Endpoint::Sessions
            | Endpoint::History => Method::Get,
            Endpoint::Query
            | Endpoint::LoadSession
            | Endpoint::DeleteSession
            | Endpoint::Clear
            | Endpoint::NewConversation
            | Endpoint::Search => Method::Post,
        }
    }
}

/// Client configuration shared by the browser and terminal front-ends.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host; empty means same origin.
    pub base_url: String,
    pub api_base: String,
    pub max_sources: u32,
    /// Period of the silent history resync.
    pub refresh_interval: Duration,
    /// Delay between a successful send and the follow-up resync.
    pub resync_delay: Duration,
    pub toast_duration: Duration,
    /// Only honoured by the native transport.
    pub request_timeout: Duration,
    pub default_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_sources: DEFAULT_MAX_SOURCES,
            refresh_interval: Duration::from_secs(30),
            resync_delay: Duration::from_secs(1),
            toast_duration: Duration::from_secs(3),
            request_timeout: Duration::from_secs(120),
            default_model: DEFAULT_MODEL_LABEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Absolute (or origin-relative) URL of an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            normalize_api_base(&self.api_base),
            endpoint.path()
        )
    }
}

/// Force a leading slash and drop trailing ones: `api/rag/` -> `/api/rag`.
pub fn normalize_api_base(api_base: &str) -> String {
    let trimmed = api_base.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
