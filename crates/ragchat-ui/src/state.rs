use ragchat_types::{ConversationTurn, ExampleCategory, ModuleInfo, QueryOptions, SessionSummary};

use crate::transcript::Transcript;

/// The single in-flight flag guarding sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Pending,
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}

/// One header status light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub label: String,
    pub online: bool,
}

impl Indicator {
    pub fn new(label: &str, online: bool) -> Self {
        Self {
            label: label.to_string(),
            online,
        }
    }

    pub fn css_class(&self) -> &'static str {
        if self.online {
            "status-value status-online"
        } else {
            "status-value status-offline"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub assistant: Indicator,
    pub store: Indicator,
}

impl ConnectionStatus {
    pub fn unknown() -> Self {
        Self {
            assistant: Indicator::new("Checking...", false),
            store: Indicator::new("Checking...", false),
        }
    }

    pub fn healthy() -> Self {
        Self {
            assistant: Indicator::new("Online", true),
            store: Indicator::new("Connected", true),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            assistant: Indicator::new("Offline", false),
            store: Indicator::new("Error", false),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            assistant: Indicator::new("Error", false),
            store: Indicator::new("Error", false),
        }
    }
}

/// Everything the controller knows about the page.
#[derive(Debug, Clone)]
pub struct AppState {
    pub loading: LoadState,
    /// Bumped whenever the conversation is replaced; older responses are
    /// dropped.
    pub generation: u64,
    pub options: QueryOptions,
    pub turns: Vec<ConversationTurn>,
    pub transcript: Transcript,
    pub examples: Vec<ExampleCategory>,
    pub modules: Vec<ModuleInfo>,
    pub sessions: Vec<SessionSummary>,
    /// Server session the conversation belongs to, once known.
    pub session_id: Option<String>,
    pub status: ConnectionStatus,
    next_toast_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            loading: LoadState::Idle,
            generation: 0,
            options: QueryOptions::default(),
            turns: Vec::new(),
            transcript: Transcript::default(),
            examples: Vec::new(),
            modules: Vec::new(),
            sessions: Vec::new(),
            session_id: None,
            status: ConnectionStatus::unknown(),
            next_toast_id: 0,
        }
    }
}

impl AppState {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Forget the conversation and invalidate requests still in flight.
    pub fn reset_conversation(&mut self) -> u64 {
        self.transcript.clear();
        self.turns.clear();
        self.bump_generation()
    }

    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn next_toast_id(&mut self) -> u64 {
        self.next_toast_id += 1;
        self.next_toast_id
    }

    /// Example questions flattened in display order.
    pub fn example_questions(&self) -> Vec<&str> {
        self.examples
            .iter()
            .flat_map(|category| category.questions.iter().map(String::as_str))
            .collect()
    }
}
