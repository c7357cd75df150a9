use std::cell::{Ref, RefCell};

use ragchat_client::{ApiError, ClientConfig, RagApi};
use ragchat_types::{ConversationTurn, QueryOptions, SearchRequest, SessionSummary};

use crate::format::now_iso;
use crate::state::{AppState, ConnectionStatus, LoadState};
use crate::surface::Surface;
use crate::toast::{Toast, ToastKind};
use crate::transcript::{replay_history, TranscriptEntry};

pub const MSG_CONNECTION_ERROR: &str = "Connection error";
pub const MSG_SERVER_CONNECTION_ERROR: &str = "Server connection error";
pub const MSG_QUERY_FAILED: &str = "Error while processing the question";
pub const MSG_SESSION_EMPTY: &str = "Session loaded (no conversation)";

/// What became of a send request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty question or a send already pending; no request issued.
    Ignored,
    /// The answer was appended. The shell schedules a history resync.
    Answered,
    /// An error entry was appended.
    Failed,
    /// The conversation was replaced while the request was in flight.
    Stale,
}

/// Application controller shared by the browser and terminal shells.
///
/// Holds the state, the API client and the surface. Every operation is one
/// round trip; no state borrow is held across an `.await`.
pub struct Controller<A, S> {
    api: A,
    surface: S,
    config: ClientConfig,
    state: RefCell<AppState>,
}

impl<A: RagApi, S: Surface> Controller<A, S> {
    pub fn new(api: A, surface: S, config: ClientConfig, options: QueryOptions) -> Self {
        Self {
            api,
            surface,
            config,
            state: RefCell::new(AppState::new(options)),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> Ref<'_, AppState> {
        self.state.borrow()
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.state.borrow().turns.clone()
    }

    pub fn options(&self) -> QueryOptions {
        self.state.borrow().options
    }

    pub fn set_include_sources(&self, on: bool) {
        self.state.borrow_mut().options.include_sources = on;
    }

    pub fn set_include_conversation(&self, on: bool) {
        self.state.borrow_mut().options.include_conversation = on;
    }

    /// Raise a toast with the next id.
    pub fn notify(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.state.borrow_mut().next_toast_id();
        self.surface.notify(&Toast {
            id,
            kind,
            message: message.into(),
        });
    }

    /// Connectivity failures get the generic toast, rejections `rejected`.
    fn report_failure(&self, context: &str, err: &ApiError, rejected: &str) {
        if err.is_connectivity() {
            log::error!("{}: {}", context, err);
            self.notify(ToastKind::Error, MSG_CONNECTION_ERROR);
        } else {
            log::warn!("{}: {}", context, err);
            self.notify(ToastKind::Error, rejected);
        }
    }

    fn reset_view(&self) {
        self.surface.clear_transcript();
        self.surface.set_welcome_visible(true);
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Health check, then the two sidebar lists.
    pub async fn init(&self) {
        log::info!("Loading initial data");
        self.check_health().await;
        self.load_examples().await;
        self.load_modules().await;
    }

    pub async fn check_health(&self) -> ConnectionStatus {
        let status = match self.api.health().await {
            Ok(health) if health.is_healthy() => ConnectionStatus::healthy(),
            Ok(health) => {
                log::warn!("Server reports status {:?}", health.status);
                ConnectionStatus::unhealthy()
            }
            Err(e) => {
                log::error!("Health check failed: {}", e);
                ConnectionStatus::unreachable()
            }
        };
        self.state.borrow_mut().status = status.clone();
        self.surface.set_status(&status);
        status
    }

    pub async fn load_examples(&self) {
        match self.api.example_questions().await {
            Ok(examples) => {
                self.surface.show_examples(&examples);
                self.state.borrow_mut().examples = examples;
            }
            Err(e) => log::error!("Failed to load example questions: {}", e),
        }
    }

    pub async fn load_modules(&self) {
        match self.api.modules().await {
            Ok(modules) => {
                self.surface.show_modules(&modules);
                self.state.borrow_mut().modules = modules;
            }
            Err(e) => log::error!("Failed to load modules: {}", e),
        }
    }

    /// Copy the `index`th example question (flattened) into the input.
    pub fn pick_example(&self, index: usize) -> bool {
        let question = self
            .state
            .borrow()
            .example_questions()
            .get(index)
            .map(|q| q.to_string());
        match question {
            Some(question) => {
                self.surface.set_input(&question);
                true
            }
            None => false,
        }
    }

    pub fn pick_module(&self, index: usize) -> bool {
        let name = self.state.borrow().modules.get(index).map(|m| m.name.clone());
        match name {
            Some(name) => {
                self.surface.set_input(&module_prompt(&name));
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Chat
    // ========================================================================

    pub async fn send_message(&self, question: &str) -> SendOutcome {
        let question = question.trim();
        let (request, generation, include_sources, entry) = {
            let mut state = self.state.borrow_mut();
            if question.is_empty() || state.loading.is_pending() {
                return SendOutcome::Ignored;
            }
            state.loading = LoadState::Pending;
            let entry = TranscriptEntry::user(question);
            state.transcript.push(entry.clone());
            (
                state.options.request(question, self.config.max_sources),
                state.generation,
                state.options.include_sources,
                entry,
            )
        };

        self.surface.set_welcome_visible(false);
        self.surface.append_entry(&entry);
        self.surface.clear_input();
        self.surface.set_loading(true);
        log::debug!("Sending question ({} chars)", question.len());

        let result = self.api.query(&request).await;

        let outcome = if self.state.borrow().generation != generation {
            log::warn!("Discarding answer for a conversation that was replaced");
            SendOutcome::Stale
        } else {
            match result {
                Ok(answer) => {
                    let entry = TranscriptEntry::Assistant {
                        markdown: answer.response.clone(),
                        metadata: answer.metadata.clone(),
                        sources: if include_sources {
                            answer.sources
                        } else {
                            Vec::new()
                        },
                    };
                    {
                        let mut state = self.state.borrow_mut();
                        state.transcript.push(entry.clone());
                        state.turns.push(ConversationTurn {
                            question: question.to_string(),
                            response: answer.response,
                            metadata: answer.metadata.unwrap_or_default(),
                            timestamp: now_iso(),
                        });
                    }
                    self.surface.append_entry(&entry);
                    SendOutcome::Answered
                }
                Err(e) => {
                    let entry = if e.is_connectivity() {
                        log::error!("Query failed: {}", e);
                        self.notify(ToastKind::Error, MSG_CONNECTION_ERROR);
                        TranscriptEntry::error(MSG_SERVER_CONNECTION_ERROR)
                    } else {
                        log::warn!("Query rejected: {}", e);
                        self.notify(ToastKind::Error, MSG_QUERY_FAILED);
                        TranscriptEntry::error(format!("Error: {}", e))
                    };
                    self.state.borrow_mut().transcript.push(entry.clone());
                    self.surface.append_entry(&entry);
                    SendOutcome::Failed
                }
            }
        };

        self.state.borrow_mut().loading = LoadState::Idle;
        self.surface.set_loading(false);
        outcome
    }

    /// Replace the turn cache with the server history, silently.
    pub async fn resync_history(&self) -> bool {
        let generation = self.state.borrow().generation;
        match self.api.history().await {
            Ok(history) => {
                let mut state = self.state.borrow_mut();
                if state.generation != generation {
                    log::warn!("Discarding history resync for a replaced conversation");
                    return false;
                }
                state.turns = history
                    .iter()
                    .map(|entry| ConversationTurn::from_history(entry, &self.config.default_model))
                    .collect();
                log::debug!("History resynced: {} turns", state.turns.len());
                true
            }
            Err(e) => {
                log::warn!("History resync failed: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Dialogs
    // ========================================================================

    pub async fn show_statistics(&self) -> bool {
        match self.api.statistics().await {
            Ok(stats) => {
                self.surface.show_stats(&stats);
                true
            }
            Err(e) => {
                self.report_failure("Statistics", &e, "Error while loading statistics");
                false
            }
        }
    }

    fn remember_sessions(&self, sessions: &[SessionSummary]) {
        let mut state = self.state.borrow_mut();
        if let Some(current) = sessions.iter().find(|s| s.is_current) {
            state.session_id = Some(current.session_id.clone());
        }
        state.sessions = sessions.to_vec();
    }

    pub async fn show_history(&self) -> bool {
        match self.api.sessions().await {
            Ok(sessions) => {
                self.surface.show_sessions(&sessions);
                self.remember_sessions(&sessions);
                true
            }
            Err(e) => {
                self.report_failure("Sessions", &e, "Error while loading sessions");
                false
            }
        }
    }

    /// The session the server marks as current.
    pub async fn current_session(&self) -> Option<SessionSummary> {
        match self.api.sessions().await {
            Ok(sessions) => {
                self.remember_sessions(&sessions);
                sessions.into_iter().find(|s| s.is_current)
            }
            Err(e) => {
                self.report_failure("Sessions", &e, "Error while loading sessions");
                None
            }
        }
    }

    pub async fn search(&self, query: &str, limit: u32) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        let request = SearchRequest {
            query: query.to_string(),
            limit,
        };
        match self.api.search(&request).await {
            Ok(hits) => {
                self.surface.show_search_results(query, &hits);
                true
            }
            Err(e) => {
                self.report_failure("Search", &e, "Error while searching the documents");
                false
            }
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    pub async fn load_session(&self, session_id: &str) -> bool {
        let prompt = format!(
            "Load session {}? The current session will be saved.",
            session_id
        );
        if !self.surface.confirm(&prompt) {
            return false;
        }

        if let Err(e) = self.api.load_session(session_id).await {
            self.report_failure("Load session", &e, "Error while loading the session");
            return false;
        }

        {
            let mut state = self.state.borrow_mut();
            state.bump_generation();
            state.session_id = Some(session_id.to_string());
        }
        self.surface.close_sessions();
        self.notify(ToastKind::Success, format!("Session {} loaded", session_id));
        log::info!("Session {} loaded", session_id);

        self.replay_session(session_id).await;
        true
    }

    async fn replay_session(&self, session_id: &str) {
        let generation = self.state.borrow().generation;
        let history = match self.api.history().await {
            Ok(history) => history,
            Err(e) => {
                self.report_failure("Session history", &e, "Error while loading the conversation");
                return;
            }
        };

        if self.state.borrow().generation != generation {
            log::warn!("Discarding replay of session {}", session_id);
            return;
        }

        if history.is_empty() {
            self.state.borrow_mut().reset_conversation();
            self.reset_view();
            self.notify(ToastKind::Info, MSG_SESSION_EMPTY);
            return;
        }

        let include_sources = self.state.borrow().options.include_sources;
        let replay = replay_history(
            session_id,
            &history,
            &self.config.default_model,
            include_sources,
        );
        {
            let mut state = self.state.borrow_mut();
            state.transcript.replace(replay.entries.clone());
            state.turns = replay.turns;
        }

        self.surface.clear_transcript();
        self.surface.set_welcome_visible(false);
        for entry in &replay.entries {
            self.surface.append_entry(entry);
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> bool {
        let prompt = format!("Permanently delete session {}?", session_id);
        if !self.surface.confirm(&prompt) {
            return false;
        }

        match self.api.delete_session(session_id).await {
            Ok(()) => {
                self.notify(ToastKind::Success, format!("Session {} deleted", session_id));
                self.show_history().await;
                true
            }
            Err(e) => {
                self.report_failure("Delete session", &e, "Error while deleting the session");
                false
            }
        }
    }

    pub async fn clear_conversation(&self) -> bool {
        if !self
            .surface
            .confirm("Are you sure you want to clear the conversation history?")
        {
            return false;
        }

        match self.api.clear_conversation().await {
            Ok(()) => {
                self.state.borrow_mut().reset_conversation();
                self.reset_view();
                self.notify(ToastKind::Success, "History cleared");
                true
            }
            Err(e) => {
                self.report_failure("Clear conversation", &e, "Error while clearing the history");
                false
            }
        }
    }

    pub async fn new_conversation(&self) -> bool {
        if !self
            .surface
            .confirm("Start a new conversation? The current one will be saved.")
        {
            return false;
        }

        match self.api.new_conversation().await {
            Ok(created) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.reset_conversation();
                    if created.new_session_id.is_some() {
                        state.session_id = created.new_session_id.clone();
                    }
                }
                self.reset_view();
                let message = match created.new_session_id {
                    Some(id) => format!("New conversation started: {}", id),
                    None => "New conversation started".to_string(),
                };
                log::info!("{}", message);
                self.notify(ToastKind::Success, message);
                true
            }
            Err(e) => {
                self.report_failure(
                    "New conversation",
                    &e,
                    "Error while starting a new conversation",
                );
                false
            }
        }
    }
}

/// Question prefilled when a module is picked.
pub fn module_prompt(name: &str) -> String {
    format!("What does document {} contain?", name)
}
