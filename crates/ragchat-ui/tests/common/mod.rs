#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::Value;

use ragchat_client::{ApiError, ClientConfig, RagClient, Transport};
use ragchat_types::{ExampleCategory, ModuleInfo, QueryOptions, SearchHit, SessionSummary, Statistics};
use ragchat_ui::{ConnectionStatus, Controller, Surface, Toast, TranscriptEntry};

pub type TestController = Controller<RagClient<ScriptedTransport>, RecordingSurface>;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory transport answering from per-route reply queues.
///
/// The last reply of a queue repeats. A gated route waits for its
/// `oneshot` sender to fire before answering.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<HashMap<String, VecDeque<Result<String, ApiError>>>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn reply(&self, path: &str, body: Value) {
        self.push(path, Ok(body.to_string()));
    }

    pub fn fail(&self, path: &str) {
        self.push(path, Err(ApiError::Transport("connection refused".to_string())));
    }

    fn push(&self, path: &str, reply: Result<String, ApiError>) {
        self.replies
            .borrow_mut()
            .entry(format!("/api/rag{}", path))
            .or_default()
            .push_back(reply);
    }

    /// Hold the next call to `path` until the returned sender fires.
    pub fn hold(&self, path: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates
            .borrow_mut()
            .insert(format!("/api/rag{}", path), gate);
        release
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        let full = format!("/api/rag{}", path);
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.path == full)
            .cloned()
            .collect()
    }

    async fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        self.calls.borrow_mut().push(Call {
            method,
            path: url.to_string(),
            body: body.and_then(|b| serde_json::from_str(&b).ok()),
        });

        let gate = self.gates.borrow_mut().remove(url);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut replies = self.replies.borrow_mut();
        let queue = replies
            .get_mut(url)
            .ok_or_else(|| ApiError::Transport(format!("no reply scripted for {}", url)))?;
        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("empty queue".to_string())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::Transport("empty queue".to_string())))
        }
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        self.answer("GET", url, None).await
    }

    async fn post(&self, url: &str, body: Option<String>) -> Result<String, ApiError> {
        self.answer("POST", url, body).await
    }
}

/// Surface that records what the controller asked it to show.
pub struct RecordingSurface {
    pub confirm_answer: Cell<bool>,
    pub prompts: RefCell<Vec<String>>,
    pub status: RefCell<Option<ConnectionStatus>>,
    pub examples: RefCell<Vec<ExampleCategory>>,
    pub modules: RefCell<Vec<ModuleInfo>>,
    pub input: RefCell<String>,
    pub welcome: Cell<bool>,
    pub loading: Cell<bool>,
    pub loading_changes: RefCell<Vec<bool>>,
    pub entries: RefCell<Vec<TranscriptEntry>>,
    pub stats: RefCell<Option<Statistics>>,
    pub sessions: RefCell<Option<Vec<SessionSummary>>>,
    pub sessions_closed: Cell<u32>,
    pub search_hits: RefCell<Vec<SearchHit>>,
    pub toasts: RefCell<Vec<Toast>>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            confirm_answer: Cell::new(true),
            prompts: RefCell::default(),
            status: RefCell::default(),
            examples: RefCell::default(),
            modules: RefCell::default(),
            input: RefCell::default(),
            welcome: Cell::new(true),
            loading: Cell::new(false),
            loading_changes: RefCell::default(),
            entries: RefCell::default(),
            stats: RefCell::default(),
            sessions: RefCell::default(),
            sessions_closed: Cell::new(0),
            search_hits: RefCell::default(),
            toasts: RefCell::default(),
        }
    }
}

impl RecordingSurface {
    pub fn toast_messages(&self) -> Vec<String> {
        self.toasts.borrow().iter().map(|t| t.message.clone()).collect()
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.borrow().clone()
    }
}

impl Surface for RecordingSurface {
    fn set_status(&self, status: &ConnectionStatus) {
        *self.status.borrow_mut() = Some(status.clone());
    }

    fn show_examples(&self, categories: &[ExampleCategory]) {
        *self.examples.borrow_mut() = categories.to_vec();
    }

    fn show_modules(&self, modules: &[ModuleInfo]) {
        *self.modules.borrow_mut() = modules.to_vec();
    }

    fn set_input(&self, text: &str) {
        *self.input.borrow_mut() = text.to_string();
    }

    fn clear_input(&self) {
        self.input.borrow_mut().clear();
    }

    fn set_welcome_visible(&self, visible: bool) {
        self.welcome.set(visible);
    }

    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
        self.loading_changes.borrow_mut().push(loading);
    }

    fn append_entry(&self, entry: &TranscriptEntry) {
        self.entries.borrow_mut().push(entry.clone());
    }

    fn clear_transcript(&self) {
        self.entries.borrow_mut().clear();
    }

    fn show_stats(&self, stats: &Statistics) {
        *self.stats.borrow_mut() = Some(stats.clone());
    }

    fn show_sessions(&self, sessions: &[SessionSummary]) {
        *self.sessions.borrow_mut() = Some(sessions.to_vec());
    }

    fn close_sessions(&self) {
        self.sessions_closed.set(self.sessions_closed.get() + 1);
    }

    fn show_search_results(&self, _query: &str, hits: &[SearchHit]) {
        *self.search_hits.borrow_mut() = hits.to_vec();
    }

    fn notify(&self, toast: &Toast) {
        self.toasts.borrow_mut().push(toast.clone());
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirm_answer.get()
    }
}

pub fn controller() -> TestController {
    controller_with(QueryOptions::default())
}

pub fn controller_with(options: QueryOptions) -> TestController {
    let config = ClientConfig::default();
    let api = RagClient::new(ScriptedTransport::default(), config.clone());
    Controller::new(api, RecordingSurface::default(), config, options)
}

pub fn transport(controller: &TestController) -> &ScriptedTransport {
    controller.api().transport()
}

pub fn answer_body() -> Value {
    serde_json::json!({
        "success": true,
        "question": "What is X?",
        "response": "**X** is...",
        "metadata": {
            "timestamp": "2024-05-01T10:00:00",
            "sources_count": 2,
            "tokens_used": 50,
            "model": "m1"
        },
        "sources": [{"source": "doc1.pdf", "similarity": 0.92}]
    })
}

pub fn history_body(n: usize) -> Value {
    let history: Vec<Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "question": format!("q{}", i),
                "response": format!("r{}", i),
                "timestamp": "2024-05-01T10:00:00",
                "tokens_used": 10 + i
            })
        })
        .collect();
    serde_json::json!({"success": true, "history": history, "count": n})
}
