#![allow(dead_code)]

use std::rc::Rc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragchat::{ConfirmMode, TerminalSurface};
use ragchat_client::{native_client, ClientConfig, RagClient, ReqwestTransport};
use ragchat_types::QueryOptions;
use ragchat_ui::Controller;

pub type CapturedController = Controller<RagClient<ReqwestTransport>, TerminalSurface<Vec<u8>>>;

pub async fn server() -> MockServer {
    MockServer::start().await
}

pub async fn mount(server: &MockServer, verb: &str, endpoint: &str, body: Value) {
    Mock::given(method(verb))
        .and(path(format!("/api/rag{}", endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Controller against `server` writing into a buffer, colors off.
pub fn controller(server: &MockServer) -> Rc<CapturedController> {
    colored::control::set_override(false);
    let config = ClientConfig::with_base_url(server.uri());
    let api = native_client(config.clone()).unwrap();
    Rc::new(Controller::new(
        api,
        TerminalSurface::new(Vec::new(), ConfirmMode::AutoYes),
        config,
        QueryOptions::default(),
    ))
}

pub fn answer() -> Value {
    json!({
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

pub fn history(n: usize) -> Value {
    let history: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "question": format!("q{}", i),
                "response": format!("r{}", i),
                "timestamp": "2024-05-01T10:00:00",
                "tokens_used": 10 + i
            })
        })
        .collect();
    json!({"success": true, "history": history, "count": n})
}

pub async fn requests_to(server: &MockServer, endpoint: &str) -> usize {
    let full = format!("/api/rag{}", endpoint);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == full)
        .count()
}
