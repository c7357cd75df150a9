use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragchat_client::{native_client, ClientConfig, RagClient, ReqwestTransport};

/// Mock RAG server mounted under the default `/api/rag` base.
pub struct RagMockServer {
    server: MockServer,
}

impl RagMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn client(&self) -> RagClient<ReqwestTransport> {
        native_client(ClientConfig::with_base_url(self.server.uri())).unwrap()
    }

    pub async fn mock_get(&self, endpoint: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/rag{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_post(&self, endpoint: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/api/rag{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one POST whose JSON body contains `expected`.
    pub async fn expect_post(&self, endpoint: &str, expected: Value, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/api/rag{}", endpoint)))
            .and(body_partial_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_query_success(&self, response: &str) {
        self.mock_post(
            "/query",
            200,
            json!({
                "success": true,
                "question": "What is X?",
                "response": response,
                "metadata": {
                    "timestamp": "2024-05-01T10:00:00",
                    "sources_count": 1,
                    "tokens_used": 50,
                    "model": "codestral-latest"
                },
                "sources": [{"source": "doc1.pdf", "similarity": 0.92}]
            }),
        )
        .await;
    }
}
