use async_trait::async_trait;
use gloo_net::http::{Request, Response};

use ragchat_client::{ApiError, Transport};

/// `fetch`-backed transport. Bodies are read whatever the HTTP status, so
/// error payloads still reach the envelope decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

async fn body_text(response: Response) -> Result<String, ApiError> {
    if !response.ok() {
        log::debug!("{} answered with status {}", response.url(), response.status());
    }
    response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        body_text(response).await
    }

    async fn post(&self, url: &str, body: Option<String>) -> Result<String, ApiError> {
        let builder = Request::post(url).header("Content-Type", "application/json");
        let request = match body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        body_text(response).await
    }
}
