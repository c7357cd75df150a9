use std::time::Duration;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::transport::Transport;

/// Native HTTP transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        // Error statuses still carry a JSON envelope worth decoding.
        if !status.is_success() {
            log::debug!("HTTP {}: {}", status, text);
        }
        Ok(text)
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post(&self, url: &str, body: Option<String>) -> Result<String, ApiError> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        Self::read(response).await
    }
}
