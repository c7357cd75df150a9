use async_trait::async_trait;

use crate::error::ApiError;

/// Moves JSON text to and from the server.
///
/// Implementations return the body whatever the HTTP status: the server
/// reports failures as JSON with `success: false`, and those bodies must
/// reach the envelope decoder. Only a missing response is an error here.
///
/// Futures are `?Send` so the browser fetch API can implement this trait.
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<String, ApiError>;

    /// `body` is already-serialized JSON; `None` sends an empty POST.
    async fn post(&self, url: &str, body: Option<String>) -> Result<String, ApiError>;
}
