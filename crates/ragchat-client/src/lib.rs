//! HTTP client for the RAG assistant API.
//!
//! [`RagClient`] speaks the JSON protocol over a pluggable [`Transport`]:
//! reqwest on native targets, the browser fetch API in the wasm front-end.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

#[cfg(feature = "native")]
pub mod reqwest_transport;

pub use client::{unwrap_envelope, RagApi, RagClient};
pub use config::{ClientConfig, Endpoint, Method, DEFAULT_API_BASE, DEFAULT_SERVER_URL};
pub use error::ApiError;
pub use transport::Transport;

#[cfg(feature = "native")]
pub use reqwest_transport::ReqwestTransport;

/// Client over reqwest with the configured timeout.
#[cfg(feature = "native")]
pub fn native_client(config: ClientConfig) -> Result<RagClient<ReqwestTransport>, ApiError> {
    let transport = ReqwestTransport::new(config.request_timeout)?;
    Ok(RagClient::new(transport, config))
}
