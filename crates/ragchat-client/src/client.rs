use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ragchat_types::{
    Ack, Envelope, ExampleCategory, ExamplesPayload, HealthResponse, HistoryEntry,
    HistoryPayload, ModuleInfo, ModulesPayload, NewConversation, QueryAnswer, QueryRequest,
    SearchHit, SearchPayload, SearchRequest, SessionRequest, SessionSummary, SessionsPayload,
    Statistics, StatsPayload,
};

use crate::config::{ClientConfig, Endpoint, Method};
use crate::error::ApiError;
use crate::transport::Transport;

/// Operations of the RAG assistant API.
///
/// Application failures (`success: false`) come back as
/// [`ApiError::Rejected`]; everything else as a connectivity error.
#[async_trait(?Send)]
pub trait RagApi {
    async fn health(&self) -> Result<HealthResponse, ApiError>;
    async fn example_questions(&self) -> Result<Vec<ExampleCategory>, ApiError>;
    async fn modules(&self) -> Result<Vec<ModuleInfo>, ApiError>;
    async fn query(&self, request: &QueryRequest) -> Result<QueryAnswer, ApiError>;
    async fn statistics(&self) -> Result<Statistics, ApiError>;
    async fn sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;
    async fn load_session(&self, session_id: &str) -> Result<(), ApiError>;
    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;
    async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError>;
    async fn clear_conversation(&self) -> Result<(), ApiError>;
    async fn new_conversation(&self) -> Result<NewConversation, ApiError>;
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, ApiError>;
}

/// [`RagApi`] over any [`Transport`].
pub struct RagClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> RagClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, endpoint: Endpoint, body: Option<String>) -> Result<String, ApiError> {
        let url = self.config.url(endpoint);
        log::debug!("{} {}", endpoint.method().as_str(), url);
        match endpoint.method() {
            Method::Get => self.transport.get(&url).await,
            Method::Post => self.transport.post(&url, body).await,
        }
    }

    async fn fetch<P: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<String>,
    ) -> Result<P, ApiError> {
        let text = self.send(endpoint, body).await?;
        let envelope: Envelope<P> = serde_json::from_str(&text)?;
        unwrap_envelope(envelope)
    }

    async fn post_json<B: Serialize, P: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<P, ApiError> {
        let body = serde_json::to_string(body)?;
        self.fetch(endpoint, Some(body)).await
    }
}

/// Split an envelope into its payload or the server's reason for failing.
pub fn unwrap_envelope<P>(envelope: Envelope<P>) -> Result<P, ApiError> {
    if envelope.success && envelope.error.is_none() {
        Ok(envelope.data)
    } else {
        Err(ApiError::Rejected(envelope.failure_reason()))
    }
}

#[async_trait(?Send)]
impl<T: Transport> RagApi for RagClient<T> {
    async fn health(&self) -> Result<HealthResponse, ApiError> {
        let text = self.send(Endpoint::Health, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn example_questions(&self) -> Result<Vec<ExampleCategory>, ApiError> {
        let payload: ExamplesPayload = self.fetch(Endpoint::Examples, None).await?;
        Ok(payload.examples)
    }

    async fn modules(&self) -> Result<Vec<ModuleInfo>, ApiError> {
        let payload: ModulesPayload = self.fetch(Endpoint::Modules, None).await?;
        Ok(payload.modules)
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryAnswer, ApiError> {
        self.post_json(Endpoint::Query, request).await
    }

    async fn statistics(&self) -> Result<Statistics, ApiError> {
        let payload: StatsPayload = self.fetch(Endpoint::Stats, None).await?;
        Ok(payload.statistics)
    }

    async fn sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let payload: SessionsPayload = self.fetch(Endpoint::Sessions, None).await?;
        Ok(payload.sessions)
    }

    async fn load_session(&self, session_id: &str) -> Result<(), ApiError> {
        let request = SessionRequest {
            session_id: session_id.to_string(),
        };
        let _: Ack = self.post_json(Endpoint::LoadSession, &request).await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let request = SessionRequest {
            session_id: session_id.to_string(),
        };
        let _: Ack = self.post_json(Endpoint::DeleteSession, &request).await?;
        Ok(())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        let payload: HistoryPayload = self.fetch(Endpoint::History, None).await?;
        Ok(payload.history)
    }

    async fn clear_conversation(&self) -> Result<(), ApiError> {
        let _: Ack = self.fetch(Endpoint::Clear, None).await?;
        Ok(())
    }

    async fn new_conversation(&self) -> Result<NewConversation, ApiError> {
        self.fetch(Endpoint::NewConversation, None).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, ApiError> {
        let payload: SearchPayload = self.post_json(Endpoint::Search, request).await?;
        Ok(payload.results)
    }
}
