//! Request and response bodies of the RAG assistant REST API.
//!
//! Every field the server may omit carries a default so that a
//! `{"success": false, "error": ...}` body still decodes into the payload
//! type and the error text can be surfaced.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Envelope
// ============================================================================

/// The `{success, error, ...}` wrapper shared by every endpoint but `/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Server-provided reason for a failed call, if any.
    pub fn failure_reason(&self) -> Option<String> {
        self.error.clone().or_else(|| self.message.clone())
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub components: Option<HealthComponents>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthComponents {
    #[serde(default)]
    pub rag_system: bool,
    #[serde(default)]
    pub indexer_system: bool,
    #[serde(default)]
    pub database: bool,
}

// ============================================================================
// Sidebar data
// ============================================================================

/// A labelled group of suggested questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleCategory {
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamplesPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<ExampleCategory>,
}

/// An indexed document (or document group) the assistant can answer about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub document_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModulesPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<ModuleInfo>,
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub max_sources: u32,
    pub include_conversation: bool,
    pub include_sources: bool,
}

/// Metadata attached to an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub sources_count: u64,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub context_reference: bool,
}

/// A retrieved passage cited by an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SourceCitation {
    pub const UNKNOWN_DOCUMENT: &'static str = "Unknown document";

    /// Document identifier, falling back to `source_document`.
    pub fn document(&self) -> &str {
        self.source
            .as_deref()
            .or(self.source_document.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(Self::UNKNOWN_DOCUMENT)
    }

    pub fn similarity(&self) -> f64 {
        self.similarity.unwrap_or(0.0)
    }
}

/// Successful `/query` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryAnswer {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SourceCitation>,
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub system_status: Option<SystemStatus>,
    #[serde(default)]
    pub index: Option<IndexStats>,
    #[serde(default)]
    pub conversation: Option<ConversationStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub rag_available: bool,
    #[serde(default)]
    pub indexer_available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexStats {
    #[serde(default)]
    pub total_documents: Option<u64>,
    #[serde(default)]
    pub modules: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub vector_store_ready: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConversationStats {
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default)]
    pub total_tokens_used: u64,
    #[serde(default)]
    pub average_tokens_per_interaction: f64,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Sessions and history
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
    #[serde(default)]
    pub is_current: bool,
}

impl SessionSummary {
    pub fn turns(&self) -> u64 {
        self.turns_count.or(self.message_count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sessions: Vec<SessionSummary>,
}

/// Body of `/conversation/load` and `/conversation/delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// One persisted exchange as returned by `/conversation/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SourceCitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub context_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl HistoryEntry {
    pub fn tokens_spent(&self) -> u64 {
        self.tokens_used.or(self.tokens).unwrap_or(0)
    }

    /// Server metadata, or a block rebuilt from the entry itself.
    pub fn metadata_or_synthesized(&self, default_model: &str) -> ResponseMetadata {
        // Method and context flag live at the entry's top level.
        if let Some(metadata) = &self.metadata {
            let mut metadata = metadata.clone();
            if metadata.method.is_none() {
                metadata.method = self.method.clone();
            }
            metadata.context_reference |= self.context_reference;
            return metadata;
        }
        ResponseMetadata {
            timestamp: self.timestamp.clone(),
            sources_count: self.sources.len() as u64,
            tokens_used: self.tokens_spent(),
            model: default_model.to_string(),
            method: self.method.clone(),
            context_reference: self.context_reference,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<HistoryEntry>,
}

/// Payload of calls that only acknowledge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewConversation {
    #[serde(default)]
    pub new_session_id: Option<String>,
    #[serde(default)]
    pub old_session_id: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: Option<u64>,
}
