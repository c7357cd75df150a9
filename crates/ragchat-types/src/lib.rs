//! Core types for ragchat
//!
//! Wire protocol of the RAG assistant API plus the small client-side
//! domain model shared by every front-end.

use serde::{Deserialize, Serialize};

pub mod protocol;

pub use protocol::*;

// ============================================================================
// Constants
// ============================================================================

/// Number of passages requested per question.
pub const DEFAULT_MAX_SOURCES: u32 = 5;

/// Model label used when the server history carries no metadata.
pub const DEFAULT_MODEL_LABEL: &str = "codestral-latest";

// ============================================================================
// Domain
// ============================================================================

/// One question/response exchange held in the client's turn cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub response: String,
    pub metadata: ResponseMetadata,
    pub timestamp: String,
}

impl ConversationTurn {
    /// Rebuild a turn from a server history entry.
    pub fn from_history(entry: &HistoryEntry, default_model: &str) -> Self {
        let metadata = entry.metadata_or_synthesized(default_model);
        Self {
            question: entry.question.clone(),
            response: entry.response.clone(),
            timestamp: entry
                .timestamp
                .clone()
                .or_else(|| metadata.timestamp.clone())
                .unwrap_or_default(),
            metadata,
        }
    }
}

/// The two user toggles sent along with every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub include_sources: bool,
    pub include_conversation: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            include_sources: true,
            include_conversation: true,
        }
    }
}

impl QueryOptions {
    pub fn request(&self, question: &str, max_sources: u32) -> QueryRequest {
        QueryRequest {
            question: question.to_string(),
            max_sources,
            include_conversation: self.include_conversation,
            include_sources: self.include_sources,
        }
    }
}
