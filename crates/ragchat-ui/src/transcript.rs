//! View model of the chat area.

use ragchat_types::{ConversationTurn, HistoryEntry, ResponseMetadata, SourceCitation};

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    User {
        text: String,
    },
    Assistant {
        markdown: String,
        metadata: Option<ResponseMetadata>,
        /// Empty when citations were not requested.
        sources: Vec<SourceCitation>,
    },
    Error {
        message: String,
    },
    /// Opens a replayed session.
    ResumeBanner {
        session_id: String,
        turns: usize,
    },
    /// Closes a replayed session.
    ContinueBanner,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        TranscriptEntry::User { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        TranscriptEntry::Error {
            message: message.into(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, TranscriptEntry::Assistant { .. })
    }
}

/// Ordered entries of the chat area. The welcome placeholder shows while it
/// is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn replace(&mut self, entries: Vec<TranscriptEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn welcome_visible(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A server history rebuilt as transcript entries and cached turns.
pub struct Replay {
    pub entries: Vec<TranscriptEntry>,
    pub turns: Vec<ConversationTurn>,
}

/// Banner, one user/assistant pair per entry, closing banner.
pub fn replay_history(
    session_id: &str,
    history: &[HistoryEntry],
    default_model: &str,
    include_sources: bool,
) -> Replay {
    let mut entries = Vec::with_capacity(history.len() * 2 + 2);
    let mut turns = Vec::with_capacity(history.len());

    entries.push(TranscriptEntry::ResumeBanner {
        session_id: session_id.to_string(),
        turns: history.len(),
    });
    for entry in history {
        let turn = ConversationTurn::from_history(entry, default_model);
        entries.push(TranscriptEntry::user(entry.question.clone()));
        entries.push(TranscriptEntry::Assistant {
            markdown: entry.response.clone(),
            metadata: Some(turn.metadata.clone()),
            sources: if include_sources {
                entry.sources.clone()
            } else {
                Vec::new()
            },
        });
        turns.push(turn);
    }
    entries.push(TranscriptEntry::ContinueBanner);

    Replay { entries, turns }
}
