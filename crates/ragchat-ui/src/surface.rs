use ragchat_types::{ExampleCategory, ModuleInfo, SearchHit, SessionSummary, Statistics};

use crate::state::ConnectionStatus;
use crate::toast::Toast;
use crate::transcript::TranscriptEntry;

/// Presentation target driven by the controller: the DOM page or the
/// terminal.
///
/// Calls are synchronous and never re-enter the controller.
pub trait Surface {
    fn set_status(&self, status: &ConnectionStatus);
    fn show_examples(&self, categories: &[ExampleCategory]);
    fn show_modules(&self, modules: &[ModuleInfo]);

    /// Prefill the question input.
    fn set_input(&self, text: &str);
    fn clear_input(&self);

    fn set_welcome_visible(&self, visible: bool);
    fn set_loading(&self, loading: bool);
    fn append_entry(&self, entry: &TranscriptEntry);
    fn clear_transcript(&self);

    /// Render the statistics and open their dialog.
    fn show_stats(&self, stats: &Statistics);
    /// Render the session list and open (or refresh) its dialog.
    fn show_sessions(&self, sessions: &[SessionSummary]);
    fn close_sessions(&self);

    fn show_search_results(&self, _query: &str, _hits: &[SearchHit]) {}

    fn notify(&self, toast: &Toast);

    /// Ask the user to confirm a state-changing action.
    fn confirm(&self, prompt: &str) -> bool;
}
