use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use colored::Colorize;
use rustyline::DefaultEditor;

use ragchat_types::{
    ConversationTurn, ExampleCategory, ModuleInfo, ResponseMetadata, SearchHit, SessionSummary, SourceCitation,
    Statistics,
};
use ragchat_ui::format::{local_datetime, local_time, percent, plural, round_average, truncate};
use ragchat_ui::view::citation_line;
use ragchat_ui::{ConnectionStatus, Indicator, Surface, Toast, ToastKind, TranscriptEntry};

use crate::markdown::render_terminal;

const EXCERPT_CHARS: usize = 120;
const SEARCH_EXCERPT_CHARS: usize = 200;
const HISTORY_EXCERPT_CHARS: usize = 200;

/// How state-changing actions get confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Ask on the terminal.
    Prompt,
    /// Accept without asking (`--yes`).
    AutoYes,
}

/// Surface writing the conversation to a terminal (or any writer).
pub struct TerminalSurface<W: Write> {
    out: RefCell<W>,
    confirm_mode: ConfirmMode,
    welcome: Cell<bool>,
    pending_input: RefCell<Option<String>>,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout(confirm_mode: ConfirmMode) -> Self {
        Self::new(io::stdout(), confirm_mode)
    }
}

impl TerminalSurface<Vec<u8>> {
    /// Everything written so far, for tests.
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).to_string()
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, confirm_mode: ConfirmMode) -> Self {
        Self {
            out: RefCell::new(out),
            confirm_mode,
            welcome: Cell::new(true),
            pending_input: RefCell::new(None),
        }
    }

    /// Text a picked example or module left for the next prompt.
    pub fn take_pending_input(&self) -> Option<String> {
        self.pending_input.borrow_mut().take()
    }

    pub fn print(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            log::debug!("Terminal write failed: {}", e);
        }
    }

    pub fn print_welcome(&self) {
        self.print(&format!(
            "{} {}",
            "💬".bright_cyan(),
            "Ask a question about the documentation, or type !help for commands.".bright_black()
        ));
    }

    /// Current session plus the status seen at the last health check.
    pub fn print_session(&self, session: Option<&SessionSummary>, status: &ConnectionStatus) {
        match session {
            Some(session) => {
                self.print(&format!(
                    "{} {}",
                    "🗂️  Current session:".bold(),
                    session.session_id.bright_cyan()
                ));
                if let Some(start) = &session.start_time {
                    self.print(&format!("   Started: {}", local_datetime(start)));
                }
                self.print(&format!("   Turns: {}", session.turns()));
            }
            None => self.print(&"No current session reported by the server.".yellow().to_string()),
        }
        self.print(&format!(
            "   {} | {}",
            self.indicator("Assistant:", &status.assistant),
            self.indicator("Document store:", &status.store)
        ));
    }

    /// The local turn cache, responses truncated.
    pub fn print_turns(&self, turns: &[ConversationTurn], session: Option<&str>) {
        if turns.is_empty() {
            self.print("No conversation in the history yet.");
            return;
        }
        self.print(&format!("{}", "📜 Conversation history".bold()));
        if let Some(session) = session {
            self.print(&format!("   Session: {}", session.bright_cyan()));
        }
        self.print(&format!("   Interactions: {}", turns.len()));
        for (i, turn) in turns.iter().enumerate() {
            let method = turn
                .metadata
                .method
                .as_deref()
                .unwrap_or("rag")
                .to_uppercase();
            let context = if turn.metadata.context_reference {
                "CONTEXTUAL"
            } else {
                "NEW"
            };
            self.print(&format!(
                "\n   {} [{}] [{}]",
                format!("Interaction {}", i + 1).bold(),
                method,
                context
            ));
            self.print(&format!("     Question: {}", turn.question));
            self.print(&format!(
                "     Response: {}",
                truncate(&turn.response, HISTORY_EXCERPT_CHARS)
            ));
            if turn.metadata.sources_count > 0 {
                self.print(&format!(
                    "     Sources: {}",
                    plural(turn.metadata.sources_count, "document", "documents")
                ));
            }
        }
    }

    fn indicator(&self, name: &str, indicator: &Indicator) -> String {
        let label = if indicator.online {
            indicator.label.green()
        } else {
            indicator.label.red()
        };
        format!("{} {}", name.bold(), label)
    }

    fn metadata_line(metadata: &ResponseMetadata) -> String {
        let time = metadata.timestamp.as_deref().map(local_time).unwrap_or_default();
        let mut parts = Vec::new();
        if !time.is_empty() {
            parts.push(time);
        }
        parts.push(plural(metadata.sources_count, "source", "sources"));
        parts.push(plural(metadata.tokens_used, "token", "tokens"));
        if !metadata.model.is_empty() {
            parts.push(metadata.model.clone());
        }
        parts.join(" · ")
    }

    fn print_citations(&self, sources: &[SourceCitation]) {
        if sources.is_empty() {
            return;
        }
        self.print(&format!("{}", "📚 Sources consulted:".bold()));
        for (i, citation) in sources.iter().enumerate() {
            self.print(&format!("   {}", citation_line(i, citation).cyan()));
            if let Some(section) = citation.section_title.as_deref().filter(|s| !s.is_empty()) {
                self.print(&format!("      Section: {}", section));
            }
            if let Some(content) = citation.content.as_deref().filter(|c| !c.trim().is_empty()) {
                let excerpt = truncate(&content.replace('\n', " "), EXCERPT_CHARS);
                self.print(&format!("      {}", excerpt.bright_black()));
            }
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn set_status(&self, status: &ConnectionStatus) {
        let icon = if status.assistant.online && status.store.online {
            "🟢"
        } else {
            "🔴"
        };
        self.print(&format!(
            "{} {} | {}",
            icon,
            self.indicator("Assistant:", &status.assistant),
            self.indicator("Document store:", &status.store)
        ));
    }

    fn show_examples(&self, categories: &[ExampleCategory]) {
        if categories.is_empty() {
            self.print("No example questions available.");
            return;
        }
        self.print(&format!("{}", "💡 Example questions".bold()));
        let mut index = 0;
        for category in categories {
            self.print(&format!("  {}", category.category.bright_cyan()));
            for question in &category.questions {
                index += 1;
                self.print(&format!("   {:>2}. {}", index, question));
            }
        }
    }

    fn show_modules(&self, modules: &[ModuleInfo]) {
        if modules.is_empty() {
            self.print("No modules available.");
            return;
        }
        self.print(&format!("{}", "📖 Modules".bold()));
        for (i, module) in modules.iter().enumerate() {
            let mut line = format!("   {:>2}. {}", i + 1, module.name.bright_cyan());
            if let Some(count) = module.document_count {
                line.push_str(&format!(" ({})", plural(count, "document", "documents")));
            }
            self.print(&line);
            if !module.description.is_empty() {
                self.print(&format!("       {}", module.description.bright_black()));
            }
        }
    }

    fn set_input(&self, text: &str) {
        *self.pending_input.borrow_mut() = Some(text.to_string());
    }

    fn clear_input(&self) {
        self.pending_input.borrow_mut().take();
    }

    fn set_welcome_visible(&self, visible: bool) {
        if visible && !self.welcome.get() {
            self.print_welcome();
        }
        self.welcome.set(visible);
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            self.print(&format!("{}", "⏳ Thinking...".bright_black()));
        }
    }

    fn append_entry(&self, entry: &TranscriptEntry) {
        match entry {
            TranscriptEntry::User { text } => {
                self.print(&format!("{} {}", "🧑 You:".bold().blue(), text));
            }
            TranscriptEntry::Assistant {
                markdown,
                metadata,
                sources,
            } => {
                self.print(&format!("{}", "🤖 Assistant:".bold().green()));
                self.print(&render_terminal(markdown));
                if let Some(metadata) = metadata {
                    self.print(&Self::metadata_line(metadata).bright_black().to_string());
                }
                self.print_citations(sources);
                self.print("");
            }
            TranscriptEntry::Error { message } => {
                self.print(&format!("{} {}", "❌".red(), message.red()));
            }
            TranscriptEntry::ResumeBanner { session_id, turns } => {
                self.print(&format!(
                    "{} {}",
                    "📂".bright_cyan(),
                    format!(
                        "Resumed session {} ({})",
                        session_id,
                        plural(*turns as u64, "exchange", "exchanges")
                    )
                    .bold()
                ));
            }
            TranscriptEntry::ContinueBanner => {
                self.print(&"── You can continue the conversation below ──".bright_black().to_string());
            }
        }
    }

    fn clear_transcript(&self) {
        self.print(&"─".repeat(40).bright_black().to_string());
    }

    fn show_stats(&self, stats: &Statistics) {
        self.print(&format!("{}", "📊 Statistics".bold()));
        if let Some(conversation) = &stats.conversation {
            self.print(&format!("   Interactions:        {}", conversation.total_interactions));
            self.print(&format!("   Tokens used:         {}", conversation.total_tokens_used));
            self.print(&format!(
                "   Tokens/interaction:  {}",
                round_average(conversation.average_tokens_per_interaction)
            ));
        }
        if let Some(index) = &stats.index {
            if let Some(total) = index.total_documents {
                self.print(&format!("   Indexed documents:   {}", total));
            }
            if let Some(modules) = index.modules.as_ref().filter(|m| !m.is_empty()) {
                self.print(&format!("{}", "   Documents per module".bold()));
                for (name, count) in modules {
                    self.print(&format!("     {:<24} {}", name, count));
                }
            }
        }
    }

    fn show_sessions(&self, sessions: &[SessionSummary]) {
        if sessions.is_empty() {
            self.print("No sessions found.");
            return;
        }
        self.print(&format!("{}", "🗂️  Sessions".bold()));
        for session in sessions {
            let name = session
                .session_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(&session.session_id);
            let mut line = format!("   {} {}", "•".bright_black(), name.bright_cyan());
            if session.is_current {
                line.push_str(&format!(" {}", "[current session]".green()));
            }
            self.print(&line);
            self.print(&format!(
                "     id: {} | started: {} | last activity: {} | {}",
                session.session_id,
                local_datetime(session.start_time.as_deref().unwrap_or_default()),
                local_datetime(session.last_activity.as_deref().unwrap_or_default()),
                plural(session.turns(), "turn", "turns")
            ));
        }
    }

    fn close_sessions(&self) {}

    fn show_search_results(&self, query: &str, hits: &[SearchHit]) {
        if hits.is_empty() {
            self.print(&format!("No passages matched '{}'.", query));
            return;
        }
        self.print(&format!(
            "{} {} for '{}'",
            "🔎".bright_cyan(),
            plural(hits.len() as u64, "passage", "passages").bold(),
            query
        ));
        for (i, hit) in hits.iter().enumerate() {
            let source = hit
                .source
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(SourceCitation::UNKNOWN_DOCUMENT);
            self.print(&format!(
                "   {}. {} ({}%)",
                i + 1,
                source.cyan(),
                percent(hit.similarity)
            ));
            let excerpt = truncate(&hit.content.replace('\n', " "), SEARCH_EXCERPT_CHARS);
            self.print(&format!("      {}", excerpt.bright_black()));
        }
    }

    fn notify(&self, toast: &Toast) {
        let line = match toast.kind {
            ToastKind::Success => format!("✅ {}", toast.message).green(),
            ToastKind::Error => format!("❌ {}", toast.message).red(),
            ToastKind::Info => format!("ℹ️  {}", toast.message).cyan(),
        };
        self.print(&line.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.confirm_mode == ConfirmMode::AutoYes {
            return true;
        }
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                log::warn!("Cannot open a confirmation prompt: {}", e);
                return false;
            }
        };
        match rl.readline(&format!("{} [y/N] ", prompt.yellow())) {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
