//! Pure view-model to HTML functions.
//!
//! Every interpolated string goes through [`escape_html`]. Clickable items
//! carry `data-*` attributes and are handled by delegated listeners, so no
//! fragment contains inline script.

use ragchat_types::{
    ExampleCategory, ModuleInfo, ResponseMetadata, SessionSummary, SourceCitation, Statistics,
};

use crate::format::{local_datetime, local_time, percent, plural, round_average};
use crate::markdown::{render_markdown, render_plain};
use crate::toast::Toast;
use crate::transcript::TranscriptEntry;

pub const ACTION_LOAD_SESSION: &str = "load-session";
pub const ACTION_DELETE_SESSION: &str = "delete-session";

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ============================================================================
// Transcript
// ============================================================================

pub fn entry_html(entry: &TranscriptEntry) -> String {
    match entry {
        TranscriptEntry::User { text } => message_html("user", "", &render_plain(text), ""),
        TranscriptEntry::Assistant {
            markdown,
            metadata,
            sources,
        } => {
            let mut extra = String::new();
            if let Some(metadata) = metadata {
                extra.push_str(&metadata_html(metadata));
            }
            extra.push_str(&citations_html(sources));
            message_html("assistant", "", &render_markdown(markdown), &extra)
        }
        TranscriptEntry::Error { message } => {
            message_html("assistant", " message-error", &render_plain(message), "")
        }
        TranscriptEntry::ResumeBanner { session_id, turns } => format!(
            "<div class=\"session-resume-header\">\
             <div class=\"banner-title\">Resuming conversation</div>\
             <div class=\"banner-detail\">Session: {} &bull; {} restored</div>\
             </div>",
            escape_html(session_id),
            plural(*turns as u64, "interaction", "interactions")
        ),
        TranscriptEntry::ContinueBanner => "<div class=\"continuation-message\">\
             <div class=\"banner-title\">Conversation restored</div>\
             <div class=\"banner-detail\">You can pick up where you left off.</div>\
             </div>"
            .to_string(),
    }
}

fn message_html(sender: &str, modifier: &str, bubble: &str, extra: &str) -> String {
    let icon = if sender == "user" { "fa-user" } else { "fa-robot" };
    format!(
        "<div class=\"message message-{sender}{modifier}\">\
         <div class=\"message-avatar\"><i class=\"fas {icon}\"></i></div>\
         <div class=\"message-content\">\
         <div class=\"message-bubble\">{bubble}</div>{extra}\
         </div></div>"
    )
}

pub fn metadata_html(metadata: &ResponseMetadata) -> String {
    format!(
        "<div class=\"message-metadata\">\
         <span><i class=\"fas fa-clock\"></i> {}</span>\
         <span><i class=\"fas fa-database\"></i> {} sources</span>\
         <span><i class=\"fas fa-coins\"></i> {} tokens</span>\
         <span><i class=\"fas fa-brain\"></i> {}</span>\
         </div>",
        escape_html(&local_time(metadata.timestamp.as_deref().unwrap_or(""))),
        metadata.sources_count,
        metadata.tokens_used,
        escape_html(&metadata.model)
    )
}

/// Numbered passage line with its similarity as a percentage.
pub fn citation_line(index: usize, citation: &SourceCitation) -> String {
    format!(
        "{}. {} — {}%",
        index + 1,
        citation.document(),
        percent(citation.similarity())
    )
}

pub fn citations_html(sources: &[SourceCitation]) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let mut html = String::from(
        "<div class=\"message-sources\"><h4><i class=\"fas fa-book\"></i> Sources consulted</h4>",
    );
    for (index, citation) in sources.iter().enumerate() {
        html.push_str("<div class=\"source-item\"><div class=\"source-title\">");
        html.push_str(&escape_html(&citation_line(index, citation)));
        html.push_str("</div>");
        if let Some(section) = citation.section_title.as_deref().filter(|s| !s.is_empty()) {
            html.push_str(&format!(
                "<div class=\"source-details\">Section: {}</div>",
                escape_html(section)
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

// ============================================================================
// Sidebar
// ============================================================================

/// Questions are numbered across categories; `data-example-index` is that
/// flattened position.
pub fn examples_html(categories: &[ExampleCategory]) -> String {
    let mut html = String::new();
    let mut index = 0;
    for category in categories {
        html.push_str("<div class=\"example-category\">");
        html.push_str(&format!("<h4>{}</h4>", escape_html(&category.category)));
        for question in &category.questions {
            html.push_str(&format!(
                "<div class=\"example-question\" data-example-index=\"{}\">{}</div>",
                index,
                escape_html(question)
            ));
            index += 1;
        }
        html.push_str("</div>");
    }
    html
}

pub fn modules_html(modules: &[ModuleInfo]) -> String {
    modules
        .iter()
        .enumerate()
        .map(|(index, module)| {
            let count = module
                .document_count
                .map(|n| {
                    format!(
                        "<div class=\"module-count\">{}</div>",
                        plural(n, "document", "documents")
                    )
                })
                .unwrap_or_default();
            format!(
                "<div class=\"module-item\" data-module-index=\"{}\">\
                 <div class=\"module-name\">{}</div>\
                 <div class=\"module-description\">{}</div>{}\
                 </div>",
                index,
                escape_html(&module.name),
                escape_html(&module.description),
                count
            )
        })
        .collect()
}

// ============================================================================
// Modals
// ============================================================================

fn stat_card(value: &str, label: &str) -> String {
    format!(
        "<div class=\"stat-card\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div>",
        escape_html(value),
        escape_html(label)
    )
}

pub fn stats_html(stats: &Statistics) -> String {
    let mut html = String::from("<div class=\"stats-grid\">");
    if let Some(conversation) = &stats.conversation {
        html.push_str(&stat_card(
            &conversation.total_interactions.to_string(),
            "Interactions",
        ));
        html.push_str(&stat_card(
            &conversation.total_tokens_used.to_string(),
            "Tokens used",
        ));
        html.push_str(&stat_card(
            &round_average(conversation.average_tokens_per_interaction).to_string(),
            "Tokens/interaction",
        ));
    }
    if let Some(index) = &stats.index {
        html.push_str(&stat_card(
            &index.total_documents.unwrap_or(0).to_string(),
            "Indexed documents",
        ));
    }
    html.push_str("</div>");

    if let Some(modules) = stats.index.as_ref().and_then(|index| index.modules.as_ref()) {
        html.push_str("<h3>Documents per module</h3><div class=\"stats-grid\">");
        for (module, count) in modules {
            html.push_str(&stat_card(&count.to_string(), module));
        }
        html.push_str("</div>");
    }
    html
}

pub fn sessions_html(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "<p>No sessions found.</p>".to_string();
    }

    let mut html = String::from("<h3><i class=\"fas fa-list\"></i> Conversation sessions</h3>");
    for session in sessions {
        let id = escape_html(&session.session_id);
        let (item_class, status) = if session.is_current {
            ("session-item session-current", "Active session")
        } else {
            ("session-item", "Archived session")
        };
        let actions = if session.is_current {
            "<span class=\"session-badge\"><i class=\"fas fa-check-circle\"></i> Current session</span>"
                .to_string()
        } else {
            format!(
                "<button class=\"session-load\" data-action=\"{ACTION_LOAD_SESSION}\" data-session-id=\"{id}\">\
                 <i class=\"fas fa-upload\"></i> Load</button>\
                 <button class=\"session-delete\" data-action=\"{ACTION_DELETE_SESSION}\" data-session-id=\"{id}\">\
                 <i class=\"fas fa-trash\"></i> Delete</button>"
            )
        };
        html.push_str(&format!(
            "<div class=\"{item_class}\">\
             <div class=\"session-header\"><div class=\"session-title\">{id}</div>\
             <div class=\"session-status\">{status}</div></div>\
             <div class=\"session-metadata\">\
             <div><i class=\"fas fa-clock\"></i> Started: {}</div>\
             <div><i class=\"fas fa-history\"></i> Last activity: {}</div>\
             <div><i class=\"fas fa-comments\"></i> {}</div>\
             </div>\
             <div class=\"session-actions\">{actions}</div>\
             </div>",
            escape_html(&local_datetime(session.start_time.as_deref().unwrap_or(""))),
            escape_html(&local_datetime(session.last_activity.as_deref().unwrap_or(""))),
            plural(session.turns(), "interaction", "interactions"),
        ));
    }
    html
}

pub fn toast_html(toast: &Toast) -> String {
    format!(
        "<div id=\"{}\" class=\"{}\">{}</div>",
        toast.element_id(),
        toast.css_class(),
        escape_html(&toast.message)
    )
}
