use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use ragchat_types::ConversationTurn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown export format '{}' (use json or text)", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    session: &'a str,
    exported_at: String,
    conversations: &'a [ConversationTurn],
}

pub fn export_file_name(format: ExportFormat, at: &DateTime<Local>) -> String {
    format!(
        "ragchat_export_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Serialize the turns in the requested format.
pub fn render_export(
    turns: &[ConversationTurn],
    session: &str,
    format: ExportFormat,
    at: &DateTime<Local>,
) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let export = JsonExport {
                session,
                exported_at: at.to_rfc3339(),
                conversations: turns,
            };
            serde_json::to_string_pretty(&export).context("Failed to serialize conversation")
        }
        ExportFormat::Text => {
            let mut lines = vec![
                format!("=== CONVERSATION {} ===", session),
                format!("Exported: {}", at.format("%d/%m/%Y %H:%M")),
                String::new(),
            ];
            for (i, turn) in turns.iter().enumerate() {
                let n = i + 1;
                lines.push(format!("[{}] Q: {}", n, turn.question));
                lines.push(format!("[{}] A: {}", n, turn.response));
                if turn.metadata.sources_count > 0 {
                    lines.push(format!("    Sources: {} documents", turn.metadata.sources_count));
                }
                lines.push("---".to_string());
            }
            Ok(lines.join("\n"))
        }
    }
}

/// Write the transcript to `ragchat_export_<timestamp>.<ext>` under `dir`.
pub fn export_conversation(
    turns: &[ConversationTurn],
    session: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf> {
    let now = Local::now();
    let content = render_export(turns, session, format, &now)?;
    let path = dir.join(export_file_name(format, &now));
    fs::write(&path, content)
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    Ok(path)
}
