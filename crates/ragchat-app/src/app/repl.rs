use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use ragchat_client::RagApi;
use ragchat_ui::{Controller, SendOutcome, Surface};

use crate::export::{export_conversation, ExportFormat};
use crate::refresh::{schedule_resync, AutoRefresh};
use crate::terminal::TerminalSurface;

/// Passages requested by `!search`.
pub const SEARCH_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Examples,
    Modules,
    /// Zero-based index into the flattened example list.
    Example(usize),
    /// Zero-based module index.
    Module(usize),
    Session,
    History,
    Sessions,
    Load(String),
    Delete(String),
    Stats,
    Search(String),
    Export(ExportFormat),
    Sources(Option<bool>),
    Context(Option<bool>),
    Clear,
    New,
    Quit,
    Ask(String),
    /// Malformed command; carries the message to print.
    Invalid(String),
}

fn index_arg(arg: &str, usage: &str, make: fn(usize) -> ReplCommand) -> ReplCommand {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => make(n - 1),
        _ => ReplCommand::Invalid(format!("Usage: {}", usage)),
    }
}

fn required_arg(arg: &str, usage: &str, make: fn(String) -> ReplCommand) -> ReplCommand {
    if arg.is_empty() {
        ReplCommand::Invalid(format!("Usage: {}", usage))
    } else {
        make(arg.to_string())
    }
}

fn switch_arg(arg: &str, usage: &str, make: fn(Option<bool>) -> ReplCommand) -> ReplCommand {
    match arg.to_lowercase().as_str() {
        "" => make(None),
        "on" => make(Some(true)),
        "off" => make(Some(false)),
        _ => ReplCommand::Invalid(format!("Usage: {}", usage)),
    }
}

/// Parse one input line. `None` for blank lines.
pub fn parse_command(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('!') {
        return Some(ReplCommand::Ask(line.to_string()));
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "!help" => ReplCommand::Help,
        "!examples" => ReplCommand::Examples,
        "!modules" => ReplCommand::Modules,
        "!example" => index_arg(arg, "!example <n>", ReplCommand::Example),
        "!module" => index_arg(arg, "!module <n>", ReplCommand::Module),
        "!session" => ReplCommand::Session,
        "!history" => ReplCommand::History,
        "!sessions" => ReplCommand::Sessions,
        "!load" => required_arg(arg, "!load <session-id>", ReplCommand::Load),
        "!delete" => required_arg(arg, "!delete <session-id>", ReplCommand::Delete),
        "!stats" => ReplCommand::Stats,
        "!search" => required_arg(arg, "!search <query>", ReplCommand::Search),
        "!export" => match arg.parse::<ExportFormat>() {
            Ok(format) => ReplCommand::Export(format),
            Err(e) => ReplCommand::Invalid(e),
        },
        "!sources" => switch_arg(arg, "!sources [on|off]", ReplCommand::Sources),
        "!context" => switch_arg(arg, "!context [on|off]", ReplCommand::Context),
        "!clear" => ReplCommand::Clear,
        "!new" | "!new_conversation" => ReplCommand::New,
        "!quit" | "!exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("Unknown command: {} (type !help)", other)),
    };
    Some(command)
}

pub fn help_text() -> String {
    let commands = [
        ("!help", "Show this help"),
        ("!examples", "List example questions"),
        ("!modules", "List the indexed modules"),
        ("!example <n>", "Prefill example question n"),
        ("!module <n>", "Prefill a question about module n"),
        ("!session", "Show the current session"),
        ("!history", "Show the conversation so far"),
        ("!sessions", "List saved sessions"),
        ("!load <id>", "Load a saved session"),
        ("!delete <id>", "Delete a saved session"),
        ("!stats", "Show usage statistics"),
        ("!search <query>", "Search the documents without an answer"),
        ("!export [json|text]", "Export the conversation to a file"),
        ("!sources [on|off]", "Toggle source citations"),
        ("!context [on|off]", "Toggle conversation context"),
        ("!clear", "Clear the conversation history"),
        ("!new", "Start a new conversation"),
        ("!quit, !exit", "Leave"),
    ];
    let mut text = format!("{}\n", "Commands:".bold());
    for (command, description) in commands {
        text.push_str(&format!(
            "  {} {}\n",
            format!("{:<22}", command).bright_cyan(),
            description
        ));
    }
    text.push_str("Anything else is sent as a question.");
    text
}

// ============================================================================
// Input thread
// ============================================================================

/// Result of one prompt on the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

struct ReadRequest {
    prompt: String,
    initial: Option<String>,
}

/// Line editor living on its own thread so local tasks keep running while
/// the prompt waits. One line is read per request.
pub struct LineReader {
    requests: mpsc::Sender<ReadRequest>,
    events: UnboundedReceiver<ReadEvent>,
}

impl LineReader {
    pub fn spawn() -> Result<Self> {
        let (requests, request_rx) = mpsc::channel::<ReadRequest>();
        let (event_tx, events) = unbounded_channel();

        thread::Builder::new()
            .name("ragchat-input".to_string())
            .spawn(move || input_loop(request_rx, event_tx))
            .context("Failed to start the input thread")?;

        Ok(Self { requests, events })
    }

    pub async fn read(&mut self, prompt: &str, initial: Option<String>) -> ReadEvent {
        let request = ReadRequest {
            prompt: prompt.to_string(),
            initial,
        };
        // A dead reader thread may still have queued its failure.
        let _ = self.requests.send(request);
        self.events.recv().await.unwrap_or(ReadEvent::Eof)
    }
}

fn input_loop(requests: mpsc::Receiver<ReadRequest>, events: UnboundedSender<ReadEvent>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            let _ = events.send(ReadEvent::Failed(e.to_string()));
            return;
        }
    };

    while let Ok(request) = requests.recv() {
        let line = match &request.initial {
            Some(initial) => rl.readline_with_initial(&request.prompt, (initial.as_str(), "")),
            None => rl.readline(&request.prompt),
        };
        let event = match line {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                ReadEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReadEvent::Interrupted,
            Err(ReadlineError::Eof) => ReadEvent::Eof,
            Err(e) => ReadEvent::Failed(e.to_string()),
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

// ============================================================================
// Loop
// ============================================================================

enum Flow {
    Continue,
    Quit,
}

fn on_off(on: bool) -> String {
    if on {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}

async fn execute<A, W>(
    controller: &Rc<Controller<A, TerminalSurface<W>>>,
    command: ReplCommand,
    export_dir: &Path,
) -> Flow
where
    A: RagApi + 'static,
    W: Write + 'static,
{
    let surface = controller.surface();
    match command {
        ReplCommand::Help => surface.print(&help_text()),
        ReplCommand::Examples => {
            let cached = controller.state().examples.clone();
            if cached.is_empty() {
                controller.load_examples().await;
            } else {
                surface.show_examples(&cached);
            }
        }
        ReplCommand::Modules => {
            let cached = controller.state().modules.clone();
            if cached.is_empty() {
                controller.load_modules().await;
            } else {
                surface.show_modules(&cached);
            }
        }
        ReplCommand::Example(index) => {
            if controller.pick_example(index) {
                surface.print(&"Question ready below; edit it or press Enter.".bright_black().to_string());
            } else {
                surface.print(&format!("No example #{} (see !examples)", index + 1).yellow().to_string());
            }
        }
        ReplCommand::Module(index) => {
            if controller.pick_module(index) {
                surface.print(&"Question ready below; edit it or press Enter.".bright_black().to_string());
            } else {
                surface.print(&format!("No module #{} (see !modules)", index + 1).yellow().to_string());
            }
        }
        ReplCommand::Session => {
            let current = controller.current_session().await;
            let status = controller.state().status.clone();
            surface.print_session(current.as_ref(), &status);
        }
        ReplCommand::History => {
            let session = controller.state().session_id.clone();
            surface.print_turns(&controller.turns(), session.as_deref());
        }
        ReplCommand::Sessions => {
            controller.show_history().await;
        }
        ReplCommand::Load(id) => {
            controller.load_session(&id).await;
        }
        ReplCommand::Delete(id) => {
            controller.delete_session(&id).await;
        }
        ReplCommand::Stats => {
            controller.show_statistics().await;
        }
        ReplCommand::Search(query) => {
            controller.search(&query, SEARCH_LIMIT).await;
        }
        ReplCommand::Export(format) => {
            let turns = controller.turns();
            if turns.is_empty() {
                surface.print(&"Nothing to export yet.".yellow().to_string());
                return Flow::Continue;
            }
            let session = controller
                .state()
                .session_id
                .clone()
                .unwrap_or_else(|| "current".to_string());
            match export_conversation(&turns, &session, format, export_dir) {
                Ok(path) => surface.print(&format!(
                    "{} Conversation exported to {}",
                    "💾".bright_green(),
                    path.display()
                )),
                Err(e) => surface.print(&format!("{} {:#}", "❌".bright_red(), e)),
            }
        }
        ReplCommand::Sources(on) => {
            let on = on.unwrap_or(!controller.options().include_sources);
            controller.set_include_sources(on);
            surface.print(&format!("Source citations: {}", on_off(on)));
        }
        ReplCommand::Context(on) => {
            let on = on.unwrap_or(!controller.options().include_conversation);
            controller.set_include_conversation(on);
            surface.print(&format!("Conversation context: {}", on_off(on)));
        }
        ReplCommand::Clear => {
            controller.clear_conversation().await;
        }
        ReplCommand::New => {
            controller.new_conversation().await;
        }
        ReplCommand::Quit => return Flow::Quit,
        ReplCommand::Ask(question) => {
            if controller.send_message(&question).await == SendOutcome::Answered {
                schedule_resync(controller.clone(), controller.config().resync_delay);
            }
        }
        ReplCommand::Invalid(message) => surface.print(&message.yellow().to_string()),
    }
    Flow::Continue
}

/// Interactive loop. Must run inside a `LocalSet`.
pub async fn run_repl<A, W>(
    controller: Rc<Controller<A, TerminalSurface<W>>>,
    export_dir: PathBuf,
) -> Result<()>
where
    A: RagApi + 'static,
    W: Write + 'static,
{
    let surface = controller.surface();
    surface.print(&format!(
        "{}",
        "🤖 RAG Chat - documentation assistant".bright_cyan().bold()
    ));
    surface.print(&format!(
        "{}",
        format!("Server: {}", controller.config().base_url).bright_black()
    ));

    controller.init().await;
    surface.print_welcome();

    let refresh = AutoRefresh::start(controller.clone(), controller.config().refresh_interval);
    let mut reader = LineReader::spawn()?;
    let prompt = format!("{} ", "You:".bright_green().bold());

    let result = loop {
        let initial = surface.take_pending_input();
        match reader.read(&prompt, initial).await {
            ReadEvent::Line(line) => {
                let Some(command) = parse_command(&line) else {
                    continue;
                };
                if let Flow::Quit = execute(&controller, command, &export_dir).await {
                    break Ok(());
                }
            }
            ReadEvent::Interrupted => {
                surface.print(&"(Use !quit to exit)".bright_black().to_string());
            }
            ReadEvent::Eof => break Ok(()),
            ReadEvent::Failed(e) => break Err(anyhow!("Input error: {}", e)),
        }
    };

    if let Some(refresh) = refresh {
        refresh.stop().await;
    }
    surface.print(&format!("{}", "Goodbye!".bright_cyan()));
    result
}
