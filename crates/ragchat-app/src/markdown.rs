//! Markdown answers rendered as styled terminal text.

use colored::{ColoredString, Colorize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Default)]
struct Renderer {
    out: String,
    bold: usize,
    italic: usize,
    strike: usize,
    heading: Option<HeadingLevel>,
    in_code_block: bool,
    quote_depth: usize,
    /// One entry per open list: `Some(next number)` for ordered lists.
    lists: Vec<Option<u64>>,
    link: Option<String>,
}

impl Renderer {
    fn style(&self, text: &str) -> ColoredString {
        let mut styled: ColoredString = text.normal();
        if self.heading.is_some() {
            styled = styled.bold().bright_cyan();
        }
        if self.bold > 0 {
            styled = styled.bold();
        }
        if self.italic > 0 {
            styled = styled.italic();
        }
        if self.strike > 0 {
            styled = styled.strikethrough();
        }
        if self.link.is_some() {
            styled = styled.underline().bright_blue();
        }
        styled
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn newline(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    /// End a block with exactly one blank line.
    fn block_break(&mut self) {
        self.newline();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn prefix(&mut self) {
        if self.at_line_start() && self.quote_depth > 0 {
            let bar = "│ ".repeat(self.quote_depth);
            self.out.push_str(&bar.bright_black().to_string());
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.prefix();
                self.out.push_str("    ");
                self.out.push_str(&line.green().to_string());
                self.out.push('\n');
            }
            return;
        }
        self.prefix();
        let styled = self.style(text).to_string();
        self.out.push_str(&styled);
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.block_break();
                self.heading = Some(level);
            }
            Tag::BlockQuote { .. } => {
                self.newline();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.newline();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.out
                            .push_str(&format!("    {}\n", lang.to_string().bright_black()));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.newline();
                self.lists.push(start);
            }
            Tag::Item => {
                self.newline();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}.", n);
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.prefix();
                self.out
                    .push_str(&format!("{}{} ", "  ".repeat(depth + 1), marker));
            }
            Tag::Emphasis => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.block_break();
                } else {
                    self.newline();
                }
            }
            TagEnd::Heading(_) => {
                self.heading = None;
                self.block_break();
            }
            TagEnd::BlockQuote { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.block_break();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.block_break();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_break();
                }
            }
            TagEnd::Item => self.newline(),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => {
                if let Some(url) = self.link.take() {
                    self.out
                        .push_str(&format!(" ({})", url).bright_black().to_string());
                }
            }
            _ => {}
        }
    }
}

/// Render Markdown for the terminal. Colors follow `colored`'s global
/// override, so output is plain when stdout is not a terminal.
pub fn render_terminal(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.push_text(&text),
            Event::Code(code) => {
                renderer.prefix();
                renderer.out.push_str(&code.yellow().to_string());
            }
            Event::Html(raw) | Event::InlineHtml(raw) => renderer.push_text(&raw),
            Event::SoftBreak => renderer.out.push(' '),
            Event::HardBreak => renderer.out.push('\n'),
            Event::Rule => {
                renderer.block_break();
                renderer
                    .out
                    .push_str(&"─".repeat(40).bright_black().to_string());
                renderer.block_break();
            }
            Event::TaskListMarker(done) => {
                renderer.out.push_str(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }
    renderer.out.trim_end().to_string()
}
