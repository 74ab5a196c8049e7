//! Markdown to HTML rendering.
//!
//! Wraps pulldown-cmark with a fixed option set and routes fenced code
//! blocks through the syntax highlighter. Output is an HTML string destined
//! for the host page; no sanitization is applied beyond what the engine
//! itself escapes.

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag};

use crate::error::PreviewError;
use crate::highlighter::SyntaxHighlighter;
use crate::theme::Theme;

/// Fixed option set for the markdown engine.
///
/// Defaults: hard line breaks on (single newlines become `<br>`), GitHub
/// flavored extensions on (tables, strikethrough, task lists), smart
/// punctuation off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    pub hard_breaks: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            tables: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
        }
    }
}

impl RendererConfig {
    fn options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}

/// Renders markdown text to an HTML string.
pub struct MarkdownRenderer {
    config: RendererConfig,
    highlighter: SyntaxHighlighter,
}

impl MarkdownRenderer {
    /// Creates a renderer with the fixed default configuration.
    pub fn new(theme: Theme) -> Result<Self> {
        Self::with_config(RendererConfig::default(), theme)
    }

    pub fn with_config(config: RendererConfig, theme: Theme) -> Result<Self> {
        Ok(Self {
            config,
            highlighter: SyntaxHighlighter::new(theme)?,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Converts `markdown` to HTML.
    ///
    /// Empty or whitespace-only input is a validation failure; an engine
    /// that produces no output for non-empty input is a parse failure. Both
    /// come back as structured [`PreviewError`] values, never panics.
    pub fn render(&self, markdown: &str) -> Result<String, PreviewError> {
        if markdown.trim().is_empty() {
            return Err(PreviewError::Validation(
                "cannot render empty content".into(),
            ));
        }

        let mut parser = Parser::new_ext(markdown, self.config.options());
        let mut events: Vec<Event> = Vec::new();
        while let Some(event) = parser.next() {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let hint = fence_language(&kind);
                    let code = collect_code_block(&mut parser);
                    let highlighted = self.highlighter.highlight(&code, hint.as_deref());
                    events.push(Event::Html(highlighted.into()));
                }
                Event::SoftBreak if self.config.hard_breaks => {
                    events.push(Event::HardBreak);
                }
                other => events.push(other),
            }
        }

        let mut output = String::new();
        html::push_html(&mut output, events.into_iter());
        if output.trim().is_empty() {
            return Err(PreviewError::Parse(
                "markdown engine produced no output".into(),
            ));
        }
        Ok(output)
    }
}

fn fence_language(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => {
            let lang = info.split_whitespace().next().unwrap_or("");
            (!lang.is_empty()).then(|| lang.to_string())
        }
        CodeBlockKind::Indented => None,
    }
}

/// Drains the event stream up to the matching code block end tag, returning
/// the block's text.
fn collect_code_block(parser: &mut Parser) -> String {
    let mut code = String::new();
    for event in parser.by_ref() {
        match event {
            Event::Text(text) => code.push_str(&text),
            Event::End(Tag::CodeBlock(_)) => break,
            _ => {}
        }
    }
    code
}
