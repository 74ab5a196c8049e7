//! Syntax highlighting for fenced code blocks.
//!
//! Thin wrapper over syntect that never fails: unknown language hints and
//! highlighting errors fall back to HTML-escaped plain code. Highlighted
//! blocks are cached per (language, code) pair since syntect highlighting is
//! the most expensive step of rendering.

use std::cell::RefCell;

use anyhow::{ensure, Result};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::cache::{hash_str, LruCache};
use crate::theme::{Theme, ThemePalette};

const HIGHLIGHT_CACHE_CAPACITY: usize = 64;

/// Highlights code blocks to HTML using syntect, with a plain-code fallback.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: &'static str,
    cache: RefCell<LruCache<u64, String>>,
}

impl SyntaxHighlighter {
    /// Creates a highlighter for the given preview theme. Fails only when
    /// the bundled syntect defaults are missing the expected theme, which is
    /// a configuration error checked once at startup.
    pub fn new(theme: Theme) -> Result<Self> {
        let theme_set = ThemeSet::load_defaults();
        let theme_name = ThemePalette::syntect_theme(theme);
        ensure!(
            theme_set.themes.contains_key(theme_name),
            "syntect theme {theme_name:?} missing from bundled defaults"
        );
        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name,
            cache: RefCell::new(LruCache::new(HIGHLIGHT_CACHE_CAPACITY)),
        })
    }

    /// Highlights `code` to HTML markup. Never fails: missing syntaxes and
    /// highlighting errors fall back to escaped plain code.
    pub fn highlight(&self, code: &str, language_hint: Option<&str>) -> String {
        let hint = language_hint.unwrap_or("").trim();
        let key = hash_str(&format!("{hint}\u{0}{code}"));
        if let Some(cached) = self.cache.borrow_mut().get(&key) {
            return cached;
        }

        let html = self
            .try_highlight(code, hint)
            .unwrap_or_else(|| plain_code_block(code));
        self.cache.borrow_mut().insert(key, html.clone());
        html
    }

    fn try_highlight(&self, code: &str, hint: &str) -> Option<String> {
        if hint.is_empty() {
            return None;
        }
        let syntax = self.find_syntax(hint)?;
        let theme = self.theme_set.themes.get(self.theme_name)?;
        highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
    }

    /// Resolves a fence language hint to a syntect syntax, mapping common
    /// aliases to tokens syntect knows.
    fn find_syntax(&self, hint: &str) -> Option<&SyntaxReference> {
        let token = match hint.to_ascii_lowercase().as_str() {
            "rust" | "rs" => "rs",
            "javascript" | "js" | "node" => "js",
            "typescript" | "ts" => "ts",
            "python" | "py" => "py",
            "ruby" | "rb" => "rb",
            "shell" | "sh" | "bash" | "zsh" => "bash",
            "yaml" | "yml" => "yaml",
            "markdown" | "md" => "markdown",
            "c++" | "cpp" => "cpp",
            "c#" | "csharp" | "cs" => "cs",
            "objective-c" | "objc" => "objective-c",
            other => return self.syntax_set.find_syntax_by_token(other),
        };
        self.syntax_set.find_syntax_by_token(token)
    }
}

/// Escaped plain-code rendering used whenever highlighting is unavailable.
fn plain_code_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", escape_html(code))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
