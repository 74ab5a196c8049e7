//! Markdown preview engine for raw file pages.
//!
//! This library classifies whether displayed file text is Markdown, renders
//! it to themed HTML with syntax-highlighted code blocks, and swaps it into
//! the page's content container with a toggle back to the original text.
//! The host page and session storage sit behind narrow traits, so the whole
//! pipeline runs against in-memory doubles in tests.

pub mod classifier;
pub mod error;
pub mod highlighter;
pub mod host;
pub mod pipeline;
pub mod prefs;
pub mod renderer;
pub mod scheduler;
pub mod theme;
pub mod url_matcher;
pub mod view_state;

pub(crate) mod cache;

pub use classifier::{analyze, is_markdown_extension, should_process, ContentAnalysis, FeatureTag};
pub use error::PreviewError;
pub use highlighter::SyntaxHighlighter;
pub use host::{find_content_container, ContentContainer, HostDocument, MemoryContainer, MemoryDocument};
pub use pipeline::{PipelineConfig, PreviewController, RunOutcome, StepOutcome};
pub use prefs::{MemoryStore, PreferenceManager, SessionStore};
pub use renderer::{MarkdownRenderer, RendererConfig};
pub use theme::{Theme, ThemePalette};
pub use url_matcher::is_preview_url;
pub use view_state::{ContentSnapshot, ToggleOutcome, ViewController, ViewMode};
