//! View state machine: original-content backup, rendered-HTML caching, and
//! the Raw/Rendered toggle protocol.
//!
//! The controller owns the one [`ContentSnapshot`] taken per page lifecycle
//! and guarantees the container always shows exactly what the current mode
//! dictates. Mutation failures roll the markup back so the page is never
//! left half-swapped.

use std::fmt;
use std::str::FromStr;

use crate::error::PreviewError;
use crate::host::ContentContainer;

/// Class added to the container while the rendered view is active.
pub const RENDERED_MARKER_CLASS: &str = "mdpreview-rendered";

/// Which content the container currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Raw,
    Rendered,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Raw => "raw",
            ViewMode::Rendered => "rendered",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(ViewMode::Raw),
            "rendered" => Ok(ViewMode::Rendered),
            _ => Err(()),
        }
    }
}

/// Exact pre-replacement state of the content container. Captured once,
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSnapshot {
    pub raw_html: String,
    pub raw_text: String,
    pub css_class: String,
    pub tag_name: String,
}

impl ContentSnapshot {
    pub fn capture(container: &dyn ContentContainer) -> Self {
        Self {
            raw_html: container.raw_html().to_string(),
            raw_text: container.raw_text().to_string(),
            css_class: container.css_class().to_string(),
            tag_name: container.tag_name().to_string(),
        }
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The view switched to the given mode.
    Switched(ViewMode),
    /// Raw view with no cached rendered HTML; nothing to switch to.
    NoRenderedContent,
    /// A transition is already in flight; the request was rejected.
    Busy,
}

/// Owns the snapshot, the cached rendered HTML, and the current view mode.
#[derive(Default)]
pub struct ViewController {
    snapshot: Option<ContentSnapshot>,
    rendered_html: Option<String>,
    mode: ViewMode,
    in_flight: bool,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn snapshot(&self) -> Option<&ContentSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn has_rendered_html(&self) -> bool {
        self.rendered_html.is_some()
    }

    pub fn is_transition_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Captures the container state if no snapshot exists yet. Safe to call
    /// repeatedly; only the first call captures.
    pub fn ensure_snapshot(&mut self, container: &dyn ContentContainer) {
        if self.snapshot.is_none() {
            self.snapshot = Some(ContentSnapshot::capture(container));
        }
    }

    /// Caches rendered HTML without touching the page, so a later toggle
    /// can switch to it. Rejects empty markup.
    pub fn cache_rendered(&mut self, rendered_html: &str) -> Result<(), PreviewError> {
        if rendered_html.trim().is_empty() {
            return Err(PreviewError::Validation("rendered HTML is empty".into()));
        }
        self.rendered_html = Some(rendered_html.to_string());
        Ok(())
    }

    /// Raw → Rendered: snapshots the container (if not yet done), swaps in
    /// the rendered markup, and adds the marker class.
    pub fn activate(
        &mut self,
        container: &mut dyn ContentContainer,
        rendered_html: &str,
    ) -> Result<(), PreviewError> {
        if rendered_html.trim().is_empty() {
            return Err(PreviewError::Validation("rendered HTML is empty".into()));
        }
        self.ensure_snapshot(container);
        let base_class = self
            .snapshot
            .as_ref()
            .map(|s| s.css_class.clone())
            .unwrap_or_default();
        let marked_class = if base_class.is_empty() {
            RENDERED_MARKER_CLASS.to_string()
        } else {
            format!("{base_class} {RENDERED_MARKER_CLASS}")
        };

        let previous_html = container.raw_html().to_string();
        container.set_html(rendered_html)?;
        if let Err(err) = container.set_css_class(&marked_class) {
            // The container must never stay half-swapped.
            let _ = container.set_html(&previous_html);
            return Err(err);
        }

        self.rendered_html = Some(rendered_html.to_string());
        self.mode = ViewMode::Rendered;
        Ok(())
    }

    /// Rendered → Raw: restores markup and class exactly from the snapshot.
    pub fn deactivate(&mut self, container: &mut dyn ContentContainer) -> Result<(), PreviewError> {
        let snapshot = self
            .snapshot
            .clone()
            .ok_or_else(|| PreviewError::Dom("no snapshot to restore".into()))?;

        let previous_html = container.raw_html().to_string();
        container.set_html(&snapshot.raw_html)?;
        if let Err(err) = container.set_css_class(&snapshot.css_class) {
            let _ = container.set_html(&previous_html);
            return Err(err);
        }

        self.mode = ViewMode::Raw;
        Ok(())
    }

    /// Switches between views. Rejected with [`ToggleOutcome::Busy`] while a
    /// staged transition is in flight.
    pub fn toggle(
        &mut self,
        container: &mut dyn ContentContainer,
    ) -> Result<ToggleOutcome, PreviewError> {
        if self.in_flight {
            return Ok(ToggleOutcome::Busy);
        }
        self.dispatch_toggle(container)
    }

    /// Marks a staged transition as started. Returns false if one is already
    /// in flight, which disables the toggle control for the caller.
    pub(crate) fn begin_transition(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub(crate) fn finish_transition(&mut self) {
        self.in_flight = false;
    }

    /// The actual toggle dispatch, used both directly and as the final task
    /// of a staged transition.
    pub(crate) fn dispatch_toggle(
        &mut self,
        container: &mut dyn ContentContainer,
    ) -> Result<ToggleOutcome, PreviewError> {
        match self.mode {
            ViewMode::Rendered => {
                self.deactivate(container)?;
                Ok(ToggleOutcome::Switched(ViewMode::Raw))
            }
            ViewMode::Raw => match self.rendered_html.clone() {
                Some(html) => {
                    self.activate(container, &html)?;
                    Ok(ToggleOutcome::Switched(ViewMode::Rendered))
                }
                None => Ok(ToggleOutcome::NoRenderedContent),
            },
        }
    }
}
