//! Preview pipeline and controller.
//!
//! `PreviewController` drives the whole flow: URL match, container lookup,
//! classification, rendering, and the DOM swap, staged as separate tasks so
//! the host event loop gets control back between stages. It also routes
//! toggle requests through the re-entrancy guard, shows the processing
//! indicator when a run takes too long, and surfaces failures as
//! auto-dismissing notices instead of breaking the page.

use std::time::Duration;

use anyhow::Result;

use crate::classifier;
use crate::error::PreviewError;
use crate::host::{find_content_container, HostDocument, NodeId};
use crate::prefs::{PreferenceManager, SessionStore};
use crate::renderer::MarkdownRenderer;
use crate::scheduler::{Clock, Deadline, SystemClock, TaskQueue};
use crate::theme::{self, Theme};
use crate::url_matcher;
use crate::view_state::{ToggleOutcome, ViewController, ViewMode};

/// Timing knobs for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Delay before the processing indicator appears.
    pub indicator_delay: Duration,
    /// Upper bound after which a stuck indicator is force-hidden.
    pub indicator_max: Duration,
    /// Lifetime of a failure notice before it auto-dismisses.
    pub notice_lifetime: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            indicator_delay: Duration::from_millis(250),
            indicator_max: Duration::from_secs(10),
            notice_lifetime: Duration::from_secs(5),
        }
    }
}

/// Non-blocking, auto-dismissing failure notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    expires: Deadline,
}

impl Notice {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The URL is not a preview page; nothing was done.
    NotPreviewUrl,
    /// No usable content container on the page; nothing was done.
    NoContainer,
    /// Content did not classify as Markdown; page left as is.
    NotMarkdown,
    /// Rendering or the DOM swap failed; original content is intact.
    Failed,
    /// Rendered HTML was swapped into the page.
    Previewed,
    /// Rendered HTML was cached but the page stays raw, per the session
    /// view-mode preference.
    Prepared,
}

/// Result of one [`PreviewController::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A task ran; more may be queued.
    Pending,
    /// Nothing left to do.
    Settled,
}

/// One staged unit of pipeline work. Each task is a yield boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Classify,
    Render,
    Replace,
    CompleteToggle,
}

/// Owns every moving part of the preview engine for one page.
pub struct PreviewController {
    renderer: MarkdownRenderer,
    view: ViewController,
    prefs: PreferenceManager,
    clock: Box<dyn Clock>,
    config: PipelineConfig,
    queue: TaskQueue<Task>,
    container_id: Option<NodeId>,
    pending_text: Option<String>,
    pending_extension: Option<String>,
    pending_html: Option<String>,
    indicator_show_at: Option<Deadline>,
    indicator_hide_by: Option<Deadline>,
    indicator_shown: bool,
    notices: Vec<Notice>,
    last_outcome: Option<RunOutcome>,
    last_toggle: Option<ToggleOutcome>,
}

impl PreviewController {
    pub fn new(store: Box<dyn SessionStore>) -> Result<Self> {
        Self::with_clock(store, Box::new(SystemClock))
    }

    /// Builds a controller with an injected clock, used by tests to drive
    /// indicator and notice timing deterministically.
    pub fn with_clock(store: Box<dyn SessionStore>, clock: Box<dyn Clock>) -> Result<Self> {
        let prefs = PreferenceManager::load(store);
        let renderer = MarkdownRenderer::new(prefs.theme())?;
        Ok(Self {
            renderer,
            view: ViewController::new(),
            prefs,
            clock,
            config: PipelineConfig::default(),
            queue: TaskQueue::new(),
            container_id: None,
            pending_text: None,
            pending_extension: None,
            pending_html: None,
            indicator_show_at: None,
            indicator_hide_by: None,
            indicator_shown: false,
            notices: Vec::new(),
            last_outcome: None,
            last_toggle: None,
        })
    }

    pub fn prefs(&self) -> &PreferenceManager {
        &self.prefs
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    pub fn last_toggle(&self) -> Option<ToggleOutcome> {
        self.last_toggle
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_shown
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Whether the toggle control should accept input right now.
    pub fn toggle_enabled(&self) -> bool {
        !self.view.is_transition_in_flight()
    }

    /// Switches the preview theme and persists the preference. Rebuilds the
    /// renderer since the highlighter is theme-bound.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.prefs.set_theme(theme);
        self.renderer = MarkdownRenderer::new(theme)?;
        Ok(())
    }

    /// Renders markdown through the engine's fixed configuration. Empty or
    /// whitespace-only input yields a structured validation failure.
    pub fn process_markdown_content(&self, text: &str) -> Result<String, PreviewError> {
        self.renderer.render(text)
    }

    /// Stages a pipeline run for `url` against `doc`. Returns true when work
    /// was queued; on false the reason is in [`Self::last_outcome`].
    ///
    /// Safe to call again on the same page: the snapshot is only captured
    /// once, so a duplicate run re-renders but cannot lose the original.
    pub fn begin(&mut self, url: &str, doc: &mut dyn HostDocument) -> bool {
        // A staged toggle must settle before the queue is rebuilt; dropping
        // its task would leave the control disabled for the page lifetime.
        if self.view.is_transition_in_flight() {
            self.run_complete_toggle(doc);
        }
        self.queue.clear();
        self.pending_text = None;
        self.pending_extension = None;
        self.pending_html = None;

        if !url_matcher::is_preview_url(url) {
            self.last_outcome = Some(RunOutcome::NotPreviewUrl);
            return false;
        }
        let Some(id) = find_content_container(doc) else {
            log::info!("no content container found; leaving page untouched");
            self.last_outcome = Some(RunOutcome::NoContainer);
            return false;
        };
        let Some(container) = doc.container(id) else {
            self.last_outcome = Some(RunOutcome::NoContainer);
            return false;
        };

        self.container_id = Some(id);
        self.pending_text = Some(container.raw_text().to_string());
        self.pending_extension = url_matcher::file_extension(url);
        self.last_outcome = None;
        self.indicator_show_at = Some(Deadline::after(&*self.clock, self.config.indicator_delay));
        self.indicator_hide_by = Some(Deadline::after(&*self.clock, self.config.indicator_max));

        self.queue.push(Task::Classify);
        self.queue.push(Task::Render);
        self.queue.push(Task::Replace);
        true
    }

    /// Executes at most one queued task. Everything between two `step`
    /// calls is a yield point for the host event loop.
    pub fn step(&mut self, doc: &mut dyn HostDocument) -> StepOutcome {
        let Some(task) = self.queue.pop() else {
            return StepOutcome::Settled;
        };
        match task {
            Task::Classify => self.run_classify(),
            Task::Render => self.run_render(),
            Task::Replace => self.run_replace(doc),
            Task::CompleteToggle => self.run_complete_toggle(doc),
        }
        if self.last_outcome.is_some() && self.queue.is_empty() {
            self.clear_indicator();
        } else {
            self.update_indicator();
        }
        StepOutcome::Pending
    }

    pub fn run_until_idle(&mut self, doc: &mut dyn HostDocument) {
        while self.step(doc) == StepOutcome::Pending {}
    }

    /// Stages and drains a full pipeline run.
    pub fn run(&mut self, url: &str, doc: &mut dyn HostDocument) -> RunOutcome {
        if self.begin(url, doc) {
            self.run_until_idle(doc);
        }
        self.last_outcome.unwrap_or(RunOutcome::Failed)
    }

    /// Requests a view toggle. The swap itself runs as a scheduled task;
    /// until it completes the control is disabled and further requests
    /// return false.
    pub fn request_toggle(&mut self) -> bool {
        if !self.view.begin_transition() {
            return false;
        }
        self.last_toggle = None;
        self.queue.push(Task::CompleteToggle);
        true
    }

    /// Time-based housekeeping: indicator show/auto-hide and notice expiry.
    /// Called by the host on its own cadence.
    pub fn poll(&mut self) {
        self.update_indicator();
        let clock = &*self.clock;
        self.notices.retain(|notice| !notice.expires.expired(clock));
    }

    fn run_classify(&mut self) {
        let text = self.pending_text.clone().unwrap_or_default();
        let analysis = classifier::analyze(&text, self.pending_extension.as_deref());
        if !classifier::should_process(&analysis, &text) {
            log::debug!(
                "content not processed as markdown (confidence {:.2})",
                analysis.confidence
            );
            self.settle(RunOutcome::NotMarkdown);
        }
    }

    fn run_render(&mut self) {
        let text = self.pending_text.clone().unwrap_or_default();
        match self.renderer.render(&text) {
            Ok(html) => {
                self.pending_html = Some(theme::wrap_rendered(&html, self.prefs.theme()));
            }
            Err(err) => {
                log::warn!("markdown rendering failed: {err}");
                self.push_notice(format!("Markdown preview unavailable: {err}"));
                self.settle(RunOutcome::Failed);
            }
        }
    }

    fn run_replace(&mut self, doc: &mut dyn HostDocument) {
        let Some(html) = self.pending_html.clone() else {
            self.settle(RunOutcome::Failed);
            return;
        };
        let container = self.container_id.and_then(|id| doc.container(id));
        let Some(container) = container else {
            log::warn!("content container disappeared before replacement");
            self.push_notice("Markdown preview unavailable: content container is gone".into());
            self.settle(RunOutcome::Failed);
            return;
        };

        match self.prefs.view_mode() {
            ViewMode::Rendered => match self.view.activate(container, &html) {
                Ok(()) => self.settle(RunOutcome::Previewed),
                Err(err) => {
                    log::warn!("preview replacement failed: {err}");
                    self.push_notice(format!("Markdown preview unavailable: {err}"));
                    self.settle(RunOutcome::Failed);
                }
            },
            ViewMode::Raw => {
                // Session preference says raw: leave the page alone but keep
                // the rendered HTML ready for a toggle.
                self.view.ensure_snapshot(container);
                match self.view.cache_rendered(&html) {
                    Ok(()) => self.settle(RunOutcome::Prepared),
                    Err(err) => {
                        log::warn!("caching rendered content failed: {err}");
                        self.settle(RunOutcome::Failed);
                    }
                }
            }
        }
    }

    fn run_complete_toggle(&mut self, doc: &mut dyn HostDocument) {
        let container = self.container_id.and_then(|id| doc.container(id));
        let outcome = match container {
            Some(container) => match self.view.dispatch_toggle(container) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    log::warn!("view toggle failed: {err}");
                    self.push_notice(format!("Could not switch views: {err}"));
                    None
                }
            },
            None => {
                self.push_notice("Could not switch views: content container is gone".into());
                None
            }
        };
        if let Some(ToggleOutcome::Switched(mode)) = outcome {
            self.prefs.set_view_mode(mode);
        }
        self.last_toggle = outcome;
        self.view.finish_transition();
    }

    fn settle(&mut self, outcome: RunOutcome) {
        self.queue.clear();
        self.last_outcome = Some(outcome);
        self.clear_indicator();
    }

    fn clear_indicator(&mut self) {
        self.indicator_show_at = None;
        self.indicator_hide_by = None;
        self.indicator_shown = false;
    }

    fn update_indicator(&mut self) {
        if let Some(show_at) = self.indicator_show_at {
            if !self.indicator_shown && show_at.expired(&*self.clock) {
                self.indicator_shown = true;
            }
        }
        if let Some(hide_by) = self.indicator_hide_by {
            // Safeguard: even if later stages never call back, the
            // indicator cannot outlive the upper bound.
            if self.indicator_shown && hide_by.expired(&*self.clock) {
                self.clear_indicator();
            }
        }
    }

    fn push_notice(&mut self, message: String) {
        let expires = Deadline::after(&*self.clock, self.config.notice_lifetime);
        self.notices.push(Notice { message, expires });
    }
}
