//! Session-scoped preference persistence.
//!
//! Two independent preferences, view mode and theme, live under fixed keys
//! in an ephemeral per-session store. Loads validate the stored string
//! against the enum and silently fall back to defaults; saves never
//! propagate storage failure — the manager logs a warning and keeps the
//! in-memory value, so a disabled store only costs persistence.

use std::collections::HashMap;

use crate::error::PreviewError;
use crate::theme::Theme;
use crate::view_state::ViewMode;

/// Session store key for the view-mode preference.
pub const VIEW_MODE_KEY: &str = "mdpreview_view";
/// Session store key for the theme preference.
pub const THEME_KEY: &str = "mdpreview_theme";

/// Default view mode when nothing valid is stored.
pub const DEFAULT_VIEW_MODE: ViewMode = ViewMode::Rendered;
/// Default theme when nothing valid is stored.
pub const DEFAULT_THEME: Theme = Theme::White;

/// Ephemeral per-session key-value store.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreviewError>;
}

/// Plain in-memory store; the default session store for tests and for
/// running with host storage disabled.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreviewError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads, holds, and persists the two session preferences.
pub struct PreferenceManager {
    store: Box<dyn SessionStore>,
    view_mode: ViewMode,
    theme: Theme,
}

impl PreferenceManager {
    /// Loads preferences from the store, validating each value against its
    /// enum. Missing or invalid values fall back to the defaults.
    pub fn load(store: Box<dyn SessionStore>) -> Self {
        let view_mode = store
            .get(VIEW_MODE_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_VIEW_MODE);
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_THEME);
        Self {
            store,
            view_mode,
            theme,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Updates the view mode and persists it. Storage failure degrades to
    /// in-memory only.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        if let Err(err) = self.store.set(VIEW_MODE_KEY, mode.as_str()) {
            log::warn!("view mode preference not persisted: {err}");
        }
    }

    /// Updates the theme and persists it. Storage failure degrades to
    /// in-memory only.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(err) = self.store.set(THEME_KEY, theme.as_str()) {
            log::warn!("theme preference not persisted: {err}");
        }
    }
}
