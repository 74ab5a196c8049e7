// Theme support for the rendered preview.
//
// Provides a centralized palette (`ThemePalette`) with const WHITE and DARK
// variants, the matching syntect theme name for each mode, and the wrapper
// markup builder that surrounds rendered HTML with the themed container and
// the toggle control.

use std::fmt;
use std::str::FromStr;

/// Background theme of the rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    White,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::White => "white",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Theme::White),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

/// Centralized color palette for the preview wrapper.
///
/// Two const instances hold every color that changes between themes.
/// Rendering code calls `ThemePalette::current(theme)` for the active one.
pub struct ThemePalette {
    pub background: &'static str,
    pub text: &'static str,
    pub link: &'static str,
    pub code_bg: &'static str,
    pub code_text: &'static str,
    pub border: &'static str,
    pub blockquote_bar: &'static str,
    pub blockquote_text: &'static str,
}

impl ThemePalette {
    pub const WHITE: Self = Self {
        background: "#ffffff",
        text: "#24292e",
        link: "#0066cc",
        code_bg: "#f5f5f5",
        code_text: "#32324b",
        border: "#d2d2d2",
        blockquote_bar: "#ff6719",
        blockquote_text: "#282828",
    };

    pub const DARK: Self = Self {
        background: "#000000",
        text: "#dcdcdc",
        link: "#78beff",
        code_bg: "#1e1e1e",
        code_text: "#b4ffb4",
        border: "#3c3c3c",
        blockquote_bar: "#ff6719",
        blockquote_text: "#ffffff",
    };

    /// Returns the palette for the given theme.
    pub fn current(theme: Theme) -> &'static Self {
        match theme {
            Theme::White => &Self::WHITE,
            Theme::Dark => &Self::DARK,
        }
    }

    /// Returns the syntect theme name for the given mode.
    pub fn syntect_theme(theme: Theme) -> &'static str {
        match theme {
            Theme::White => "InspiredGitHub",
            Theme::Dark => "base16-ocean.dark",
        }
    }
}

/// Class of the outer wrapper element.
pub const WRAP_CLASS: &str = "mdpreview-wrap";
/// Class of the toggle control inside the wrapper.
pub const TOGGLE_CLASS: &str = "mdpreview-toggle";
/// Class of the element holding the rendered document.
pub const BODY_CLASS: &str = "mdpreview-body";

/// Builds the style block for the preview wrapper from the active palette.
pub fn css(theme: Theme) -> String {
    let p = ThemePalette::current(theme);
    format!(
        ".{WRAP_CLASS}{{background:{bg};color:{text};padding:16px;}}\
         .{WRAP_CLASS} a{{color:{link};}}\
         .{WRAP_CLASS} pre,.{WRAP_CLASS} code{{background:{code_bg};color:{code_text};\
border:1px solid {border};border-radius:3px;}}\
         .{WRAP_CLASS} blockquote{{border-left:4px solid {bar};color:{quote};\
margin-left:0;padding-left:12px;}}\
         .{TOGGLE_CLASS}{{float:right;cursor:pointer;}}\
         .{TOGGLE_CLASS}[disabled]{{cursor:wait;opacity:0.5;}}",
        bg = p.background,
        text = p.text,
        link = p.link,
        code_bg = p.code_bg,
        code_text = p.code_text,
        border = p.border,
        bar = p.blockquote_bar,
        quote = p.blockquote_text,
    )
}

/// Wraps rendered document HTML in the themed container together with the
/// toggle control markup.
pub fn wrap_rendered(html: &str, theme: Theme) -> String {
    format!(
        "<div class=\"{WRAP_CLASS}\"><style>{}</style>\
<button type=\"button\" class=\"{TOGGLE_CLASS}\">View raw</button>\
<div class=\"{BODY_CLASS}\">{html}</div></div>",
        css(theme)
    )
}
