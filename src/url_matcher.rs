//! Activation predicate for the preview engine.
//!
//! The engine only runs on file pages of one fixed host. Matching is exact
//! host equality plus a fixed path prefix; anything unparseable is simply
//! not a preview URL.

use url::Url;

/// Host whose file pages the engine activates on.
pub const PREVIEW_HOST: &str = "files.slack.com";

/// Path prefix of raw file pages on the preview host.
pub const PREVIEW_PATH_PREFIX: &str = "/files-pri/";

/// Returns true iff `raw` parses as a URL whose host equals
/// [`PREVIEW_HOST`] and whose path starts with [`PREVIEW_PATH_PREFIX`].
/// Malformed URLs return false, never an error.
pub fn is_preview_url(raw: &str) -> bool {
    let Ok(parsed) = Url::parse(raw) else {
        return false;
    };
    match parsed.host_str() {
        Some(host) if host == PREVIEW_HOST => {}
        _ => return false,
    }
    parsed.path().starts_with(PREVIEW_PATH_PREFIX)
}

/// Extracts the lowercased file extension from a URL's final path segment.
/// Returns None for malformed URLs, extension-less paths, and dotfiles.
pub fn file_extension(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let segment = parsed.path_segments()?.next_back()?.to_string();
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_preview_host_and_prefix() {
        assert!(is_preview_url("https://files.slack.com/files-pri/T1-F1/x.md"));
        assert!(is_preview_url(
            "https://files.slack.com/files-pri/T024/F567/readme.markdown"
        ));
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(!is_preview_url("https://example.com/x.md"));
        assert!(!is_preview_url("https://slack.com/files-pri/T1-F1/x.md"));
        assert!(!is_preview_url(
            "https://files.slack.com.evil.net/files-pri/T1/x.md"
        ));
    }

    #[test]
    fn test_rejects_other_paths() {
        assert!(!is_preview_url("https://files.slack.com/avatars/x.png"));
        assert!(!is_preview_url("https://files.slack.com/files-pri"));
        assert!(!is_preview_url("https://files.slack.com/"));
    }

    #[test]
    fn test_malformed_urls_are_false_not_errors() {
        assert!(!is_preview_url(""));
        assert!(!is_preview_url("not a url"));
        assert!(!is_preview_url("://missing-scheme"));
        assert!(!is_preview_url("files.slack.com/files-pri/T1/x.md"));
    }

    #[test]
    fn test_file_extension_lowercases() {
        assert_eq!(
            file_extension("https://files.slack.com/files-pri/T1/Notes.MD"),
            Some("md".to_string())
        );
    }

    #[test]
    fn test_file_extension_missing() {
        assert_eq!(
            file_extension("https://files.slack.com/files-pri/T1/README"),
            None
        );
        assert_eq!(
            file_extension("https://files.slack.com/files-pri/T1/.gitignore"),
            None
        );
        assert_eq!(file_extension("garbage"), None);
    }
}
