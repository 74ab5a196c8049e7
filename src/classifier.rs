//! Heuristic Markdown content classifier.
//!
//! Pure functions mapping raw text to a [`ContentAnalysis`]: a fixed set of
//! independent feature detectors, a confidence score assembled from fixed
//! increments, and the decision policy that combines the score with the
//! file-extension signal. Nothing in here touches ambient state — the
//! extension is an explicit argument, so classifying the same input twice
//! always yields the same result.

use once_cell::sync::Lazy;
use regex::Regex;

/// Named Markdown syntax category detected in content.
///
/// Ordered so detected feature sets sort deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureTag {
    Header,
    List,
    FencedCode,
    InlineCode,
    Link,
    Emphasis,
    Blockquote,
    Rule,
    Table,
}

impl FeatureTag {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureTag::Header => "header",
            FeatureTag::List => "list",
            FeatureTag::FencedCode => "fenced_code",
            FeatureTag::InlineCode => "inline_code",
            FeatureTag::Link => "link",
            FeatureTag::Emphasis => "emphasis",
            FeatureTag::Blockquote => "blockquote",
            FeatureTag::Rule => "rule",
            FeatureTag::Table => "table",
        }
    }
}

/// Result of classifying one text blob. Immutable; recomputed per call and
/// never cached across distinct content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentAnalysis {
    pub is_markdown: bool,
    /// Score in [0, 1].
    pub confidence: f32,
    /// Detected features, sorted, no duplicates.
    pub features: Vec<FeatureTag>,
    /// Normalized (lowercased, trimmed) extension the caller passed in.
    pub extension: Option<String>,
}

impl ContentAnalysis {
    fn negative(extension: Option<String>) -> Self {
        Self {
            is_markdown: false,
            confidence: 0.0,
            features: Vec::new(),
            extension,
        }
    }
}

/// Score added per detected feature.
const FEATURE_INCREMENT: f32 = 0.15;
/// Bonus when the first non-blank line starts with a header marker.
const LEADING_HEADER_BONUS: f32 = 0.10;
/// Bonus when two or more distinct features are present.
const MULTI_FEATURE_BONUS: f32 = 0.10;
/// Confidence floor applied when the extension is on the allow-list.
const EXTENSION_CONFIDENCE_FLOOR: f32 = 0.7;

/// Classification threshold. Deliberately sensitive: a single detected
/// feature (0.15) is enough to classify as Markdown. The decision policy in
/// [`should_process`] applies the stricter tiers.
pub const MARKDOWN_THRESHOLD: f32 = 0.1;

/// Confidence tier above which the decision policy processes content
/// regardless of extension.
const DECISION_CONFIDENCE: f32 = 0.3;
/// Fraction of non-blank lines with Markdown syntax that triggers the
/// mixed-content fallback.
const MIXED_CONTENT_RATIO: f32 = 0.30;

/// Extensions treated as Markdown files.
const MARKDOWN_EXTENSIONS: [&str; 5] = ["md", "markdown", "mdown", "mkd", "mkdn"];

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^#{1,6}\s+\S").expect("header pattern")
});
static LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.)\s+\S").expect("list pattern")
});
static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:```|~~~)").expect("fenced code pattern")
});
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`[^`\n]+`").expect("inline code pattern")
});
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]\n]*\]\([^)\n]+\)").expect("link pattern")
});
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*[^*\n]+\*\*|__[^_\n]+__|\*[^*\n]+\*|_[^_\n]+_").expect("emphasis pattern")
});
static BLOCKQUOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*>\s?\S").expect("blockquote pattern")
});
static RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ {0,3}(?:-{3,}|\*{3,}|_{3,})[ \t]*$").expect("rule pattern")
});
static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\|.+\|[ \t]*$").expect("table pattern")
});
static LEADING_HEADER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,6}\s").expect("leading header pattern")
});

/// Detectors in the order their tags sort; keeps `features` sorted for free.
fn detectors() -> [(FeatureTag, &'static Regex); 9] {
    [
        (FeatureTag::Header, &HEADER_RE),
        (FeatureTag::List, &LIST_RE),
        (FeatureTag::FencedCode, &FENCED_CODE_RE),
        (FeatureTag::InlineCode, &INLINE_CODE_RE),
        (FeatureTag::Link, &LINK_RE),
        (FeatureTag::Emphasis, &EMPHASIS_RE),
        (FeatureTag::Blockquote, &BLOCKQUOTE_RE),
        (FeatureTag::Rule, &RULE_RE),
        (FeatureTag::Table, &TABLE_RE),
    ]
}

/// Classifies `text` as Markdown or not.
///
/// `extension` is the file extension of the page being viewed, passed in
/// explicitly so the classifier stays pure. Empty or whitespace-only text is
/// a definitive negative.
pub fn analyze(text: &str, extension: Option<&str>) -> ContentAnalysis {
    let ext = extension
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty());
    if text.trim().is_empty() {
        return ContentAnalysis::negative(ext);
    }

    let mut features = Vec::new();
    for (tag, re) in detectors() {
        if re.is_match(text) {
            features.push(tag);
        }
    }

    let mut confidence = features.len() as f32 * FEATURE_INCREMENT;
    if first_non_blank_line_is_header(text) {
        confidence += LEADING_HEADER_BONUS;
    }
    if features.len() >= 2 {
        confidence += MULTI_FEATURE_BONUS;
    }
    if ext.as_deref().is_some_and(is_markdown_extension) {
        confidence = confidence.max(EXTENSION_CONFIDENCE_FLOOR);
    }
    let confidence = confidence.clamp(0.0, 1.0);

    ContentAnalysis {
        is_markdown: confidence > MARKDOWN_THRESHOLD,
        confidence,
        features,
        extension: ext,
    }
}

/// Case-insensitive membership in the Markdown extension allow-list.
/// Accepts an optional leading dot; empty strings are false.
pub fn is_markdown_extension(ext: &str) -> bool {
    let normalized = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    MARKDOWN_EXTENSIONS.contains(&normalized.as_str())
}

/// Fraction of non-blank lines containing Markdown syntax. Returns 0.0 for
/// blank input.
pub fn markdown_line_ratio(text: &str) -> f32 {
    let mut non_blank = 0u32;
    let mut marked = 0u32;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        non_blank += 1;
        if line_has_markdown_syntax(line) {
            marked += 1;
        }
    }
    if non_blank == 0 {
        0.0
    } else {
        marked as f32 / non_blank as f32
    }
}

fn line_has_markdown_syntax(line: &str) -> bool {
    detectors().iter().any(|(_, re)| re.is_match(line))
}

/// Decision policy combining the confidence score with the extension signal.
///
/// Processes as Markdown when the extension is allow-listed, when confidence
/// clears the 0.3 tier, or when at least 30% of non-blank lines carry
/// Markdown syntax (mixed-content fallback).
pub fn should_process(analysis: &ContentAnalysis, text: &str) -> bool {
    if analysis.extension.as_deref().is_some_and(is_markdown_extension) {
        return true;
    }
    if analysis.confidence > DECISION_CONFIDENCE {
        return true;
    }
    markdown_line_ratio(text) >= MIXED_CONTENT_RATIO
}

fn first_non_blank_line_is_header(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| LEADING_HEADER_LINE_RE.is_match(line.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_header_and_list_sample() {
        let analysis = analyze("# Title\n\n- a\n- b", None);
        assert!(analysis.is_markdown);
        assert!(analysis.confidence >= 0.3);
        assert!(analysis.features.contains(&FeatureTag::Header));
        assert!(analysis.features.contains(&FeatureTag::List));
    }

    #[test]
    fn test_plain_text_is_negative() {
        let analysis = analyze("hello world, nothing special", None);
        assert!(!analysis.is_markdown);
        assert!(analysis.confidence <= 0.1);
        assert!(analysis.features.is_empty());
    }

    #[test]
    fn test_empty_and_blank_input() {
        for text in ["", "   ", "\n\n\t\n"] {
            let analysis = analyze(text, None);
            assert!(!analysis.is_markdown);
            assert_eq!(analysis.confidence, 0.0);
            assert!(analysis.features.is_empty());
        }
    }

    #[test]
    fn test_each_feature_detected() {
        let samples = [
            ("# Heading\n", FeatureTag::Header),
            ("- item one\n", FeatureTag::List),
            ("```rust\nfn x() {}\n```\n", FeatureTag::FencedCode),
            ("use `cargo build` here\n", FeatureTag::InlineCode),
            ("[docs](https://example.com)\n", FeatureTag::Link),
            ("some **bold** words\n", FeatureTag::Emphasis),
            ("> quoted text\n", FeatureTag::Blockquote),
            ("before\n\n---\n\nafter\n", FeatureTag::Rule),
            ("| a | b |\n", FeatureTag::Table),
        ];
        for (text, tag) in samples {
            let analysis = analyze(text, None);
            assert!(
                analysis.features.contains(&tag),
                "{tag:?} not found in {text:?} (got {:?})",
                analysis.features
            );
        }
    }

    #[test]
    fn test_features_are_sorted() {
        let text = "| t | t |\n\n> quote\n\n# Head\n\n- list\n";
        let analysis = analyze(text, None);
        let mut sorted = analysis.features.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(analysis.features, sorted);
    }

    #[test]
    fn test_leading_header_bonus() {
        // One feature each; the first starts with a header marker.
        let with_header = analyze("# Just a title", None);
        let without = analyze("just text with `code` inline", None);
        assert!(with_header.confidence > without.confidence);
    }

    #[test]
    fn test_extension_floors_confidence() {
        let analysis = analyze("plain words only", Some("md"));
        assert!(analysis.confidence >= 0.7);
        assert!(analysis.is_markdown);
        assert_eq!(analysis.extension.as_deref(), Some("md"));
    }

    #[test]
    fn test_extension_floor_does_not_lower_high_scores() {
        let rich = "# T\n\n- a\n\n```\nx\n```\n\n[l](u)\n\n**b**\n\n> q\n";
        let plain = analyze(rich, None);
        let with_ext = analyze(rich, Some("md"));
        assert!(with_ext.confidence >= plain.confidence);
    }

    #[test]
    fn test_idempotent_analysis() {
        let text = "# Title\n\nSome *emphasis* and a [link](x).\n";
        let first = analyze(text, Some("md"));
        let second = analyze(text, Some("md"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_markdown_extension_allow_list() {
        assert!(is_markdown_extension("md"));
        assert!(is_markdown_extension("MD"));
        assert!(is_markdown_extension("markdown"));
        assert!(is_markdown_extension("mdown"));
        assert!(is_markdown_extension("mkd"));
        assert!(is_markdown_extension("mkdn"));
        assert!(is_markdown_extension(".md"));
    }

    #[test]
    fn test_is_markdown_extension_rejects_others() {
        for ext in ["txt", "js", "html", "css", "", "  ", "mdx"] {
            assert!(!is_markdown_extension(ext), "{ext:?} should be rejected");
        }
    }

    #[test]
    fn test_markdown_line_ratio() {
        assert_eq!(markdown_line_ratio(""), 0.0);
        assert_eq!(markdown_line_ratio("plain\nwords\n"), 0.0);
        // 2 of 4 non-blank lines carry syntax.
        let mixed = "# head\nplain\n- item\nmore plain\n";
        let ratio = markdown_line_ratio(mixed);
        assert!((ratio - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_should_process_extension_wins() {
        let text = "no markdown here at all";
        let analysis = analyze(text, Some("markdown"));
        assert!(should_process(&analysis, text));
    }

    #[test]
    fn test_should_process_confidence_tier() {
        let text = "# Title\n\n- a\n- b";
        let analysis = analyze(text, None);
        assert!(should_process(&analysis, text));
    }

    #[test]
    fn test_should_process_rejects_plain_text() {
        let text = "hello world\nnothing special\nat all\n";
        let analysis = analyze(text, Some("txt"));
        assert!(!should_process(&analysis, text));
    }

    #[test]
    fn test_should_process_mixed_content_fallback() {
        // Single feature keeps whole-document confidence at the 0.3 tier or
        // below, but every non-blank line is a list item.
        let text = "- one\n- two\n- three\n";
        let analysis = analyze(text, None);
        assert!(markdown_line_ratio(text) >= 0.30);
        assert!(should_process(&analysis, text));
    }

    proptest! {
        #[test]
        fn prop_analysis_is_idempotent(text in ".{0,400}", ext in proptest::option::of("[a-zA-Z]{0,8}")) {
            let first = analyze(&text, ext.as_deref());
            let second = analyze(&text, ext.as_deref());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_confidence_is_clamped(text in ".{0,400}") {
            let analysis = analyze(&text, None);
            prop_assert!((0.0..=1.0).contains(&analysis.confidence));
        }

        #[test]
        fn prop_adding_a_feature_never_lowers_confidence(text in "[a-z ]{1,80}") {
            // Appending a header line to arbitrary plain text adds a
            // detectable feature; confidence must not decrease.
            let base = analyze(&text, None);
            let extended = format!("{text}\n# appended heading\n");
            let more = analyze(&extended, None);
            prop_assert!(more.confidence >= base.confidence);
        }
    }
}
