//! Plain-text helpers for post content and titles.

use deunicode::deunicode;
use regex::Regex;
use std::sync::LazyLock;

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[/?[A-Za-z][\w-]*(?:\s[^\]]*)?/?\]").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}[\p{L}'-]*").unwrap());

/// Content with shortcodes and markup removed, trimmed
pub fn plain_text(html: &str) -> String {
    let without_shortcodes = SHORTCODE_RE.replace_all(html, "");
    // Tags become spaces so adjacent paragraphs don't fuse into one word
    TAG_RE
        .replace_all(&without_shortcodes, " ")
        .trim()
        .to_string()
}

/// Number of words in post content.
///
/// A word is a run of letters that may contain apostrophes and hyphens;
/// numbers and punctuation don't count.
pub fn word_count(html: &str) -> usize {
    WORD_RE.find_iter(&plain_text(html)).count()
}

/// Decode named and numeric HTML entities (`&amp;`, `&#8217;`, ...)
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// URL slug from free text.
///
/// Letters are transliterated to ASCII first; other punctuation is dropped.
///
/// ```
/// use postanalyzer::text::slugify;
///
/// assert_eq!(slugify("Ten Tips for Better Photos!"), "ten-tips-for-better-photos");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// assert_eq!(slugify("Café au lait"), "cafe-au-lait");
/// ```
pub fn slugify(text: &str) -> String {
    deunicode(text)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() || c == '-' || c == '_' || c == '.' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
