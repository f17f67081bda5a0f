//! Pattern-based discovery of `<img>` tags in raw post HTML.

use regex::Regex;
use std::sync::LazyLock;

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img[^>]+>").unwrap());

// `src` must start an attribute so `data-src` placeholders are not picked up
static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|[\s"'/])src\s*=\s*["']([^"']*)["']"#).unwrap());

/// An image reference as written in content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageRef {
    pub src: String,
}

/// Lazily yields image references in document order.
///
/// A clone continues from the same position; call [`scan`] again to start
/// over. Duplicates are yielded as often as they occur.
#[derive(Debug, Clone)]
pub struct ImgTags<'h> {
    html: &'h str,
    pos: usize,
}

impl Iterator for ImgTags<'_> {
    type Item = RawImageRef;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.html.len() {
            let tag = IMG_TAG_RE.find_at(self.html, self.pos)?;
            self.pos = tag.end();

            if let Some(src) = extract_src(tag.as_str()) {
                return Some(RawImageRef { src });
            }
        }
        None
    }
}

/// Scan HTML for `<img>` tags carrying a non-empty `src`
pub fn scan(html: &str) -> ImgTags<'_> {
    ImgTags { html, pos: 0 }
}

/// First non-empty `src` attribute value in an HTML fragment
pub fn extract_src(fragment: &str) -> Option<String> {
    SRC_ATTR_RE
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srcs(html: &str) -> Vec<String> {
        scan(html).map(|r| r.src).collect()
    }

    #[test]
    fn test_scan_document_order() {
        let html = r#"<p>Intro</p><img src="https://s/a.jpg" alt="a"><p><IMG SRC='https://s/b.png'></p>"#;
        assert_eq!(srcs(html), vec!["https://s/a.jpg", "https://s/b.png"]);
    }

    #[test]
    fn test_scan_keeps_duplicates() {
        let html = r#"<img src="https://s/a.jpg"><img src="https://s/a.jpg">"#;
        assert_eq!(srcs(html).len(), 2);
    }

    #[test]
    fn test_scan_skips_tags_without_src() {
        let html = r#"<img alt="no source"><img src=""><img src="https://s/c.gif">"#;
        assert_eq!(srcs(html), vec!["https://s/c.gif"]);
    }

    #[test]
    fn test_scan_ignores_data_src() {
        let html = r#"<img data-src="https://s/lazy.jpg" src="https://s/real.jpg">"#;
        assert_eq!(srcs(html), vec!["https://s/real.jpg"]);
    }

    #[test]
    fn test_scan_is_restartable() {
        let html = r#"<img src="https://s/a.jpg"><img src="https://s/b.jpg">"#;
        let mut tags = scan(html);
        let fork = tags.clone();
        assert_eq!(tags.next().map(|r| r.src).as_deref(), Some("https://s/a.jpg"));
        assert_eq!(fork.count(), 2);
        assert_eq!(scan(html).count(), 2);
    }

    #[test]
    fn test_scan_without_images() {
        assert_eq!(srcs("<p>No pictures here</p>"), Vec::<String>::new());
        assert_eq!(srcs(""), Vec::<String>::new());
    }

    #[test]
    fn test_extract_src_from_figure() {
        let html = r#"<figure class="wp-block-image"><img src="https://s/a-300x200.jpg" class="wp-image-12"/></figure>"#;
        assert_eq!(extract_src(html).as_deref(), Some("https://s/a-300x200.jpg"));
        assert_eq!(extract_src("<figure></figure>"), None);
    }
}
