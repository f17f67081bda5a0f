//! URL normalization so that different renditions of one upload compare equal.
//!
//! WordPress serves resized copies of an upload under names like
//! `photo-300x200.jpg`, often with a cache-busting query string. Two URLs
//! refer to the same source image when they agree on scheme, host and path
//! once those decorations are removed.

use regex::Regex;
use std::sync::LazyLock;

static URL_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:([A-Za-z][A-Za-z0-9+.\-]*)?:)?(?://([^/]*))?(.*)$").unwrap()
});

static RESIZE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+x\d+(\.[^./]+)$").unwrap());

/// Scheme, host and path of a URL. Absent segments are empty strings.
///
/// Segments are kept verbatim (no case folding) so that re-parsing a
/// normalized URL yields the same parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

impl UrlParts {
    /// Split a URL without ever failing. Query and fragment are dropped.
    pub fn parse(url: &str) -> Self {
        let trimmed = url.trim();
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();

        let Some(caps) = URL_PARTS_RE.captures(without_query) else {
            return Self {
                path: without_query.to_string(),
                ..Self::default()
            };
        };

        let segment = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Self {
            scheme: segment(1),
            host: segment(2),
            path: segment(3),
        }
    }

    /// Last path segment, empty when the path ends in `/`
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

/// Reduce a URL to `scheme://host/path` with any `-WxH` resize suffix removed.
///
/// Malformed input degrades to a best-effort form (e.g. `:///uploads/a.jpg`
/// for a root-relative path) rather than an error. Nested suffixes are
/// stripped until none remain so the result is a fixed point.
pub fn normalize(url: &str) -> String {
    let mut parts = UrlParts::parse(url);

    while let Some(stripped) = strip_resize_suffix(&parts.path) {
        parts.path = stripped;
    }

    format!("{}://{}{}", parts.scheme, parts.host, parts.path)
}

fn strip_resize_suffix(path: &str) -> Option<String> {
    if !RESIZE_SUFFIX_RE.is_match(path) {
        return None;
    }
    Some(RESIZE_SUFFIX_RE.replace(path, "$1").into_owned())
}

/// Whether two URLs point at the same source image
pub fn urls_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// File name component of a URL's path
pub fn filename_from_url(url: &str) -> String {
    UrlParts::parse(url).basename().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("https://s/x/photo-300x200.jpg", "https://s/x/photo.jpg" ; "resize suffix")]
    #[test_case("https://s/x/a.jpg?ver=2", "https://s/x/a.jpg" ; "query string")]
    #[test_case("https://s/x/a.jpg#top", "https://s/x/a.jpg" ; "fragment")]
    #[test_case("https://s/x/a-1024x768.png?resize=1", "https://s/x/a.png" ; "suffix and query")]
    #[test_case("https://Example.com/Uploads/A.jpg", "https://Example.com/Uploads/A.jpg" ; "case preserved")]
    #[test_case("http://s:8080/x/a-10x10.gif", "http://s:8080/x/a.gif" ; "port kept")]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_suffix_only_before_extension() {
        assert_eq!(
            normalize("https://s/2024-10x10/photo.jpg"),
            "https://s/2024-10x10/photo.jpg"
        );
        assert_eq!(
            normalize("https://s/x/photo-300x200-edited.jpg"),
            "https://s/x/photo-300x200-edited.jpg"
        );
    }

    #[test]
    fn test_degenerate_urls() {
        assert_eq!(normalize("/wp-content/uploads/a.jpg"), ":///wp-content/uploads/a.jpg");
        assert_eq!(normalize("//cdn.example.com/a.jpg"), "://cdn.example.com/a.jpg");
        assert_eq!(normalize(""), "://");
    }

    #[test]
    fn test_urls_match() {
        assert!(urls_match(
            "https://s/u/photo-150x150.jpg?x=1",
            "https://s/u/photo.jpg"
        ));
        assert!(!urls_match("https://s/u/photo.jpg", "https://s/u/other.jpg"));
        assert!(!urls_match("https://a/u/photo.jpg", "https://b/u/photo.jpg"));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("https://cdn.example.com/z.png?w=2"), "z.png");
        assert_eq!(filename_from_url("https://cdn.example.com/dir/"), "");
        assert_eq!(filename_from_url("picture.gif"), "picture.gif");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(url in ".{0,64}") {
            let once = normalize(&url);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_for_upload_urls(
            host in "[a-z]{1,8}\\.(com|org)",
            name in "[a-z0-9-]{1,12}",
            w in 1u32..4000,
            h in 1u32..4000,
            query in "(\\?[a-z]=[0-9]{1,3})?",
        ) {
            let url = format!("https://{host}/wp-content/uploads/{name}-{w}x{h}.jpg{query}");
            let once = normalize(&url);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.contains('?'));
        }
    }
}
