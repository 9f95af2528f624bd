//! Path helpers shared by every listing protocol.
//!
//! Hrefs arrive relative, absolute, percent-encoded or not, with or without a
//! trailing slash. Everything past the adapters works on one canonical form:
//! an origin-rooted, percent-encoded path whose directories end with `/`.

use url::Url;

/// Join a directory path and a child name with exactly one `/` between them.
///
/// Does not percent-encode `name`.
pub fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Percent-encode a single path segment (`/` included).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encode every `/`-delimited segment of `path` independently.
///
/// Separators are preserved, reserved characters inside a segment are escaped.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode a percent-encoded segment, returning it unchanged if it is not
/// valid UTF-8 after decoding.
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Resolve `href` against `origin` and return only its path component.
///
/// Malformed input is returned unchanged.
pub fn normalize_href(href: &str, origin: &str) -> String {
    Url::parse(origin)
        .and_then(|base| base.join(href))
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve `href` as a link found on the page served at `base_path`.
///
/// Relative links resolve against the directory, absolute ones against the
/// origin. Malformed input is returned unchanged.
pub fn resolve_href(href: &str, base_path: &str, origin: &str) -> String {
    Url::parse(origin)
        .and_then(|root| root.join(base_path))
        .and_then(|page| page.join(href))
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Whether `href` points at `origin`. Relative hrefs always do.
pub fn is_same_origin(href: &str, origin: &str) -> bool {
    match (Url::parse(href), Url::parse(origin)) {
        (Ok(target), Ok(origin)) => target.origin() == origin.origin(),
        (Ok(_), Err(_)) => false,
        (Err(_), _) => true,
    }
}

/// Path equality that ignores a trailing slash.
pub fn is_same_path(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Append a trailing slash unless one is already present.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Last non-empty segment of a path, still encoded.
pub fn last_segment(path: &str) -> &str {
    path.split('/').rfind(|s| !s.is_empty()).unwrap_or("")
}

/// Decoded display name of the last segment of a path.
pub fn display_name(path: &str) -> String {
    decode_segment(last_segment(path))
}

/// Working directory for a location pathname.
///
/// A directory maps to itself; a file maps to its parent directory.
pub fn compute_base_path(pathname: &str) -> String {
    if pathname.ends_with('/') {
        return pathname.to_string();
    }
    match pathname.rfind('/') {
        Some(idx) => pathname[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Parent directory of a path (directories and files alike).
pub fn parent_path(path: &str) -> String {
    compute_base_path(path.trim_end_matches('/'))
}

/// Breadcrumb trail for a directory: `(label, href)` pairs from the root.
pub fn breadcrumbs(base_path: &str) -> Vec<(String, String)> {
    let mut crumbs = vec![("/".to_string(), "/".to_string())];
    let mut href = String::from("/");
    for segment in base_path.split('/').filter(|s| !s.is_empty()) {
        href.push_str(segment);
        href.push('/');
        crumbs.push((decode_segment(segment), href.clone()));
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://files.local:8080";

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/a", "b"), "/a/b");
        assert_eq!(join_path("/a/", "b"), "/a/b");
        assert_eq!(join_path("/", "b c"), "/b c");
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/a b/c#d"), "/a%20b/c%23d");
        assert_eq!(encode_path("/dir/"), "/dir/");
        assert_eq!(encode_path("/100%/x?y"), "/100%25/x%3Fy");
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("a%20b"), "a b");
        assert_eq!(decode_segment("%E4%BD%A0"), "你");
        // Invalid UTF-8 falls back to the raw text
        assert_eq!(decode_segment("%FF"), "%FF");
    }

    #[test]
    fn test_normalize_href() {
        assert_eq!(normalize_href("/a/b/", ORIGIN), "/a/b/");
        assert_eq!(
            normalize_href("http://files.local:8080/x%20y/z", ORIGIN),
            "/x%20y/z"
        );
        assert_eq!(normalize_href("/a b/", ORIGIN), "/a%20b/");
        // Unparsable origin: returned unchanged
        assert_eq!(normalize_href("/a/b", "not a url"), "/a/b");
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("file.txt", "/docs/", ORIGIN), "/docs/file.txt");
        assert_eq!(resolve_href("sub/", "/docs/", ORIGIN), "/docs/sub/");
        assert_eq!(resolve_href("/other/", "/docs/", ORIGIN), "/other/");
        assert_eq!(resolve_href("../", "/docs/", ORIGIN), "/");
    }

    #[test]
    fn test_is_same_origin() {
        assert!(is_same_origin("file.txt", ORIGIN));
        assert!(is_same_origin("/docs/", ORIGIN));
        assert!(is_same_origin("http://files.local:8080/docs/", ORIGIN));
        assert!(!is_same_origin("http://elsewhere.example/docs/", ORIGIN));
        assert!(!is_same_origin("https://files.local:8080/docs/", ORIGIN));
    }

    #[test]
    fn test_is_same_path() {
        assert!(is_same_path("/a/b", "/a/b/"));
        assert!(is_same_path("/a/b/", "/a/b"));
        assert!(!is_same_path("/a/b", "/a/c"));
        assert!(is_same_path("/", "/"));
    }

    #[test]
    fn test_compute_base_path() {
        assert_eq!(compute_base_path("/docs/"), "/docs/");
        assert_eq!(compute_base_path("/docs/index.html"), "/docs/");
        assert_eq!(compute_base_path("/index.html"), "/");
        assert_eq!(compute_base_path(""), "/");
    }

    #[test]
    fn test_parent_and_names() {
        assert_eq!(parent_path("/a/b/"), "/a/");
        assert_eq!(parent_path("/a/b.txt"), "/a/");
        assert_eq!(last_segment("/a/b%20c/"), "b%20c");
        assert_eq!(display_name("/a/b%20c/"), "b c");
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs("/a/b%20c/");
        assert_eq!(
            crumbs,
            vec![
                ("/".to_string(), "/".to_string()),
                ("a".to_string(), "/a/".to_string()),
                ("b c".to_string(), "/a/b%20c/".to_string()),
            ]
        );
    }
}
