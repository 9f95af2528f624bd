//! HTML directory index protocol: plain `GET` of the directory.
//!
//! Handles the two common index shapes: a `<table>` whose rows hold
//! name / date / size cells (Apache, lighttpd, most custom servers), and a
//! bare list of anchors (nginx `autoindex`, `python -m http.server`).

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::config::PARENT_DIR_MARKERS;
use crate::core::error::AdapterError;
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::{DirectoryItem, sort_items};
use crate::utils::path::{
    display_name, ensure_trailing_slash, is_same_origin, is_same_path, resolve_href,
};

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").expect("valid regex"));
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid regex"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]\s*>").expect("valid regex"));
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid regex"));
static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|nbsp|lt|gt|quot|apos|amp);").expect("valid regex")
});

/// Fetch and parse the HTML index of `base_path`.
pub async fn list_by_html_index<T: Transport>(
    transport: &T,
    base_path: &str,
    origin: &str,
) -> Result<Vec<DirectoryItem>, AdapterError> {
    let response = transport
        .send(HttpRequest::new(Method::Get, base_path))
        .await?;
    if !response.is_ok() {
        return Err(AdapterError::Http(response.status));
    }
    let content_type = response.header_value("Content-Type").unwrap_or_default();
    if !content_type.to_ascii_lowercase().contains("text/html") {
        return Err(AdapterError::NotHtml(content_type.to_string()));
    }
    let items = parse_html_index(&response.text(), base_path, origin);
    debug!("html index of {} returned {} items", base_path, items.len());
    Ok(items)
}

/// Extract items from an index page served at `base_path`.
///
/// Links outside `base_path`, parent links and self links are dropped;
/// duplicate hrefs keep their last occurrence.
pub fn parse_html_index(html: &str, base_path: &str, origin: &str) -> Vec<DirectoryItem> {
    let found = match TABLE.captures(html) {
        Some(table) => parse_table_rows(&table[1], base_path, origin),
        None => parse_anchors(html, base_path, origin),
    };

    let mut by_href: HashMap<String, DirectoryItem> = HashMap::new();
    for item in found {
        by_href.insert(item.href.clone(), item);
    }
    let mut items: Vec<DirectoryItem> = by_href.into_values().collect();
    sort_items(&mut items);
    items
}

/// Table layout: header row first, then name / date / size cells.
fn parse_table_rows(table: &str, base_path: &str, origin: &str) -> Vec<DirectoryItem> {
    let mut items = Vec::new();

    for row in ROW.captures_iter(table).skip(1) {
        let cells: Vec<&str> = CELL
            .captures_iter(&row[1])
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if cells.len() < 2 {
            continue;
        }
        let Some(link) = first_anchor(cells[0]) else {
            continue;
        };
        let Some(href) = accept_link(&link, base_path, origin) else {
            continue;
        };

        let is_dir = link.href.ends_with('/') || link.text.ends_with('/');
        let href = if is_dir {
            ensure_trailing_slash(&href)
        } else {
            href
        };

        let mut item = DirectoryItem::new(display_name(&href), is_dir, href);
        item.mtime_raw = cells.get(1).and_then(|c| cell_value(c));
        item.size_raw = cells.get(2).and_then(|c| cell_value(c));
        items.push(item);
    }

    items
}

/// Anchor-only layout: every link on the page is a candidate.
fn parse_anchors(html: &str, base_path: &str, origin: &str) -> Vec<DirectoryItem> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|caps| link_from_captures(&caps))
        .filter_map(|link| accept_link(&link, base_path, origin))
        .map(|href| {
            let is_dir = href.ends_with('/');
            DirectoryItem::new(display_name(&href), is_dir, href)
        })
        .collect()
}

/// An anchor's raw `href` attribute and visible text.
struct Link {
    href: String,
    text: String,
}

fn first_anchor(fragment: &str) -> Option<Link> {
    ANCHOR
        .captures(fragment)
        .and_then(|caps| link_from_captures(&caps))
}

fn link_from_captures(caps: &regex::Captures<'_>) -> Option<Link> {
    let attrs = caps.get(1)?.as_str();
    let href_caps = HREF_ATTR.captures(attrs)?;
    let raw = href_caps
        .get(1)
        .or_else(|| href_caps.get(2))
        .or_else(|| href_caps.get(3))?
        .as_str();
    let href = decode_entities(raw.trim());
    if href.is_empty() {
        return None;
    }
    let text = inner_text(caps.get(2).map_or("", |m| m.as_str()));
    Some(Link { href, text })
}

/// Resolve a link and apply the parent, origin, scope and self filters.
fn accept_link(link: &Link, base_path: &str, origin: &str) -> Option<String> {
    if PARENT_DIR_MARKERS.contains(&link.text.as_str())
        || PARENT_DIR_MARKERS.contains(&link.href.as_str())
    {
        return None;
    }
    if !is_same_origin(&link.href, origin) {
        return None;
    }
    let abs = resolve_href(&link.href, base_path, origin);
    if !abs.starts_with(base_path) || is_same_path(&abs, base_path) {
        return None;
    }
    Some(abs)
}

/// Cell text, with the `-` placeholder treated as absent.
fn cell_value(cell: &str) -> Option<String> {
    let text = inner_text(cell);
    if text.is_empty() || text == "-" {
        None
    } else {
        Some(text)
    }
}

fn inner_text(fragment: &str) -> String {
    decode_entities(TAG.replace_all(fragment, "").trim())
        .trim()
        .to_string()
}

/// Decode named and numeric character references in one pass.
///
/// References that do not name a valid character are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "nbsp" => Some(' '),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => numeric_reference(&name[1..]),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// `39` or `x27` into the character it names.
fn numeric_reference(digits: &str) -> Option<char> {
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://files.local";

    const APACHE_TABLE: &str = r#"<!DOCTYPE HTML>
<html><head><title>Index of /pub/</title></head><body>
<h1>Index of /pub/</h1>
<table>
  <tr><th><a href="?C=N;O=D">Name</a></th><th>Last modified</th><th>Size</th></tr>
  <tr><td><a href="/">Parent Directory</a></td><td>&nbsp;</td><td>-</td></tr>
  <tr><td><a href="../">..</a></td><td></td><td>-</td></tr>
  <tr><td><a href="src/">src/</a></td><td>2024-01-05 12:34</td><td>-</td></tr>
  <tr><td><a href="notes%20v2.txt">notes v2.txt</a></td><td>2024-01-06 08:00</td><td>1.2K</td></tr>
  <tr><td><a href="http://elsewhere.example/pub/x">x</a></td><td></td><td></td></tr>
  <tr><td><a href="/pub/build.log">build.log</a></td><td>2024-01-07 09:00</td><td>40</td></tr>
  <tr><td><a href="build.log">build.log (dup)</a></td><td>2024-01-08 10:00</td><td>41</td></tr>
  <tr><td>no link here</td><td>x</td></tr>
</table>
<a href="outside.txt">footer link ignored when a table exists</a>
</body></html>"#;

    #[test]
    fn test_parse_table_index() {
        let items = parse_html_index(APACHE_TABLE, "/pub/", ORIGIN);
        let hrefs: Vec<_> = items.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/pub/src/", "/pub/build.log", "/pub/notes%20v2.txt"]
        );

        let src = &items[0];
        assert!(src.is_dir);
        assert_eq!(src.name, "src");
        assert_eq!(src.mtime_raw.as_deref(), Some("2024-01-05 12:34"));
        assert_eq!(src.size_raw, None);

        // Duplicate href: last occurrence wins
        let log = &items[1];
        assert_eq!(log.mtime_raw.as_deref(), Some("2024-01-08 10:00"));
        assert_eq!(log.size_raw.as_deref(), Some("41"));

        let notes = &items[2];
        assert_eq!(notes.name, "notes v2.txt");
        assert!(!notes.is_dir);
        assert_eq!(notes.size, None);
    }

    #[test]
    fn test_parse_anchor_index() {
        let html = r#"<html><head><title>Index of /media/</title></head><body>
<h1>Index of /media/</h1><hr><pre><a href="../">../</a>
<a href="clips/">clips/</a>                                  05-Jan-2024 12:34       -
<a href='song.mp3'>song.mp3</a>                              06-Jan-2024 08:00    4096
<a href=cover.png>cover.png</a>
<a href="/">home</a>
</pre><hr></body></html>"#;
        let items = parse_html_index(html, "/media/", ORIGIN);
        let hrefs: Vec<_> = items.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/media/clips/", "/media/cover.png", "/media/song.mp3"]
        );
        assert!(items[0].is_dir);
        assert!(items.iter().all(|i| i.href.starts_with("/media/")));
    }

    #[test]
    fn test_sort_links_and_self_links_dropped() {
        let html = r#"<a href="?C=M;O=A">Last modified</a><a href="./">.</a><a href="a.txt">a.txt</a>"#;
        let items = parse_html_index(html, "/d/", ORIGIN);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].href, "/d/a.txt");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("it&#39;s &#x27;q&#X27; &#38; more"), "it's 'q' & more");
        assert_eq!(decode_entities("a&amp;lt;b"), "a&lt;b");
        assert_eq!(decode_entities("&#0; &#xD800; &bogus;"), "&#0; &#xD800; &bogus;");
    }

    #[test]
    fn test_anchor_with_numeric_entities() {
        let html = r#"<html><body>
<a href="../">../</a>
<a href="Bob&#39;s%20notes.txt">Bob&#x27;s notes.txt</a>
<a href="a&#38;b/">a&#38;b/</a>
</body></html>"#;
        let items = parse_html_index(html, "/pub/", ORIGIN);
        let hrefs: Vec<_> = items.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/pub/a&b/", "/pub/Bob's%20notes.txt"]);
    }
}
