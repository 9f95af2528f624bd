//! In-memory backend implementing [`Transport`] for tests.
//!
//! Keeps a tree of percent-encoded paths and answers the JSON listing,
//! WebDAV and HTML-index protocols (each can be switched off), plus
//! `OPTIONS`, `HEAD`, `MKCOL`, `DELETE`, `MOVE`, `COPY`, `PUT` and ranged
//! `GET`. Faults can be injected per method and path, and single responses
//! can be held back to control the order in which concurrent requests finish.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use futures::channel::oneshot;
use quick_xml::escape::escape;
use url::Url;

use crate::config::{DEFAULT_CONTENT_TYPE, LIST_QUERY_PARAM};
use crate::core::error::FetchError;
use crate::core::transport::{Body, HttpRequest, HttpResponse, Method, Transport};
use crate::utils::format::format_http_date;
use crate::utils::path::{decode_segment, last_segment, parent_path};

const MOCK_ORIGIN: &str = "http://mock.local";
const EPOCH_START: i64 = 1_704_067_200;

/// Which listing protocols the mock answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Protocols {
    pub json: bool,
    pub webdav: bool,
    pub html: bool,
}

impl Protocols {
    pub fn all() -> Self {
        Self {
            json: true,
            webdav: true,
            html: true,
        }
    }

    pub fn none() -> Self {
        Self {
            json: false,
            webdav: false,
            html: false,
        }
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Dir {
        mtime: i64,
    },
    File {
        data: Vec<u8>,
        content_type: String,
        mtime: i64,
    },
}

impl Entry {
    fn mtime(&self) -> i64 {
        match self {
            Self::Dir { mtime } | Self::File { mtime, .. } => *mtime,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Fault {
    Status(u16),
    Network,
}

#[derive(Debug)]
struct State {
    entries: BTreeMap<String, Entry>,
    protocols: Protocols,
    allow: Option<String>,
    faults: HashMap<(Method, String), Fault>,
    holds: HashMap<(Method, String), oneshot::Receiver<()>>,
    offline: bool,
    requests: Vec<HttpRequest>,
    clock: i64,
}

/// Scriptable in-memory file server.
#[derive(Debug)]
pub struct MockServer {
    state: RefCell<State>,
}

impl MockServer {
    /// Empty server holding only `/`.
    pub fn new(protocols: Protocols) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("/".to_string(), Entry::Dir { mtime: EPOCH_START });
        Self {
            state: RefCell::new(State {
                entries,
                protocols,
                allow: None,
                faults: HashMap::new(),
                holds: HashMap::new(),
                offline: false,
                requests: Vec::new(),
                clock: EPOCH_START,
            }),
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Add a directory at the encoded `path` (a trailing `/` is implied).
    pub fn add_dir(&self, path: &str) {
        let path = dir_key(path);
        let mut state = self.state.borrow_mut();
        let mtime = state.tick();
        state.entries.insert(path, Entry::Dir { mtime });
    }

    /// Add or replace a file at the encoded `path`.
    pub fn add_file(&self, path: &str, data: Vec<u8>) {
        let content_type = guess_content_type(path).to_string();
        let mut state = self.state.borrow_mut();
        let mtime = state.tick();
        state.entries.insert(
            path.to_string(),
            Entry::File {
                data,
                content_type,
                mtime,
            },
        );
    }

    pub fn set_protocols(&self, protocols: Protocols) {
        self.state.borrow_mut().protocols = protocols;
    }

    /// Override the `Allow` header sent on `OPTIONS`.
    pub fn set_allow(&self, allow: &str) {
        self.state.borrow_mut().allow = Some(allow.to_string());
    }

    /// While offline every request fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// Answer `method` on `path` with `status` from now on.
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.state
            .borrow_mut()
            .faults
            .insert((method, path.to_string()), Fault::Status(status));
    }

    /// Fail `method` on `path` with a network error from now on.
    pub fn fail_network(&self, method: Method, path: &str) {
        self.state
            .borrow_mut()
            .faults
            .insert((method, path.to_string()), Fault::Network);
    }

    /// Hold back the next `method` request on `path` until the returned
    /// sender fires or is dropped.
    pub fn hold(&self, method: Method, path: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.state
            .borrow_mut()
            .holds
            .insert((method, path.to_string()), gate);
        release
    }

    pub fn clear_faults(&self) {
        self.state.borrow_mut().faults.clear();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Method and URL of every request received, in order.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state
            .borrow()
            .requests
            .iter()
            .map(|r| (r.method, r.url.clone()))
            .collect()
    }

    pub fn full_requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state.borrow().requests.last().cloned()
    }

    /// Number of requests received with `method`.
    pub fn count(&self, method: Method) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.borrow().entries.contains_key(path)
    }

    pub fn file_data(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.borrow().entries.get(path) {
            Some(Entry::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Encoded paths directly inside `dir`.
    pub fn children(&self, dir: &str) -> Vec<String> {
        self.state.borrow().children(&dir_key(dir))
    }
}

impl Transport for MockServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let (path, query) = split_url(&request.url);
        let gate = self
            .state
            .borrow_mut()
            .holds
            .remove(&(request.method, path.clone()));
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());
        if state.offline {
            return Err(FetchError::NetworkError("offline".to_string()));
        }

        match state.faults.get(&(request.method, path.clone())) {
            Some(Fault::Status(status)) => return Ok(HttpResponse::new(*status)),
            Some(Fault::Network) => {
                return Err(FetchError::NetworkError(format!(
                    "{} {} refused",
                    request.method, path
                )));
            }
            None => {}
        }

        Ok(match request.method {
            Method::Options => state.options(),
            Method::Get => state.get(&path, query.as_deref(), &request),
            Method::Head => state.head(&path),
            Method::Propfind => state.propfind(&path, &request),
            Method::Mkcol => state.mkcol(&path),
            Method::Delete => state.delete(&path),
            Method::Move => state.transfer(&path, &request, false),
            Method::Copy => state.transfer(&path, &request, true),
            Method::Put => state.put(&path, &request),
        })
    }
}

// =============================================================================
// Request handling
// =============================================================================

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 60;
        self.clock
    }

    fn children(&self, dir: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.len() > dir.len() && k.starts_with(dir))
            .filter(|k| !k[dir.len()..].trim_end_matches('/').contains('/'))
            .cloned()
            .collect()
    }

    fn options(&self) -> HttpResponse {
        let allow = self.allow.clone().unwrap_or_else(|| {
            if self.protocols.webdav {
                "OPTIONS, GET, HEAD, PUT, DELETE, PROPFIND, MKCOL, MOVE, COPY".to_string()
            } else {
                "OPTIONS, GET, HEAD, PUT, DELETE".to_string()
            }
        });
        let response = HttpResponse::new(200).header("Allow", allow);
        if self.protocols.webdav {
            response.header("DAV", "1, 2")
        } else {
            response
        }
    }

    fn get(&self, path: &str, query: Option<&str>, request: &HttpRequest) -> HttpResponse {
        let wants_json = query.is_some_and(|q| {
            q.split('&')
                .any(|pair| pair.split('=').next() == Some(LIST_QUERY_PARAM))
        });

        match self.entries.get(path) {
            Some(Entry::Dir { .. }) if wants_json && self.protocols.json => self.json_listing(path),
            Some(Entry::Dir { .. }) if !wants_json && self.protocols.html => self.html_index(path),
            Some(Entry::File {
                data,
                content_type,
                mtime,
            }) if !wants_json => {
                let (status, body) = match request.headers.get("Range").and_then(parse_range) {
                    Some((start, end)) if start < data.len() => {
                        let end = end.min(data.len().saturating_sub(1));
                        (206, data[start..=end].to_vec())
                    }
                    _ => (200, data.clone()),
                };
                HttpResponse::new(status)
                    .header("Content-Type", content_type.as_str())
                    .header("Content-Length", body.len().to_string())
                    .header("Last-Modified", http_date(*mtime))
                    .body(body)
            }
            _ => HttpResponse::new(404),
        }
    }

    fn head(&self, path: &str) -> HttpResponse {
        match self.entries.get(path) {
            Some(Entry::Dir { .. }) => HttpResponse::new(200),
            Some(Entry::File {
                data,
                content_type,
                mtime,
            }) => HttpResponse::new(200)
                .header("Content-Type", content_type.as_str())
                .header("Content-Length", data.len().to_string())
                .header("Last-Modified", http_date(*mtime)),
            None => HttpResponse::new(404),
        }
    }

    fn json_listing(&self, dir: &str) -> HttpResponse {
        let items: Vec<serde_json::Value> = self
            .children(dir)
            .iter()
            .filter_map(|key| {
                let entry = self.entries.get(key)?;
                let (is_dir, size) = match entry {
                    Entry::Dir { .. } => (true, None),
                    Entry::File { data, .. } => (false, Some(data.len())),
                };
                Some(serde_json::json!({
                    "name": decode_segment(last_segment(key)),
                    "isDir": is_dir,
                    "size": size,
                    "mtime": entry.mtime(),
                }))
            })
            .collect();
        HttpResponse::new(200)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({ "items": items }).to_string())
    }

    fn html_index(&self, dir: &str) -> HttpResponse {
        let mut html = format!(
            "<html><head><title>Index of {dir}</title></head><body>\n<h1>Index of {dir}</h1>\n\
             <table>\n<tr><th><a href=\"?C=N;O=D\">Name</a></th><th>Last modified</th><th>Size</th></tr>\n\
             <tr><td><a href=\"../\">Parent Directory</a></td><td></td><td>-</td></tr>\n"
        );
        for key in self.children(dir) {
            let Some(entry) = self.entries.get(&key) else {
                continue;
            };
            let slash = if key.ends_with('/') { "/" } else { "" };
            let segment = last_segment(&key);
            let name = decode_segment(segment);
            let size = match entry {
                Entry::Dir { .. } => "-".to_string(),
                Entry::File { data, .. } => data.len().to_string(),
            };
            html.push_str(&format!(
                "<tr><td><a href=\"{}{}\">{}{}</a></td><td>{}</td><td>{}</td></tr>\n",
                segment,
                slash,
                escape(name.as_str()),
                slash,
                http_date(entry.mtime()),
                size
            ));
        }
        html.push_str("</table>\n</body></html>\n");
        HttpResponse::new(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(html)
    }

    fn propfind(&self, path: &str, request: &HttpRequest) -> HttpResponse {
        if !self.protocols.webdav {
            return HttpResponse::new(405);
        }
        let Some(entry) = self.entries.get(path) else {
            return HttpResponse::new(404);
        };

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<D:multistatus xmlns:D=\"DAV:\">\n",
        );
        xml.push_str(&dav_response(path, entry));
        if matches!(entry, Entry::Dir { .. }) && request.headers.get("Depth") != Some("0") {
            for key in self.children(path) {
                if let Some(child) = self.entries.get(&key) {
                    xml.push_str(&dav_response(&key, child));
                }
            }
        }
        xml.push_str("</D:multistatus>\n");
        HttpResponse::new(207)
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(xml)
    }

    fn mkcol(&mut self, path: &str) -> HttpResponse {
        let path = dir_key(path);
        if self.entries.contains_key(&path) || self.entries.contains_key(path.trim_end_matches('/'))
        {
            return HttpResponse::new(405);
        }
        if !self.is_dir(&parent_path(&path)) {
            return HttpResponse::new(409);
        }
        let mtime = self.tick();
        self.entries.insert(path, Entry::Dir { mtime });
        HttpResponse::new(201)
    }

    fn delete(&mut self, path: &str) -> HttpResponse {
        if path == "/" || !self.entries.contains_key(path) {
            return HttpResponse::new(404);
        }
        self.remove_tree(path);
        HttpResponse::new(204)
    }

    fn transfer(&mut self, src: &str, request: &HttpRequest, is_copy: bool) -> HttpResponse {
        if src == "/" || !self.entries.contains_key(src) {
            return HttpResponse::new(404);
        }
        let Some(dest) = request.headers.get("Destination").map(|d| split_url(d).0) else {
            return HttpResponse::new(400);
        };
        if dest == src || (src.ends_with('/') && dest.starts_with(src)) {
            return HttpResponse::new(403);
        }
        let overwrite = request.headers.get("Overwrite") != Some("F");
        let existed = self.entries.contains_key(&dest);
        if existed && !overwrite {
            return HttpResponse::new(412);
        }
        if !self.is_dir(&parent_path(&dest)) {
            return HttpResponse::new(409);
        }

        let moved: Vec<(String, Entry)> = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() == src || (src.ends_with('/') && k.starts_with(src)))
            .map(|(k, v)| (format!("{}{}", dest, &k[src.len()..]), v.clone()))
            .collect();
        if existed {
            self.remove_tree(&dest);
        }
        if !is_copy {
            self.remove_tree(src);
        }
        self.entries.extend(moved);
        HttpResponse::new(if existed { 204 } else { 201 })
    }

    fn put(&mut self, path: &str, request: &HttpRequest) -> HttpResponse {
        if path.ends_with('/') || self.is_dir(path) {
            return HttpResponse::new(405);
        }
        if !self.is_dir(&parent_path(path)) {
            return HttpResponse::new(409);
        }
        let content_type = request
            .headers
            .get("Content-Type")
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let mtime = self.tick();
        let existed = self.entries.contains_key(path);
        self.entries.insert(
            path.to_string(),
            Entry::File {
                data: request
                    .body
                    .as_ref()
                    .and_then(Body::as_bytes)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
                content_type,
                mtime,
            },
        );
        HttpResponse::new(if existed { 204 } else { 201 })
    }

    fn is_dir(&self, path: &str) -> bool {
        matches!(self.entries.get(&dir_key(path)), Some(Entry::Dir { .. }))
    }

    fn remove_tree(&mut self, path: &str) {
        if path.ends_with('/') {
            self.entries.retain(|k, _| !k.starts_with(path));
        } else {
            self.entries.remove(path);
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn dir_key(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Path and query of a request URL, relative or absolute.
fn split_url(url: &str) -> (String, Option<String>) {
    match Url::parse(MOCK_ORIGIN).and_then(|base| base.join(url)) {
        Ok(parsed) => (parsed.path().to_string(), parsed.query().map(str::to_string)),
        Err(_) => (url.to_string(), None),
    }
}

/// `bytes=start-end` with both bounds present.
fn parse_range(header: &str) -> Option<(usize, usize)> {
    let (start, end) = header.trim().strip_prefix("bytes=")?.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

fn http_date(secs: i64) -> String {
    format_http_date(secs).unwrap_or_default()
}

fn guess_content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("txt") | Some("log") => "text/plain",
        Some("md") => "text/markdown",
        Some("png") => "image/png",
        Some("html") => "text/html",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

fn dav_response(href: &str, entry: &Entry) -> String {
    let name = decode_segment(last_segment(href));
    let (resource_type, length) = match entry {
        Entry::Dir { .. } => ("<D:collection/>".to_string(), String::new()),
        Entry::File { data, .. } => (
            String::new(),
            format!("<D:getcontentlength>{}</D:getcontentlength>", data.len()),
        ),
    };
    format!(
        "<D:response><D:href>{}</D:href><D:propstat><D:prop>\
         <D:displayname>{}</D:displayname>{}\
         <D:getlastmodified>{}</D:getlastmodified>\
         <D:resourcetype>{}</D:resourcetype>\
         </D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>\n",
        escape(href),
        escape(name.as_str()),
        length,
        http_date(entry.mtime()),
        resource_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn send(server: &MockServer, request: HttpRequest) -> HttpResponse {
        server.send(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_tree_operations() {
        let server = MockServer::new(Protocols::all());
        server.add_dir("/a/");
        server.add_file("/a/x.txt", b"x".to_vec());

        assert_eq!(send(&server, HttpRequest::new(Method::Mkcol, "/a/b/")).await.status, 201);
        assert_eq!(send(&server, HttpRequest::new(Method::Mkcol, "/a/b/")).await.status, 405);
        assert_eq!(send(&server, HttpRequest::new(Method::Mkcol, "/n/o/")).await.status, 409);

        let copy = HttpRequest::new(Method::Copy, "/a/")
            .header("Destination", "http://mock.local/c/")
            .header("Overwrite", "F");
        assert_eq!(send(&server, copy).await.status, 201);
        assert!(server.exists("/c/x.txt"));
        assert!(server.exists("/c/b/"));
        assert!(server.exists("/a/x.txt"));

        assert_eq!(send(&server, HttpRequest::new(Method::Delete, "/a/")).await.status, 204);
        assert!(!server.exists("/a/x.txt"));
        assert_eq!(server.children("/"), vec!["/c/"]);
    }

    #[tokio::test]
    async fn test_faults_and_log() {
        let server = MockServer::new(Protocols::none());
        server.fail(Method::Get, "/", 503);
        assert_eq!(send(&server, HttpRequest::new(Method::Get, "/")).await.status, 503);
        server.set_offline(true);
        assert!(server.send(HttpRequest::new(Method::Head, "/")).await.is_err());
        assert_eq!(server.count(Method::Get), 1);
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("bytes=0-99"), Some((0, 99)));
        assert_eq!(parse_range("bytes=5-"), None);
        assert_eq!(parse_range("items=0-1"), None);
    }
}
