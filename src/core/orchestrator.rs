//! Directory loading: adapter fallback, capability probing, HEAD enrichment.

use futures::StreamExt;
use futures::stream;
use log::{debug, error, info, warn};

use crate::config::ENRICH_CONCURRENCY;
use crate::core::adapters::list_with;
use crate::core::capabilities::probe_capabilities;
use crate::core::error::{AdapterError, ListingError};
use crate::core::session::{Listing, SessionStore};
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::{DirectoryItem, ProtocolMode, StatusMessage};

/// Client for one origin: loads listings and performs mutations.
///
/// Holds no directory state of its own; that lives in a
/// [`DirectorySession`](crate::core::DirectorySession).
#[derive(Clone, Debug)]
pub struct FileManager<T> {
    transport: T,
    origin: String,
}

/// What happened to a [`FileManager::refresh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The listing was published with this many items.
    Published(usize),
    /// A newer load started meanwhile; the result was dropped.
    Superseded,
}

/// Metadata learned from a `HEAD` response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadInfo {
    pub size: Option<u64>,
    pub mtime: Option<String>,
}

impl<T: Transport> FileManager<T> {
    pub fn new(transport: T, origin: impl Into<String>) -> Self {
        Self {
            transport,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Origin without a trailing slash, e.g. `http://host:8080`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Walk [`ProtocolMode::FALLBACK_ORDER`] until one adapter lists `path`.
    pub async fn fetch_items(
        &self,
        path: &str,
    ) -> Result<(ProtocolMode, Vec<DirectoryItem>), ListingError> {
        let mut attempts: Vec<(ProtocolMode, AdapterError)> = Vec::new();

        for mode in ProtocolMode::FALLBACK_ORDER {
            debug!("listing {} via {}", path, mode);
            match list_with(mode, &self.transport, path, &self.origin).await {
                Ok(items) => return Ok((mode, items)),
                Err(e) => {
                    warn!("{} listing of {} failed: {}", mode, path, e);
                    attempts.push((mode, e));
                }
            }
        }

        let err = ListingError::AllAdaptersFailed {
            path: path.to_string(),
            attempts,
        };
        error!("{}", err);
        Err(err)
    }

    /// Full load of one directory, without touching any session.
    ///
    /// Capability probing and enrichment never fail the load.
    pub async fn fetch_listing(&self, path: &str) -> Result<Listing, ListingError> {
        let (mode, mut items) = self.fetch_items(path).await?;
        let capabilities = probe_capabilities(&self.transport, path).await;
        if mode.needs_enrichment() {
            self.enrich(&mut items).await;
        }
        info!("loaded {} ({} items via {})", path, items.len(), mode);
        Ok(Listing {
            items,
            mode,
            capabilities,
        })
    }

    /// Reload the session's current directory and publish the result.
    ///
    /// A load that was overtaken by a newer one leaves the session untouched.
    pub async fn refresh<S: SessionStore>(&self, session: &S) -> Result<LoadOutcome, ListingError> {
        let Some(ticket) = session.update_session(|s| s.begin_load()) else {
            return Ok(LoadOutcome::Superseded);
        };
        let result = self.fetch_listing(ticket.path()).await;

        match result {
            Ok(listing) => {
                let count = listing.items.len();
                let published = session
                    .update_session(|s| {
                        let published = s.publish(&ticket, listing);
                        if published {
                            s.set_status(StatusMessage::info(format!("Loaded {} items", count)));
                        }
                        published
                    })
                    .unwrap_or(false);
                if !published {
                    debug!("dropping stale listing of {}", ticket.path());
                    return Ok(LoadOutcome::Superseded);
                }
                Ok(LoadOutcome::Published(count))
            }
            Err(e) => {
                session.update_session(|s| {
                    if s.fail_load(&ticket) {
                        s.set_status(StatusMessage::error(e.to_string()));
                    }
                });
                Err(e)
            }
        }
    }

    // =========================================================================
    // Enrichment
    // =========================================================================

    /// Fill file sizes and mtimes from `HEAD`, at most
    /// [`ENRICH_CONCURRENCY`] requests at a time.
    ///
    /// Failed probes leave their item unchanged.
    pub async fn enrich(&self, items: &mut [DirectoryItem]) {
        let targets: Vec<(usize, String)> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_dir)
            .map(|(idx, item)| (idx, item.href.clone()))
            .collect();
        if targets.is_empty() {
            return;
        }

        let results: Vec<(usize, Option<HeadInfo>)> = stream::iter(targets)
            .map(|(idx, href)| async move { (idx, self.head(&href).await) })
            .buffer_unordered(ENRICH_CONCURRENCY)
            .collect()
            .await;

        for (idx, info) in results {
            let Some(info) = info else { continue };
            let item = &mut items[idx];
            if info.size.is_some() {
                item.size = info.size;
            }
            if info.mtime.is_some() {
                item.mtime = info.mtime;
            }
        }
    }

    /// `HEAD` one path. `None` on network error or non-2xx status.
    pub async fn head(&self, href: &str) -> Option<HeadInfo> {
        let response = match self.transport.send(HttpRequest::new(Method::Head, href)).await {
            Ok(r) if r.is_ok() => r,
            Ok(r) => {
                debug!("HEAD {} returned {}", href, r.status);
                return None;
            }
            Err(e) => {
                debug!("HEAD {} failed: {}", href, e);
                return None;
            }
        };

        Some(HeadInfo {
            size: response
                .header_value("Content-Length")
                .and_then(|v| v.trim().parse().ok()),
            mtime: response
                .header_value("Last-Modified")
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    use super::*;
    use crate::core::mock::{MockServer, Protocols};
    use crate::core::session::DirectorySession;
    use crate::models::StatusKind;

    const ORIGIN: &str = "http://mock.local";

    fn seeded(protocols: Protocols) -> MockServer {
        let server = MockServer::new(protocols);
        server.add_dir("/docs/");
        server.add_dir("/docs/sub/");
        server.add_file("/docs/b.txt", b"bravo".to_vec());
        server.add_file("/docs/a%20file.md", b"# alpha".to_vec());
        server
    }

    fn hrefs(items: &[DirectoryItem]) -> BTreeSet<String> {
        items.iter().map(|i| i.href.clone()).collect()
    }

    #[tokio::test]
    async fn test_json_first() {
        let fm = FileManager::new(seeded(Protocols::all()), ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();
        assert_eq!(listing.mode, ProtocolMode::Json);
        assert_eq!(listing.items.len(), 3);
        assert!(listing.capabilities.supports_put);
        // JSON has no PROPFIND attempt
        assert_eq!(fm.transport().count(Method::Propfind), 0);
    }

    #[tokio::test]
    async fn test_fallback_json_404_webdav_405_html() {
        let server = seeded(Protocols {
            json: false,
            webdav: false,
            html: true,
        });
        let fm = FileManager::new(server, ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();

        assert_eq!(listing.mode, ProtocolMode::HtmlIndex);
        let methods: Vec<Method> = fm
            .transport()
            .requests()
            .into_iter()
            .map(|(m, _)| m)
            .take(3)
            .collect();
        assert_eq!(methods, vec![Method::Get, Method::Propfind, Method::Get]);
        assert_eq!(
            hrefs(&listing.items),
            BTreeSet::from([
                "/docs/sub/".to_string(),
                "/docs/b.txt".to_string(),
                "/docs/a%20file.md".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_all_adapters_fail() {
        let server = seeded(Protocols::none());
        let fm = FileManager::new(server, ORIGIN);
        let err = fm.fetch_items("/docs/").await.unwrap_err();
        let ListingError::AllAdaptersFailed { path, attempts } = &err;
        assert_eq!(path, "/docs/");
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0], (ProtocolMode::Json, AdapterError::Http(404)));
        assert_eq!(attempts[1], (ProtocolMode::WebDav, AdapterError::Http(405)));
        assert_eq!(attempts[2].0, ProtocolMode::HtmlIndex);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_items() {
        let server = seeded(Protocols::all());
        let fm = FileManager::new(server, ORIGIN);
        let session = RefCell::new(DirectorySession::new(ORIGIN, "/docs/"));

        assert_eq!(fm.refresh(&session).await, Ok(LoadOutcome::Published(3)));
        assert_eq!(session.borrow().status().text, "Loaded 3 items");

        fm.transport().set_offline(true);
        assert!(fm.refresh(&session).await.is_err());
        let session = session.borrow();
        assert_eq!(session.items().len(), 3);
        assert!(!session.is_loading());
        assert!(session.status().text.starts_with("Could not list /docs/"));
    }

    #[tokio::test]
    async fn test_enrichment_fills_html_items() {
        let server = seeded(Protocols {
            json: false,
            webdav: false,
            html: true,
        });
        let fm = FileManager::new(server, ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();

        let b = listing.items.iter().find(|i| i.name == "b.txt").unwrap();
        assert_eq!(b.size, Some(5));
        assert!(b.mtime.as_deref().unwrap().ends_with("GMT"));
        let sub = listing.items.iter().find(|i| i.is_dir).unwrap();
        assert_eq!(sub.size, None);
        // One HEAD per file, none for the directory
        assert_eq!(fm.transport().count(Method::Head), 2);
    }

    #[tokio::test]
    async fn test_enrichment_failures_are_swallowed() {
        let server = seeded(Protocols {
            json: true,
            webdav: false,
            html: false,
        });
        server.fail(Method::Head, "/docs/b.txt", 500);
        let fm = FileManager::new(server, ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();

        // JSON already carried the size; the failed HEAD leaves it alone
        let b = listing.items.iter().find(|i| i.name == "b.txt").unwrap();
        assert_eq!(b.size, Some(5));
        assert_eq!(listing.items.len(), 3);
    }

    #[tokio::test]
    async fn test_webdav_skips_enrichment() {
        let server = seeded(Protocols {
            json: false,
            webdav: true,
            html: true,
        });
        let fm = FileManager::new(server, ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();
        assert_eq!(listing.mode, ProtocolMode::WebDav);
        assert!(listing.capabilities.is_webdav);
        assert_eq!(fm.transport().count(Method::Head), 0);
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        for protocols in [
            Protocols::all(),
            Protocols {
                json: false,
                webdav: true,
                html: false,
            },
            Protocols {
                json: false,
                webdav: false,
                html: true,
            },
        ] {
            let fm = FileManager::new(seeded(protocols), ORIGIN);
            let first = fm.fetch_listing("/docs/").await.unwrap();
            let second = fm.fetch_listing("/docs/").await.unwrap();
            assert_eq!(hrefs(&first.items), hrefs(&second.items));
        }
    }

    #[tokio::test]
    async fn test_probe_failure_closes_capabilities() {
        let server = seeded(Protocols::all());
        server.fail_network(Method::Options, "/docs/");
        let fm = FileManager::new(server, ORIGIN);
        let listing = fm.fetch_listing("/docs/").await.unwrap();
        assert_eq!(listing.capabilities, Default::default());
    }

    #[tokio::test]
    async fn test_older_refresh_finishing_last_is_dropped() {
        let server = seeded(Protocols::all());
        server.add_dir("/other/");
        server.add_file("/other/z.txt", b"z".to_vec());
        let release = server.hold(Method::Get, "/docs/");
        let fm = FileManager::new(server, ORIGIN);
        let session = RefCell::new(DirectorySession::new(ORIGIN, "/docs/"));

        // The /docs/ listing is held until /other/ has been published
        let older = fm.refresh(&session);
        let newer = async {
            session.borrow_mut().navigate("/other/");
            let outcome = fm.refresh(&session).await;
            let _ = release.send(());
            outcome
        };
        let (older, newer) = futures::join!(older, newer);

        assert_eq!(newer.unwrap(), LoadOutcome::Published(1));
        assert_eq!(older.unwrap(), LoadOutcome::Superseded);
        let session = session.borrow();
        assert_eq!(session.base_path(), "/other/");
        assert_eq!(
            hrefs(session.items()),
            BTreeSet::from(["/other/z.txt".to_string()])
        );
        assert_eq!(session.status().text, "Loaded 1 items");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_older_refresh_failing_last_keeps_newer_status() {
        let server = seeded(Protocols::all());
        server.add_dir("/other/");
        let release = server.hold(Method::Get, "/docs/");
        let fm = FileManager::new(server, ORIGIN);
        let session = RefCell::new(DirectorySession::new(ORIGIN, "/docs/"));

        let older = fm.refresh(&session);
        let newer = async {
            session.borrow_mut().navigate("/other/");
            let outcome = fm.refresh(&session).await;
            fm.transport().set_offline(true);
            let _ = release.send(());
            outcome
        };
        let (older, newer) = futures::join!(older, newer);

        assert_eq!(newer.unwrap(), LoadOutcome::Published(0));
        assert!(older.is_err());
        let session = session.borrow();
        assert_eq!(session.base_path(), "/other/");
        assert_eq!(session.status().kind, StatusKind::Info);
        assert_eq!(session.status().text, "Loaded 0 items");
    }
}
