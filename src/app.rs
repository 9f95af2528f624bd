//! Root application module.
//!
//! Contains the main App component, AppContext definition, and the glue
//! between browser history and the directory session.

use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::spawn_local;

use crate::components::explorer::Explorer;
use webfm::config::UPLOAD_PROGRESS_HIDE_MS;
use webfm::core::{
    DirectorySession, FileManager, ProgressObserver, SessionStore, UploadFile, UploadProgress,
};
use webfm::models::DirectoryItem;
use webfm::utils::FetchTransport;
use webfm::utils::dom::{location_origin, location_pathname, push_history};

// ============================================================================
// SessionSignal
// ============================================================================

/// Reactive handle to the directory session.
///
/// Every update notifies the views that read it. Updates after the owner is
/// disposed are dropped.
#[derive(Clone, Copy)]
pub struct SessionSignal(pub RwSignal<DirectorySession>);

impl SessionStore for SessionSignal {
    fn update_session<R>(&self, f: impl FnOnce(&mut DirectorySession) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

impl SessionSignal {
    /// Read the session without mutating it.
    pub fn with<R>(&self, f: impl FnOnce(&DirectorySession) -> R) -> R {
        self.0.with(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&DirectorySession) -> R) -> R {
        self.0.with_untracked(f)
    }

    pub fn update(&self, f: impl FnOnce(&mut DirectorySession)) {
        self.0.update(f);
    }
}

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// Provided at the root of the component tree and read with
/// `use_context::<AppContext>()`.
///
/// # Note
///
/// This struct is `Copy` because all fields are Leptos handles.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Current directory, items, selection and clipboard.
    pub session: SessionSignal,

    /// Upload in flight, `None` when the banner is hidden.
    pub upload: RwSignal<Option<UploadProgress>>,

    /// File shown in the preview pane.
    pub preview: RwSignal<Option<DirectoryItem>>,

    manager: StoredValue<FileManager<FetchTransport>>,
}

impl AppContext {
    /// Creates a context for the page's current location.
    pub fn new() -> Self {
        let origin = location_origin();
        let pathname = location_pathname();
        Self {
            session: SessionSignal(RwSignal::new(DirectorySession::new(
                origin.clone(),
                &pathname,
            ))),
            upload: RwSignal::new(None),
            preview: RwSignal::new(None),
            manager: StoredValue::new(FileManager::new(FetchTransport, origin)),
        }
    }

    pub fn manager(&self) -> FileManager<FetchTransport> {
        self.manager.get_value()
    }

    /// Reload the current directory.
    pub fn reload(&self) {
        let ctx = *self;
        spawn_local(async move {
            ctx.manager().reload(&ctx.session).await;
        });
    }

    /// Open directory `href` and record it in the browser history.
    pub fn navigate_to(&self, href: String) {
        let ctx = *self;
        ctx.preview.set(None);
        spawn_local(async move {
            ctx.manager()
                .open_dir_with(&ctx.session, &href, push_history)
                .await;
        });
    }

    /// Open the directory the browser location points at, without a new
    /// history entry. Used for back/forward.
    pub fn follow_location(&self) {
        let ctx = *self;
        ctx.preview.set(None);
        spawn_local(async move {
            ctx.manager()
                .open_dir(&ctx.session, &location_pathname())
                .await;
        });
    }

    pub fn new_folder(&self, name: String) {
        let ctx = *self;
        spawn_local(async move {
            ctx.manager().new_folder(&ctx.session, &name).await;
        });
    }

    pub fn rename(&self, href: String, new_name: String) {
        let ctx = *self;
        spawn_local(async move {
            ctx.manager()
                .rename_entry(&ctx.session, &href, &new_name)
                .await;
        });
    }

    pub fn delete_selected(&self) {
        let ctx = *self;
        ctx.preview.set(None);
        spawn_local(async move {
            ctx.manager().delete_selected(&ctx.session).await;
        });
    }

    pub fn paste(&self) {
        let ctx = *self;
        spawn_local(async move {
            ctx.manager().paste_here(&ctx.session).await;
        });
    }

    /// Upload `files`, showing progress until shortly after the last byte.
    pub fn upload_files(&self, files: Vec<UploadFile>) {
        let ctx = *self;
        let upload = ctx.upload;
        let observer: ProgressObserver = Rc::new(move |progress: &UploadProgress| {
            upload.set(Some(progress.clone()));
        });
        spawn_local(async move {
            let result = ctx
                .manager()
                .upload_here(&ctx.session, files, observer)
                .await;
            if result.is_ok() {
                TimeoutFuture::new(UPLOAD_PROGRESS_HIDE_MS).await;
            }
            upload.set(None);
        });
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Follows browser back/forward navigation
/// - Loads the initial directory
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    // Back/forward: reload whatever directory the location now points at
    let closure = Closure::wrap(Box::new(move || {
        ctx.follow_location();
    }) as Box<dyn Fn()>);
    if let Some(window) = web_sys::window() {
        let _ = window
            .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
    }
    // Keep the closure alive for the lifetime of the app
    closure.forget();

    ctx.reload();

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    font-family: system-ui, sans-serif;
                ">
                    <h1 style="color: #c0392b; margin-bottom: 1rem;">
                        "Something went wrong"
                    </h1>
                    <ul style="color: #c0392b; font-size: 0.9rem;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                        style="padding: 0.5rem 1.5rem; cursor: pointer;"
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <Explorer />
        </ErrorBoundary>
    }
}
