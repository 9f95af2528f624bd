//! Main explorer component.
//!
//! ## Layout
//!
//! - **Desktop (> 768px)**: File list on the left, preview on the right
//! - **Mobile (< 768px)**: Single column, preview stacked below the list
//!
//! Files dropped anywhere on the explorer body are uploaded into the current
//! directory when the server accepts `PUT`.

use leptos::ev;
use leptos::prelude::*;

use super::{FileList, PathBar, PreviewPanel, Toolbar, UploadBanner};
use crate::app::AppContext;
use crate::components::status::StatusLine;
use webfm::utils::dom::collect_files;

stylance::import_crate_style!(css, "src/components/explorer/explorer.module.css");

/// `dropEffect` for a drag over the explorer.
fn drop_effect(supports_put: bool) -> &'static str {
    if supports_put {
        "copy"
    } else {
        "none"
    }
}

/// File explorer view component.
#[component]
pub fn Explorer() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let has_preview = Signal::derive(move || ctx.preview.with(Option::is_some));
    let can_upload =
        Signal::derive(move || ctx.session.with(|s| s.capabilities().supports_put));
    let dragging = RwSignal::new(false);

    let on_dragover = move |ev: ev::DragEvent| {
        // Without this the browser opens the dropped file itself
        ev.prevent_default();
        let allowed = can_upload.get_untracked();
        if let Some(transfer) = ev.data_transfer() {
            transfer.set_drop_effect(drop_effect(allowed));
        }
        if dragging.get_untracked() != allowed {
            dragging.set(allowed);
        }
    };
    let on_dragleave = move |_: ev::DragEvent| dragging.set(false);
    let on_drop = move |ev: ev::DragEvent| {
        ev.prevent_default();
        dragging.set(false);
        if !can_upload.get_untracked() {
            return;
        }
        let Some(list) = ev.data_transfer().and_then(|t| t.files()) else {
            return;
        };
        let files = collect_files(&list);
        if !files.is_empty() {
            ctx.upload_files(files);
        }
    };

    view! {
        <div class=css::explorer>
            <Toolbar />
            <PathBar />
            <UploadBanner />

            <div
                class=move || {
                    if dragging.get() {
                        format!("{} {}", css::body, css::dropActive)
                    } else {
                        css::body.to_string()
                    }
                }
                on:dragover=on_dragover
                on:dragleave=on_dragleave
                on:drop=on_drop
            >
                <div class=move || {
                    if has_preview.get() {
                        format!("{} {}", css::fileListPane, css::fileListPaneWithPreview)
                    } else {
                        css::fileListPane.to_string()
                    }
                }>
                    <FileList />
                </div>

                <Show when=move || has_preview.get()>
                    <PreviewPanel />
                </Show>
            </div>

            <StatusLine />
        </div>
    }
}
