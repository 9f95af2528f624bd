//! Status line component.
//!
//! Shows the outcome of the last action and which listing protocol the
//! current directory was read with.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use webfm::config::{APP_NAME, APP_VERSION};
use webfm::models::StatusKind;

stylance::import_crate_style!(css, "src/components/status/status.module.css");

#[component]
pub fn StatusLine() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");
    let session = ctx.session;

    let message_class = Signal::derive(move || {
        let kind = session.with(|s| s.status().kind);
        match kind {
            StatusKind::Info => css::message.to_string(),
            StatusKind::Success => format!("{} {}", css::message, css::success),
            StatusKind::Error => format!("{} {}", css::message, css::error),
        }
    });
    let message = Signal::derive(move || session.with(|s| s.status().text.clone()));
    let protocol = Signal::derive(move || {
        session.with(|s| {
            s.protocol_mode()
                .map(|mode| mode.to_string())
                .unwrap_or_else(|| "-".to_string())
        })
    });

    view! {
        <footer class=css::bar role="status">
            <span class=move || message_class.get()>
                {move || if session.with(|s| s.is_loading()) {
                    "Loading...".to_string()
                } else {
                    message.get()
                }}
            </span>
            <span class=css::label>
                <span class=css::labelIcon><Icon icon=ic::SERVER /></span>
                <span class=css::value>{move || protocol.get()}</span>
            </span>
            <span class=css::version>{format!("{} {}", APP_NAME, APP_VERSION)}</span>
        </footer>
    }
}
