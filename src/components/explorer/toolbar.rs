//! Explorer toolbar.
//!
//! Navigation on the left, current directory in the middle, and the write
//! actions on the right. Each write action is shown only when the server's
//! `OPTIONS` answer allows it.

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen::JsCast;

use crate::app::AppContext;
use crate::components::icons as ic;
use webfm::models::{ClipboardMode, StatusMessage};
use webfm::utils::dom::{collect_files, confirm, prompt};
use webfm::utils::path::{display_name, parent_path};

stylance::import_crate_style!(css, "src/components/explorer/explorer.module.css");

/// Explorer toolbar with navigation and actions.
#[component]
pub fn Toolbar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let base_path = Signal::derive(move || ctx.session.with(|s| s.base_path().to_string()));
    let is_root = Signal::derive(move || base_path.get() == "/");
    let title = Signal::derive(move || {
        let base = base_path.get();
        if base == "/" {
            "/".to_string()
        } else {
            display_name(&base)
        }
    });

    let on_up = move |_: leptos::ev::MouseEvent| {
        ctx.navigate_to(parent_path(&base_path.get_untracked()));
    };
    let on_reload = move |_: leptos::ev::MouseEvent| ctx.reload();

    view! {
        <header class=css::header>
            <div class=css::navButtons>
                <button
                    class=move || nav_button_class(is_root.get())
                    on:click=on_up
                    disabled=move || is_root.get()
                    title="Go to parent directory"
                >
                    <Icon icon=ic::ARROW_UP />
                </button>
                <button class=css::navButton on:click=on_reload title="Reload">
                    <Icon icon=ic::REFRESH />
                </button>
            </div>

            <div class=css::title>
                <span class=css::titleIcon><Icon icon=ic::FOLDER /></span>
                <span class=css::titleLabel>{move || title.get()}</span>
            </div>

            <ActionButtons />
        </header>
    }
}

fn nav_button_class(disabled: bool) -> String {
    if disabled {
        format!("{} {}", css::navButton, css::navButtonDisabled)
    } else {
        css::navButton.to_string()
    }
}

/// Write actions, gated by capabilities and selection.
#[component]
fn ActionButtons() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let session = ctx.session;

    let caps = Signal::derive(move || session.with(|s| s.capabilities()));
    let selected = Signal::derive(move || session.with(|s| s.selection_len()));
    let can_paste = Signal::derive(move || {
        session.with(|s| {
            if s.clipboard().is_empty() {
                return false;
            }
            match s.clipboard().mode {
                Some(ClipboardMode::Move) => s.capabilities().supports_move,
                Some(ClipboardMode::Copy) => s.capabilities().supports_copy,
                None => false,
            }
        })
    });
    let upload_input = NodeRef::<leptos::html::Input>::new();

    let on_new_folder = move |_: leptos::ev::MouseEvent| {
        if let Some(name) = prompt("New folder name", "") {
            ctx.new_folder(name);
        }
    };

    let on_upload_click = move |_: leptos::ev::MouseEvent| {
        if let Some(input) = upload_input.get() {
            input.click();
        }
    };

    let on_upload_change = move |ev: leptos::ev::Event| {
        let Some(target) = ev.target() else { return };
        let input = target.unchecked_into::<web_sys::HtmlInputElement>();
        let Some(list) = input.files() else { return };
        let files = collect_files(&list);
        input.set_value("");
        if !files.is_empty() {
            ctx.upload_files(files);
        }
    };

    let on_rename = move |_: leptos::ev::MouseEvent| {
        let Some(href) = session.with_untracked(|s| s.selected_hrefs().into_iter().next()) else {
            return;
        };
        let current = display_name(&href);
        if let Some(new_name) = prompt("Rename to", &current) {
            ctx.rename(href, new_name);
        }
    };

    let on_cut = move |_: leptos::ev::MouseEvent| {
        session.update(|s| {
            let count = s.cut_selection();
            s.set_status(StatusMessage::info(format!("{} item(s) cut", count)));
        });
    };

    let on_copy = move |_: leptos::ev::MouseEvent| {
        session.update(|s| {
            let count = s.copy_selection();
            s.set_status(StatusMessage::info(format!("{} item(s) copied", count)));
        });
    };

    let on_paste = move |_: leptos::ev::MouseEvent| ctx.paste();

    let on_delete = move |_: leptos::ev::MouseEvent| {
        let count = selected.get_untracked();
        if confirm(&format!("Delete {} item(s)?", count)) {
            ctx.delete_selected();
        }
    };

    view! {
        <div class=css::actionButtons>
            <Show when=move || caps.get().supports_mkcol>
                <button class=css::actionButton on:click=on_new_folder title="New folder">
                    <Icon icon=ic::FOLDER_PLUS />
                </button>
            </Show>

            <Show when=move || caps.get().supports_put>
                <button class=css::actionButton on:click=on_upload_click title="Upload files">
                    <Icon icon=ic::UPLOAD />
                </button>
            </Show>
            <input
                class=css::hiddenInput
                type="file"
                multiple=true
                node_ref=upload_input
                on:change=on_upload_change
            />

            <Show when=move || caps.get().supports_move>
                <button
                    class=css::actionButton
                    on:click=on_rename
                    disabled=move || selected.get() != 1
                    title="Rename"
                >
                    <Icon icon=ic::EDIT />
                </button>
                <button
                    class=css::actionButton
                    on:click=on_cut
                    disabled=move || selected.get() == 0
                    title="Cut"
                >
                    <Icon icon=ic::CUT />
                </button>
            </Show>

            <Show when=move || caps.get().supports_copy>
                <button
                    class=css::actionButton
                    on:click=on_copy
                    disabled=move || selected.get() == 0
                    title="Copy"
                >
                    <Icon icon=ic::COPY />
                </button>
            </Show>

            <Show when=move || caps.get().supports_move || caps.get().supports_copy>
                <button
                    class=css::actionButton
                    on:click=on_paste
                    disabled=move || !can_paste.get()
                    title="Paste"
                >
                    <Icon icon=ic::PASTE />
                </button>
            </Show>

            <Show when=move || caps.get().supports_delete>
                <button
                    class=format!("{} {}", css::actionButton, css::danger)
                    on:click=on_delete
                    disabled=move || selected.get() == 0
                    title="Delete"
                >
                    <Icon icon=ic::TRASH />
                </button>
            </Show>
        </div>
    }
}
