//! Preview panel for text and image files.
//!
//! Text is fetched through the file manager (ranged for large files);
//! images are shown straight from their href. The header links to the raw
//! file and offers it as a download. Escape closes the panel.

use leptos::ev;
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use webfm::core::Preview;
use webfm::core::error::PreviewError;
use webfm::models::FileType;
use webfm::utils::format::format_size;

stylance::import_crate_style!(css, "src/components/explorer/preview.module.css");

/// Lines of `text` numbered from 1. A trailing newline does not start an
/// extra line.
fn numbered_lines(text: &str) -> Vec<(usize, &str)> {
    text.lines().enumerate().map(|(idx, line)| (idx + 1, line)).collect()
}

fn toggle_class(active: bool) -> String {
    if active {
        format!("{} {}", css::toggle, css::toggleActive)
    } else {
        css::toggle.to_string()
    }
}

#[component]
pub fn PreviewPanel() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let item = ctx.preview;
    let item_name = Signal::derive(move || item.with(|i| i.as_ref().map(|i| i.name.clone())));
    let item_href = Signal::derive(move || item.with(|i| i.as_ref().map(|i| i.href.clone())));
    let is_text = Signal::derive(move || {
        item.with(|i| i.as_ref().is_some_and(|i| i.file_type() != FileType::Image))
    });

    let line_numbers = RwSignal::new(false);
    let word_wrap = RwSignal::new(false);

    let content = LocalResource::new(move || {
        let target = item.get().filter(|i| i.file_type() != FileType::Image);
        let manager = ctx.manager();
        async move {
            let target = target?;
            Some(manager.fetch_preview(&target).await)
        }
    });

    let handle_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Escape" {
            ev.prevent_default();
            item.set(None);
        }
    };

    // Focus the panel on mount so Escape reaches it
    let panel_ref = NodeRef::<leptos::html::Aside>::new();
    Effect::new(move || {
        if let Some(el) = panel_ref.get() {
            let _ = el.focus();
        }
    });

    view! {
        <aside
            node_ref=panel_ref
            tabindex="-1"
            class=css::panel
            role="complementary"
            aria-label="File preview"
            on:keydown=handle_keydown
        >
            <header class=css::header>
                <span class=css::filename>{move || item_name.get().unwrap_or_default()}</span>
                <div class=css::headerActions>
                    <Show when=move || is_text.get()>
                        <button
                            class=move || toggle_class(line_numbers.get())
                            on:click=move |_| line_numbers.update(|on| *on = !*on)
                            aria-pressed=move || line_numbers.get()
                            title="Line numbers"
                        >
                            "#"
                        </button>
                        <button
                            class=move || toggle_class(word_wrap.get())
                            on:click=move |_| word_wrap.update(|on| *on = !*on)
                            aria-pressed=move || word_wrap.get()
                            title="Word wrap"
                        >
                            "Wrap"
                        </button>
                    </Show>
                    <a
                        class=css::headerButton
                        href=move || item_href.get().unwrap_or_default()
                        target="_blank"
                        rel="noopener"
                        title="Open raw"
                    >
                        <Icon icon=ic::EXTERNAL_LINK />
                    </a>
                    <a
                        class=css::headerButton
                        href=move || item_href.get().unwrap_or_default()
                        download=move || item_name.get().unwrap_or_default()
                        title="Download"
                    >
                        <Icon icon=ic::DOWNLOAD />
                    </a>
                    <button
                        class=css::headerButton
                        on:click=move |_| item.set(None)
                        title="Close preview (Esc)"
                        aria-label="Close preview panel"
                    >
                        <Icon icon=ic::CLOSE />
                    </button>
                </div>
            </header>

            <div class=css::content>
                {move || {
                    item.get().filter(|i| i.file_type() == FileType::Image).map(|i| view! {
                        <img class=css::imagePreview src=i.href.clone() alt=i.name.clone() />
                    })
                }}
                <Suspense fallback=move || view! { <div class=css::loading>"Loading..."</div> }>
                    {move || {
                        let numbered = line_numbers.get();
                        let wrap = word_wrap.get();
                        content
                            .get()
                            .flatten()
                            .map(|result| render_preview(result, numbered, wrap))
                    }}
                </Suspense>
            </div>
        </aside>
    }
}

fn render_preview(result: Result<Preview, PreviewError>, numbered: bool, wrap: bool) -> AnyView {
    match result {
        Ok(preview) => {
            let note = preview.truncated.then(|| {
                format!(
                    "Showing the first {} of {}",
                    format_size(Some(preview.bytes.len() as u64)),
                    format_size(preview.total_size)
                )
            });
            let text_class = if wrap {
                format!("{} {}", css::previewText, css::wrap)
            } else {
                css::previewText.to_string()
            };
            let text = preview.text();
            let body = if numbered {
                numbered_lines(&text)
                    .into_iter()
                    .map(|(number, line)| {
                        let line = if line.is_empty() { " " } else { line }.to_string();
                        view! {
                            <div class=css::lineRow>
                                <span class=css::lineNumber>{number}</span>
                                <span>{line}</span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            } else {
                text.into_any()
            };
            view! {
                <div>
                    {note.map(|n| view! { <p class=css::hint>{n}</p> })}
                    <pre class=text_class>{body}</pre>
                </div>
            }
            .into_any()
        }
        Err(err) => view! {
            <div class=css::error>
                <p class=css::hint>"Failed to load preview"</p>
                <p class=css::description>{err.to_string()}</p>
            </div>
        }
        .into_any(),
    }
}
