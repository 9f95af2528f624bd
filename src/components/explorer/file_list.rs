//! File list component for explorer view.
//!
//! Directories first, then files, each group by name. A row is selected with
//! its checkbox; clicking a name opens the directory or previews the file.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use webfm::models::DirectoryItem;
use webfm::utils::format::{format_date, format_size};
use webfm::utils::path::parent_path;

stylance::import_crate_style!(css, "src/components/explorer/file_list.module.css");

/// Size column text: formatted size, else whatever the index printed.
fn size_text(item: &DirectoryItem) -> String {
    if item.is_dir {
        return "-".to_string();
    }
    match (item.size, &item.size_raw) {
        (Some(size), _) => format_size(Some(size)),
        (None, Some(raw)) => raw.clone(),
        (None, None) => "-".to_string(),
    }
}

/// Modified column text, with the same fallback as [`size_text`].
fn date_text(item: &DirectoryItem) -> String {
    match (&item.mtime, &item.mtime_raw) {
        (Some(mtime), _) => format_date(Some(mtime)),
        (None, Some(raw)) => raw.clone(),
        (None, None) => "-".to_string(),
    }
}

/// Download target for a row; every file has one, directories none.
fn download_href(item: &DirectoryItem) -> Option<String> {
    (!item.is_dir).then(|| item.href.clone())
}

#[component]
pub fn FileList() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let session = ctx.session;

    let items = Signal::derive(move || session.with(|s| s.items().to_vec()));
    let base_path = Signal::derive(move || session.with(|s| s.base_path().to_string()));
    let is_loading = Signal::derive(move || session.with(|s| s.is_loading()));
    let all_selected = Signal::derive(move || {
        session.with(|s| !s.items().is_empty() && s.selection_len() == s.items().len())
    });

    let on_select_all = move |_: leptos::ev::Event| {
        session.update(|s| s.toggle_select_all());
    };
    let on_parent = move |_: leptos::ev::MouseEvent| {
        ctx.navigate_to(parent_path(&base_path.get_untracked()));
    };

    view! {
        <div class=css::list role="grid" aria-label="File list" aria-busy=move || is_loading.get()>
            <div class=css::listHeader role="row">
                <span class=css::headerCheck>
                    <input
                        type="checkbox"
                        title="Select all"
                        prop:checked=move || all_selected.get()
                        on:change=on_select_all
                    />
                </span>
                <span class=css::headerIcon></span>
                <span class=css::headerName>"Name"</span>
                <span class=css::headerDate>"Modified"</span>
                <span class=css::headerSize>"Size"</span>
                <span class=css::headerActions></span>
            </div>

            <Show when=move || base_path.get() != "/">
                <div class=css::listItem role="row">
                    <span class=css::check></span>
                    <span class=css::icon aria-hidden="true"><Icon icon=ic::FOLDER /></span>
                    <button class=format!("{} {}", css::name, css::nameDir) on:click=on_parent>
                        "../"
                    </button>
                    <span class=css::itemDate></span>
                    <span class=css::size></span>
                    <span class=css::actions></span>
                </div>
            </Show>

            <For
                each=move || items.get()
                key=|item| (item.href.clone(), item.size, item.mtime.clone())
                children=move |item| {
                    view! { <FileListItem item=item /> }
                }
            />

            <Show when=move || items.with(Vec::is_empty) && !is_loading.get()>
                <div class=css::empty>"This directory is empty"</div>
            </Show>
        </div>
    }
}

#[component]
fn FileListItem(item: DirectoryItem) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let session = ctx.session;

    let is_dir = item.is_dir;
    let file_type = item.file_type();
    let icon = ic::for_file_type(file_type);
    let size = size_text(&item);
    let modified = date_text(&item);
    let download = download_href(&item);
    let download_name = item.name.clone();
    let label = if is_dir {
        format!("{}/", item.name)
    } else {
        item.name.clone()
    };

    let href_for_selected = item.href.clone();
    let is_selected =
        Signal::derive(move || session.with(|s| s.is_selected(&href_for_selected)));
    let href_for_cut = item.href.clone();
    let is_cut = Signal::derive(move || session.with(|s| s.clipboard().is_cut(&href_for_cut)));

    let href_for_toggle = item.href.clone();
    let on_toggle = move |_: leptos::ev::Event| {
        session.update(|s| s.toggle_selection(&href_for_toggle));
    };

    let item_class = move || {
        let mut class = css::listItem.to_string();
        if is_selected.get() {
            class = format!("{} {}", class, css::selected);
        }
        if is_cut.get() {
            class = format!("{} {}", class, css::cut);
        }
        class
    };

    let name_view = if is_dir {
        let href = item.href.clone();
        view! {
            <button
                class=format!("{} {}", css::name, css::nameDir)
                on:click=move |_| ctx.navigate_to(href.clone())
            >
                {label}
            </button>
        }
        .into_any()
    } else if file_type.is_previewable() {
        let previewed = item.clone();
        view! {
            <button
                class=format!("{} {}", css::name, css::nameFile)
                on:click=move |_| ctx.preview.set(Some(previewed.clone()))
            >
                {label}
            </button>
        }
        .into_any()
    } else {
        view! {
            <a class=format!("{} {}", css::name, css::nameFile) href=item.href.clone() target="_blank">
                {label}
            </a>
        }
        .into_any()
    };

    view! {
        <div class=item_class role="row" aria-selected=move || is_selected.get()>
            <span class=css::check>
                <input
                    type="checkbox"
                    prop:checked=move || is_selected.get()
                    on:change=on_toggle
                />
            </span>
            <span class=css::icon aria-hidden="true"><Icon icon=icon /></span>
            {name_view}
            <span class=css::itemDate>{modified}</span>
            <span class=css::size>{size}</span>
            <span class=css::actions>
                {download.map(|href| view! {
                    <a
                        class=css::actionLink
                        href=href
                        download=download_name.clone()
                        title=format!("Download {}", download_name)
                    >
                        <Icon icon=ic::DOWNLOAD />
                    </a>
                })}
            </span>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_text_falls_back_to_raw() {
        let mut item = DirectoryItem::new("a.bin", false, "/a.bin");
        assert_eq!(size_text(&item), "-");
        item.size_raw = Some("1.2K".to_string());
        assert_eq!(size_text(&item), "1.2K");
        item.size = Some(2048);
        assert_eq!(size_text(&item), "2.00 KB");
    }

    #[test]
    fn test_date_text_falls_back_to_raw() {
        let mut item = DirectoryItem::new("a.bin", false, "/a.bin");
        item.mtime_raw = Some("02-Jan-2024 10:00".to_string());
        assert_eq!(date_text(&item), "02-Jan-2024 10:00");
        item.mtime = Some("Tue, 02 Jan 2024 10:00:00 GMT".to_string());
        assert_eq!(date_text(&item), "2024-01-02 10:00");
    }

    #[test]
    fn test_every_file_is_downloadable() {
        for name in ["notes.txt", "README.md", "photo.png", "archive.tar.gz"] {
            let href = format!("/pub/{}", name);
            let item = DirectoryItem::new(name, false, href.as_str());
            assert_eq!(download_href(&item), Some(href));
        }
        let dir = DirectoryItem::new("docs", true, "/pub/docs/");
        assert_eq!(download_href(&dir), None);
    }
}
