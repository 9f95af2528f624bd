//! Path bar component.
//!
//! Breadcrumbs for the current directory with clickable segments.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use webfm::utils::path::breadcrumbs;

stylance::import_crate_style!(css, "src/components/explorer/pathbar.module.css");

/// Path bar displayed above the file list.
#[component]
pub fn PathBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    view! {
        <nav class=css::pathbar aria-label="Current path">
            {move || {
                let crumbs = ctx.session.with(|s| breadcrumbs(s.base_path()));
                let last = crumbs.len().saturating_sub(1);

                crumbs
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (label, href))| {
                        let icon = if idx == 0 { ic::HOME } else { ic::FOLDER };
                        view! {
                            <>
                                {(idx > 0).then(|| view! {
                                    <span class=css::separator>
                                        <Icon icon=ic::CHEVRON_RIGHT />
                                    </span>
                                })}
                                {if idx == last {
                                    view! { <SegmentCurrent icon=icon label=label /> }.into_any()
                                } else {
                                    view! {
                                        <SegmentLink
                                            icon=icon
                                            label=label
                                            on_click=move || ctx.navigate_to(href.clone())
                                        />
                                    }.into_any()
                                }}
                            </>
                        }
                    })
                    .collect::<Vec<_>>()
            }}
        </nav>
    }
}

/// Clickable path segment.
#[component]
fn SegmentLink<F>(icon: icondata::Icon, label: String, on_click: F) -> impl IntoView
where
    F: Fn() + 'static,
{
    view! {
        <button
            class=css::segment
            on:click=move |_| on_click()
        >
            <span class=css::icon><Icon icon=icon /></span>
            <span class=css::label>{label}</span>
        </button>
    }
}

/// Current (disabled) path segment.
#[component]
fn SegmentCurrent(icon: icondata::Icon, label: String) -> impl IntoView {
    view! {
        <button class=format!("{} {}", css::segment, css::segmentCurrent) disabled=true>
            <span class=css::icon><Icon icon=icon /></span>
            <span class=css::label>{label}</span>
        </button>
    }
}
