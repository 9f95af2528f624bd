//! Upload progress banner.

use leptos::prelude::*;

use crate::app::AppContext;
use webfm::core::UploadProgress;
use webfm::utils::format::{format_rate, format_size};

stylance::import_crate_style!(css, "src/components/explorer/explorer.module.css");

/// One-line summary, e.g. `Uploading b.txt (2/3): 40% of 1.00 MB at 120 KB/s`.
fn progress_text(progress: &UploadProgress, rate: f64) -> String {
    format!(
        "Uploading {} ({}/{}): {:.0}% of {} at {}",
        progress.file_name,
        progress.index,
        progress.count,
        progress.percent(),
        format_size(Some(progress.total_bytes)),
        format_rate(rate)
    )
}

/// Banner shown while files upload. Hidden when no upload is running.
#[component]
pub fn UploadBanner() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    view! {
        {move || ctx.upload.get().map(|progress| {
            let width = format!("width: {:.1}%", progress.percent());
            view! {
                <div class=css::uploadBanner role="status">
                    <span class=css::uploadText>{progress_text(&progress, progress.rate())}</span>
                    <div class=css::uploadTrack>
                        <div class=css::uploadBar style=width></div>
                    </div>
                </div>
            }
        })}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_progress_text() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut progress = UploadProgress::starting_at("b.txt", 2, 3, 1024 * 1024, start);
        progress.advance(512 * 1024);
        assert_eq!(
            progress_text(&progress, 2048.0),
            "Uploading b.txt (2/3): 50% of 1.00 MB at 2.00 KB/s"
        );
    }
}
