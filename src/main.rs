mod app;
mod components;

use app::App;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use webfm::config::LOG_LEVEL;
use webfm::utils::logger;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(LOG_LEVEL);

    let root = document()
        .get_element_by_id("app")
        .expect("Failed to find #app element")
        .unchecked_into::<web_sys::HtmlElement>();

    mount_to(root, App).forget();
}
