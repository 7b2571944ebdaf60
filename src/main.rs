use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

mod config;
mod counter;
mod enhancements;
mod reveal;
mod timeline {
    pub mod controller;
    pub mod dom;
}

use config::{LandingConfig, CONFIG_ATTRIBUTE, MOUNT_ID};
use enhancements::{Enhancements, EnhancementsProps};

// Falls back to a hidden host appended to <body> when the page has no
// dedicated mount element.
fn mount_root(document: &Document) -> Option<Element> {
    if let Some(root) = document.get_element_by_id(MOUNT_ID) {
        return Some(root);
    }
    let host = document.create_element("div").ok()?;
    host.set_id(MOUNT_ID);
    if let Some(host) = host.dyn_ref::<HtmlElement>() {
        host.set_hidden(true);
    }
    document.body()?.append_child(&host).ok()?;
    Some(host)
}

fn main() {
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level()).expect("error initializing log");

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Some(root) = mount_root(&document) else {
        log::error!("Could not find or create #{}", MOUNT_ID);
        return;
    };

    let config = LandingConfig::from_attribute(root.get_attribute(CONFIG_ATTRIBUTE).as_deref());
    info!("Landing enhancements loaded");
    yew::Renderer::<Enhancements>::with_root_and_props(root, EnhancementsProps { config }).render();
}
