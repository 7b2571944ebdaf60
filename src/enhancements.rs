use log::error;
use yew::prelude::*;

use crate::config::LandingConfig;
use crate::reveal::{self, RevealBinding};
use crate::timeline::dom::{self as timeline_dom, TimelineBinding};

#[derive(Properties, PartialEq)]
pub struct EnhancementsProps {
    pub config: LandingConfig,
}

#[derive(Default)]
struct Bindings {
    _timeline: Option<TimelineBinding>,
    _reveal: Option<RevealBinding>,
}

fn install(config: &LandingConfig) -> Bindings {
    let Some(window) = web_sys::window() else {
        return Bindings::default();
    };
    let Some(document) = window.document() else {
        return Bindings::default();
    };

    let timeline = timeline_dom::install(&window, &document, &config.timeline).unwrap_or_else(|e| {
        error!("Timeline setup failed: {:?}", e);
        None
    });
    let reveal = match reveal::install(&window, &document, &config.reveal, &config.counter) {
        Ok(binding) => Some(binding),
        Err(e) => {
            error!("Scroll reveal setup failed: {:?}", e);
            None
        }
    };

    Bindings {
        _timeline: timeline,
        _reveal: reveal,
    }
}

/// Attaches page behaviors to markup rendered elsewhere. Renders nothing.
#[function_component(Enhancements)]
pub fn enhancements(props: &EnhancementsProps) -> Html {
    use_effect_with_deps(
        move |config: &LandingConfig| {
            let bindings = install(config);
            move || drop(bindings)
        },
        props.config.clone(),
    );

    html! {}
}
