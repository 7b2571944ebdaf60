use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::config::{CounterConfig, RevealConfig};
use crate::counter;

const VISIBLE_CLASS: &str = "visible";
const STAGGER_CHILD_CLASS: &str = "reveal-up";

/// `transition-delay` for the `index`-th child of a staggered grid.
pub fn stagger_delay(index: u32, step_ms: u32) -> String {
    format!("{}ms", index.saturating_mul(step_ms))
}

/// Dropping this stops observing every pending element.
pub struct RevealBinding {
    observer: IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Drop for RevealBinding {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn reveal(
    window: &Window,
    entry: &IntersectionObserverEntry,
    observer: &IntersectionObserver,
    counter_config: &CounterConfig,
) {
    if !entry.is_intersecting() {
        return;
    }
    let target = entry.target();
    if let Err(e) = target.class_list().add_1(VISIBLE_CLASS) {
        error!("Failed to reveal element: {:?}", e);
    }
    if target.has_attribute(counter::COUNT_ATTRIBUTE) {
        if let Err(e) = counter::animate(window, target.clone(), counter_config) {
            error!("Failed to start counter: {:?}", e);
        }
    }
    observer.unobserve(&target);
}

fn stagger_children(
    container: &Element,
    step_ms: u32,
    observer: &IntersectionObserver,
) -> Result<usize, JsValue> {
    let children = container.children();
    for index in 0..children.length() {
        let Some(child) = children.item(index) else {
            continue;
        };
        child.class_list().add_1(STAGGER_CHILD_CLASS)?;
        if let Some(child) = child.dyn_ref::<HtmlElement>() {
            child
                .style()
                .set_property("transition-delay", &stagger_delay(index, step_ms))?;
        }
        observer.observe(&child);
    }
    Ok(children.length() as usize)
}

/// Observes reveal targets and staggered grids. Each element is revealed
/// once, then forgotten by the observer.
pub fn install(
    window: &Window,
    document: &Document,
    config: &RevealConfig,
    counter_config: &CounterConfig,
) -> Result<RevealBinding, JsValue> {
    let on_intersect = {
        let window = window.clone();
        let counter_config = counter_config.clone();
        Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        reveal(&window, &entry, &observer, &counter_config);
                    }
                }
            },
        )
    };

    let options = IntersectionObserverInit::new();
    options.set_root_margin("0px");
    options.set_threshold(&JsValue::from_f64(config.threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    let binding = RevealBinding {
        observer,
        _on_intersect: on_intersect,
    };

    let targets = document.query_selector_all(&config.selector)?;
    for index in 0..targets.length() {
        if let Some(element) = targets.get(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            binding.observer.observe(&element);
        }
    }

    let grids = document.query_selector_all(&config.stagger_selector)?;
    let mut staggered = 0;
    for index in 0..grids.length() {
        if let Some(grid) = grids.get(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            staggered += stagger_children(&grid, config.stagger_delay_ms, &binding.observer)?;
        }
    }

    debug!(
        "Reveal observing {} elements and {} staggered children",
        targets.length(),
        staggered
    );
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_delay_grows_per_child() {
        assert_eq!(stagger_delay(0, 100), "0ms");
        assert_eq!(stagger_delay(3, 100), "300ms");
        assert_eq!(stagger_delay(2, 0), "0ms");
    }

    #[test]
    fn stagger_delay_saturates() {
        assert_eq!(stagger_delay(u32::MAX, 100), format!("{}ms", u32::MAX));
    }
}
