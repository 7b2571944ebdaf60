use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, HtmlElement, Window};

use super::controller::{
    ProgressView, TimelineController, TimelineEvent, TimelineGeometry, TimelineSettings,
};
use crate::config::TimelineConfig;

const ACTIVE_CLASS: &str = "active";

/// Reads layout from the live page each time it is asked.
pub struct DomGeometry {
    window: Window,
    timeline: HtmlElement,
    items: Vec<HtmlElement>,
}

impl TimelineGeometry for DomGeometry {
    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn timeline_top(&self) -> f64 {
        self.timeline.get_bounding_client_rect().top()
    }

    fn timeline_height(&self) -> f64 {
        self.timeline.get_bounding_client_rect().height()
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_offset(&self, index: usize) -> f64 {
        self.items.get(index).map_or(0.0, |item| item.offset_top() as f64)
    }
}

pub struct DomTimelineView {
    fill: HtmlElement,
    items: Vec<HtmlElement>,
}

impl ProgressView for DomTimelineView {
    fn set_fill(&mut self, progress: f64) {
        if let Err(e) = self.fill.style().set_property("height", &format!("{}%", progress)) {
            error!("Failed to set timeline fill: {:?}", e);
        }
    }

    fn set_item_active(&mut self, index: usize, active: bool) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        if let Err(e) = item.class_list().toggle_with_force(ACTIVE_CLASS, active) {
            error!("Failed to toggle timeline item {}: {:?}", index, e);
        }
    }
}

type DomController = TimelineController<DomGeometry, DomTimelineView>;

struct ItemListeners {
    item: HtmlElement,
    enter: Closure<dyn FnMut()>,
    leave: Closure<dyn FnMut()>,
}

/// Keeps the listeners alive; dropping it detaches them.
pub struct TimelineBinding {
    window: Window,
    on_scroll: Closure<dyn FnMut()>,
    items: Vec<ItemListeners>,
}

impl Drop for TimelineBinding {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("scroll", self.on_scroll.as_ref().unchecked_ref());
        for listeners in &self.items {
            let _ = listeners.item.remove_event_listener_with_callback(
                "mouseenter",
                listeners.enter.as_ref().unchecked_ref(),
            );
            let _ = listeners.item.remove_event_listener_with_callback(
                "mouseleave",
                listeners.leave.as_ref().unchecked_ref(),
            );
        }
    }
}

fn dispatch(controller: &Rc<RefCell<DomController>>, event: TimelineEvent) -> Option<f64> {
    match controller.try_borrow_mut() {
        Ok(mut controller) => controller.handle(event),
        Err(_) => None,
    }
}

fn query_html(document: &Document, selector: &str) -> Result<Option<HtmlElement>, JsValue> {
    Ok(document
        .query_selector(selector)?
        .and_then(|element| element.dyn_into::<HtmlElement>().ok()))
}

fn query_items(timeline: &HtmlElement, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let nodes = timeline.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingPart {
    Timeline,
    Fill,
}

#[derive(Debug, PartialEq)]
pub enum Located<T, F> {
    Found(T, F),
    Missing(MissingPart),
}

/// Pairs the timeline with its fill. The fill is only looked up once a
/// timeline exists.
pub fn locate<T, F, E>(
    timeline: Option<T>,
    find_fill: impl FnOnce(&T) -> Result<Option<F>, E>,
) -> Result<Located<T, F>, E> {
    let Some(timeline) = timeline else {
        return Ok(Located::Missing(MissingPart::Timeline));
    };
    Ok(match find_fill(&timeline)? {
        Some(fill) => Located::Found(timeline, fill),
        None => Located::Missing(MissingPart::Fill),
    })
}

/// Wires the timeline on the current page. Returns `Ok(None)` when the
/// timeline or its fill is not part of the page.
pub fn install(
    window: &Window,
    document: &Document,
    config: &TimelineConfig,
) -> Result<Option<TimelineBinding>, JsValue> {
    let located = locate(query_html(document, &config.container_selector)?, |timeline| {
        let fill = timeline.query_selector(&config.fill_selector)?;
        Ok::<_, JsValue>(fill.and_then(|element| element.dyn_into::<HtmlElement>().ok()))
    })?;
    let (timeline, fill) = match located {
        Located::Found(timeline, fill) => (timeline, fill),
        Located::Missing(MissingPart::Timeline) => {
            debug!("No {} on this page, timeline stays inert", config.container_selector);
            return Ok(None);
        }
        Located::Missing(MissingPart::Fill) => {
            debug!("Timeline has no {}, timeline stays inert", config.fill_selector);
            return Ok(None);
        }
    };
    let items = query_items(&timeline, &config.item_selector)?;

    let geometry = DomGeometry {
        window: window.clone(),
        timeline,
        items: items.clone(),
    };
    let view = DomTimelineView {
        fill,
        items: items.clone(),
    };
    let controller = Rc::new(RefCell::new(TimelineController::new(
        TimelineSettings::from(config),
        geometry,
        view,
    )));

    let on_scroll = {
        let controller = controller.clone();
        Closure::<dyn FnMut()>::new(move || {
            dispatch(&controller, TimelineEvent::Scroll);
        })
    };
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    window.add_event_listener_with_callback_and_add_event_listener_options(
        "scroll",
        on_scroll.as_ref().unchecked_ref(),
        &options,
    )?;

    // Any listener attached so far is detached again if a later step fails.
    let mut binding = TimelineBinding {
        window: window.clone(),
        on_scroll,
        items: Vec::with_capacity(items.len()),
    };
    for (index, item) in items.into_iter().enumerate() {
        let enter = {
            let controller = controller.clone();
            Closure::<dyn FnMut()>::new(move || {
                dispatch(&controller, TimelineEvent::HoverEnter(index));
            })
        };
        let leave = {
            let controller = controller.clone();
            Closure::<dyn FnMut()>::new(move || {
                dispatch(&controller, TimelineEvent::HoverLeave(index));
            })
        };
        let attached = item
            .add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())
            .and_then(|_| {
                item.add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())
            });
        // Tracked before the error is returned so a half-wired item is detached too.
        binding.items.push(ItemListeners { item, enter, leave });
        attached?;
    }

    debug!("Timeline wired with {} items", binding.items.len());
    Ok(Some(binding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn page_without_timeline_is_left_alone() {
        let lookups = Cell::new(0);
        let located = locate(None::<&str>, |_| {
            lookups.set(lookups.get() + 1);
            Ok::<_, ()>(Some("fill"))
        });
        assert_eq!(located, Ok(Located::Missing(MissingPart::Timeline)));
        assert_eq!(lookups.get(), 0);
    }

    #[test]
    fn timeline_without_fill_is_left_alone() {
        let located = locate(Some("timeline"), |_| Ok::<Option<&str>, ()>(None));
        assert_eq!(located, Ok(Located::Missing(MissingPart::Fill)));
    }

    #[test]
    fn timeline_with_fill_is_found() {
        let located = locate(Some("timeline"), |timeline| {
            assert_eq!(*timeline, "timeline");
            Ok::<_, ()>(Some("fill"))
        });
        assert_eq!(located, Ok(Located::Found("timeline", "fill")));
    }

    #[test]
    fn lookup_failure_is_propagated() {
        let located = locate(Some("timeline"), |_| Err::<Option<&str>, _>("bad selector"));
        assert_eq!(located, Err("bad selector"));
    }
}
