//! Count-up animation for elements carrying `data-count`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{error, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Window};

use crate::config::CounterConfig;

pub const COUNT_ATTRIBUTE: &str = "data-count";
pub const SUFFIX_ATTRIBUTE: &str = "data-suffix";

/// Ease-out quart: fast start, gentle landing.
pub fn ease_out_quart(t: f64) -> f64 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(4)
}

// Adding 0.0 turns a negative zero into a positive one.
fn format_number(value: f64) -> String {
    format!("{}", value + 0.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountUp {
    target: f64,
    suffix: String,
    duration_ms: f64,
    started_at: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub text: String,
    pub done: bool,
}

impl CountUp {
    pub fn new(target: f64, suffix: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            target,
            suffix: suffix.into(),
            duration_ms,
            started_at: None,
        }
    }

    /// Reads the target and suffix from an element's attributes.
    pub fn parse(count: Option<&str>, suffix: Option<&str>, duration_ms: f64) -> Option<Self> {
        let target = count?.trim().parse::<f64>().ok().filter(|t| t.is_finite())?;
        Some(Self::new(target, suffix.unwrap_or(""), duration_ms))
    }

    /// Text to show at `timestamp` (milliseconds). The first call marks the
    /// start of the animation.
    pub fn frame(&mut self, timestamp: f64) -> Frame {
        let started_at = *self.started_at.get_or_insert(timestamp);
        let progress = if self.duration_ms > 0.0 {
            ((timestamp - started_at) / self.duration_ms).min(1.0)
        } else {
            1.0
        };

        if progress < 1.0 {
            let value = (ease_out_quart(progress) * self.target).floor();
            Frame {
                text: format!("{}{}", format_number(value), self.suffix),
                done: false,
            }
        } else {
            Frame {
                text: format!("{}{}", format_number(self.target), self.suffix),
                done: true,
            }
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Takes the value out of a self-referencing slot, breaking the cycle
/// between the slot and whatever the value captured.
fn detach<T>(slot: &RefCell<Option<T>>) -> Option<T> {
    slot.borrow_mut().take()
}

// The closure cannot free itself while it is running, so the drop is
// deferred to the next task.
fn release(callback: &FrameCallback) {
    let finished = detach(callback);
    Timeout::new(0, move || drop(finished)).forget();
}

fn request_frame(window: &Window, callback: &FrameCallback) -> Result<(), JsValue> {
    if let Some(closure) = callback.borrow().as_ref() {
        window.request_animation_frame(closure.as_ref().unchecked_ref())?;
    }
    Ok(())
}

/// Starts counting `element` up to its `data-count` value. Elements with no
/// usable count are left untouched.
pub fn animate(window: &Window, element: Element, config: &CounterConfig) -> Result<(), JsValue> {
    let count = element.get_attribute(COUNT_ATTRIBUTE);
    let suffix = element.get_attribute(SUFFIX_ATTRIBUTE);
    let parsed = CountUp::parse(count.as_deref(), suffix.as_deref(), config.duration_ms);
    let Some(mut count_up) = parsed else {
        warn!("Skipping counter with invalid {}: {:?}", COUNT_ATTRIBUTE, count);
        return Ok(());
    };

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();
    let frame_window = window.clone();
    *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
        let frame = count_up.frame(timestamp);
        element.set_inner_html(&frame.text);
        if frame.done {
            release(&next);
        } else if let Err(e) = request_frame(&frame_window, &next) {
            error!("Counter stopped: {:?}", e);
            release(&next);
        }
    }));

    request_frame(window, &callback).map_err(|e| {
        // Not running yet, so it can be dropped right away.
        drop(detach(&callback));
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert_eq!(ease_out_quart(0.5), 1.0 - 0.0625);
        assert_eq!(ease_out_quart(2.0), 1.0);
    }

    #[test]
    fn counts_up_and_lands_on_exact_target() {
        let mut count_up = CountUp::new(50.0, "+", 2000.0);
        assert_eq!(count_up.frame(1000.0), Frame { text: "0+".to_string(), done: false });
        // Halfway: 0.9375 * 50 = 46.875.
        assert_eq!(count_up.frame(2000.0), Frame { text: "46+".to_string(), done: false });
        assert_eq!(count_up.frame(3000.0), Frame { text: "50+".to_string(), done: true });
        assert_eq!(count_up.frame(9000.0).text, "50+");
    }

    #[test]
    fn fractional_target_is_shown_exactly_at_the_end() {
        let mut count_up = CountUp::new(4.5, "%", 100.0);
        assert_eq!(count_up.frame(0.0).text, "0%");
        assert_eq!(count_up.frame(100.0).text, "4.5%");
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut count_up = CountUp::new(12.0, "", 0.0);
        assert_eq!(count_up.frame(5.0), Frame { text: "12".to_string(), done: true });
    }

    #[test]
    fn parse_rejects_missing_or_non_numeric_counts() {
        assert!(CountUp::parse(None, None, 2000.0).is_none());
        assert!(CountUp::parse(Some("lots"), None, 2000.0).is_none());
        assert!(CountUp::parse(Some("inf"), None, 2000.0).is_none());
        let parsed = CountUp::parse(Some(" 120 "), Some("k"), 2000.0).unwrap();
        assert_eq!(parsed, CountUp::new(120.0, "k", 2000.0));
    }

    #[test]
    fn detaching_breaks_a_self_reference() {
        type Slot = Rc<RefCell<Option<Box<dyn Fn()>>>>;
        let slot: Slot = Rc::new(RefCell::new(None));
        let captured = slot.clone();
        *slot.borrow_mut() = Some(Box::new(move || {
            let _ = captured.borrow();
        }));
        assert_eq!(Rc::strong_count(&slot), 2);

        drop(detach(&slot));
        assert_eq!(Rc::strong_count(&slot), 1);
        assert!(detach(&slot).is_none());
    }

    #[test]
    fn negative_targets_do_not_render_negative_zero() {
        let mut count_up = CountUp::new(-10.0, "", 1000.0);
        assert_eq!(count_up.frame(0.0).text, "0");
    }
}
