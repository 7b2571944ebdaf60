//! Scroll/hover driven timeline progress.
//!
//! Progress is a percentage in `[0, 100]` that is never stored: every event
//! recomputes it from the current geometry and pushes it to a [`ProgressView`].

use crate::config::TimelineConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSettings {
    pub trigger_fraction: f64,
    pub hover_lookahead: f64,
    pub activation_tolerance: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            trigger_fraction: 0.55,
            hover_lookahead: 15.0,
            activation_tolerance: 5.0,
        }
    }
}

impl From<&TimelineConfig> for TimelineSettings {
    fn from(config: &TimelineConfig) -> Self {
        Self {
            trigger_fraction: config.trigger_fraction,
            hover_lookahead: config.hover_lookahead,
            activation_tolerance: config.activation_tolerance,
        }
    }
}

/// Layout measurements, read at call time.
pub trait TimelineGeometry {
    fn viewport_height(&self) -> f64;
    /// Top edge of the timeline relative to the viewport.
    fn timeline_top(&self) -> f64;
    fn timeline_height(&self) -> f64;
    fn item_count(&self) -> usize;
    /// Offset of item `index` from the top of the timeline, in pixels.
    fn item_offset(&self, index: usize) -> f64;
}

pub trait ProgressView {
    fn set_fill(&mut self, progress: f64);
    fn set_item_active(&mut self, index: usize, active: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionMode {
    Scrolling,
    Hovering,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineEvent {
    Scroll,
    HoverEnter(usize),
    HoverLeave(usize),
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clamp_progress(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 100.0)
}

fn usable_height(height: f64) -> Option<f64> {
    (height.is_finite() && height > 0.0).then_some(height)
}

/// `clamp(((H * f - top) / L) * 100, 0, 100)`; a timeline with no height
/// yields 0.
pub fn scroll_progress(viewport_height: f64, trigger_fraction: f64, top: f64, height: f64) -> f64 {
    match usable_height(height) {
        Some(height) => clamp_progress((viewport_height * trigger_fraction - top) / height * 100.0),
        None => 0.0,
    }
}

/// Position of an item as a percentage of the timeline height.
pub fn item_percent(offset: f64, height: f64) -> f64 {
    usable_height(height).map_or(0.0, |height| finite_or_zero(offset / height * 100.0))
}

/// Target progress while an item is hovered: its own position plus the
/// lookahead, capped at 100.
pub fn hover_progress(offset: f64, height: f64, lookahead: f64) -> f64 {
    match usable_height(height) {
        Some(height) => clamp_progress((item_percent(offset, height) + lookahead).min(100.0)),
        None => 0.0,
    }
}

pub fn is_item_active(progress: f64, item_percent: f64, tolerance: f64) -> bool {
    progress >= item_percent - tolerance
}

pub struct TimelineController<G, V> {
    settings: TimelineSettings,
    geometry: G,
    view: V,
    mode: InteractionMode,
}

impl<G: TimelineGeometry, V: ProgressView> TimelineController<G, V> {
    /// Builds the controller and applies progress once, so a timeline that is
    /// already on screen at load is filled correctly.
    pub fn new(settings: TimelineSettings, geometry: G, view: V) -> Self {
        let mut controller = Self {
            settings,
            geometry,
            view,
            mode: InteractionMode::Scrolling,
        };
        let progress = controller.compute_scroll_progress();
        controller.apply_progress(progress);
        controller
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn compute_scroll_progress(&self) -> f64 {
        scroll_progress(
            self.geometry.viewport_height(),
            self.settings.trigger_fraction,
            self.geometry.timeline_top(),
            self.geometry.timeline_height(),
        )
    }

    pub fn compute_hover_progress(&self, index: usize) -> f64 {
        hover_progress(
            self.geometry.item_offset(index),
            self.geometry.timeline_height(),
            self.settings.hover_lookahead,
        )
    }

    pub fn apply_progress(&mut self, progress: f64) {
        let progress = clamp_progress(progress);
        self.view.set_fill(progress);

        let height = self.geometry.timeline_height();
        for index in 0..self.geometry.item_count() {
            let percent = item_percent(self.geometry.item_offset(index), height);
            let active = is_item_active(progress, percent, self.settings.activation_tolerance);
            self.view.set_item_active(index, active);
        }
    }

    /// Runs one transition and returns the progress it applied, or `None`
    /// when the event was ignored.
    pub fn handle(&mut self, event: TimelineEvent) -> Option<f64> {
        let progress = match event {
            TimelineEvent::Scroll => {
                if self.mode == InteractionMode::Hovering {
                    return None;
                }
                self.compute_scroll_progress()
            }
            TimelineEvent::HoverEnter(index) => {
                if index >= self.geometry.item_count() {
                    return None;
                }
                self.mode = InteractionMode::Hovering;
                self.compute_hover_progress(index)
            }
            TimelineEvent::HoverLeave(index) => {
                if index >= self.geometry.item_count() {
                    return None;
                }
                self.mode = InteractionMode::Scrolling;
                self.compute_scroll_progress()
            }
        };
        self.apply_progress(progress);
        Some(progress)
    }
}
