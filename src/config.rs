use log::Level;
use serde::Deserialize;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Id of the element the enhancements mount into. Its `data-config`
/// attribute may carry a JSON override of [`LandingConfig`].
pub const MOUNT_ID: &str = "landing-enhancements";
pub const CONFIG_ATTRIBUTE: &str = "data-config";

#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LandingConfig {
    pub timeline: TimelineConfig,
    pub reveal: RevealConfig,
    pub counter: CounterConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    pub container_selector: String,
    pub fill_selector: String,
    pub item_selector: String,
    /// Fraction of the viewport height where the fill "touches" the timeline.
    pub trigger_fraction: f64,
    /// Percentage points added past a hovered item's own position.
    pub hover_lookahead: f64,
    /// Items turn active this many points before the fill reaches them.
    pub activation_tolerance: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            container_selector: ".timeline".to_string(),
            fill_selector: ".timeline-progress".to_string(),
            item_selector: ".timeline-item".to_string(),
            trigger_fraction: 0.55,
            hover_lookahead: 15.0,
            activation_tolerance: 5.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub stagger_selector: String,
    pub threshold: f64,
    pub stagger_delay_ms: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".reveal-up, .reveal-left, .reveal-right".to_string(),
            stagger_selector: ".stagger-grid".to_string(),
            threshold: 0.15,
            stagger_delay_ms: 100,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self { duration_ms: 2000.0 }
    }
}

impl LandingConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parses an optional override, falling back to defaults when it is
    /// absent or malformed.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => Self::default(),
            Some(raw) => Self::from_json(raw).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid {}: {}", CONFIG_ATTRIBUTE, e);
                Self::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_constants() {
        let config = LandingConfig::default();
        assert_eq!(config.timeline.trigger_fraction, 0.55);
        assert_eq!(config.timeline.hover_lookahead, 15.0);
        assert_eq!(config.timeline.activation_tolerance, 5.0);
        assert_eq!(config.reveal.threshold, 0.15);
        assert_eq!(config.reveal.stagger_delay_ms, 100);
        assert_eq!(config.counter.duration_ms, 2000.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = LandingConfig::from_json(
            r#"{"timeline": {"trigger_fraction": 0.5}, "counter": {"duration_ms": 500}}"#,
        )
        .unwrap();
        assert_eq!(config.timeline.trigger_fraction, 0.5);
        assert_eq!(config.timeline.item_selector, ".timeline-item");
        assert_eq!(config.counter.duration_ms, 500.0);
        assert_eq!(config.reveal, RevealConfig::default());
    }

    #[test]
    fn malformed_attribute_falls_back_to_defaults() {
        assert_eq!(LandingConfig::from_attribute(Some("{not json")), LandingConfig::default());
        assert_eq!(LandingConfig::from_attribute(Some("   ")), LandingConfig::default());
        assert_eq!(LandingConfig::from_attribute(None), LandingConfig::default());
    }
}
