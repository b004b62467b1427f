use serde::{Deserialize, Serialize};

use crate::domain::{PropertyValue, RangeValue};
use crate::host::HostBinding;
use crate::pipeline::{DeferredValidation, FieldError};

use super::base::{FieldKind, PropertyField};
use super::ids::IdGenerator;
use super::options::FieldOptions;

const FALLBACK_LABEL: &str = "0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub orientation: Orientation,
    pub show_value: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            orientation: Orientation::Horizontal,
            show_value: true,
        }
    }
}

impl SliderConfig {
    /// Orders the pair, clamps it to the bounds and snaps it to the step.
    /// `None` when either end or either bound is not a number.
    pub fn normalize(&self, lower: f64, upper: f64) -> Option<RangeValue> {
        if [lower, upper, self.min, self.max].iter().any(|v| v.is_nan()) {
            return None;
        }
        let (lo, hi) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        let (floor, ceiling) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let snaps = self.step.is_finite() && self.step > 0.0 && floor.is_finite();
        let scale = 10f64.powi(decimal_places(self.step).max(decimal_places(floor)));
        let fit = |value: f64| {
            let clamped = value.clamp(floor, ceiling);
            if snaps {
                let snapped = floor + ((clamped - floor) / self.step).round() * self.step;
                ((snapped * scale).round() / scale).min(ceiling)
            } else {
                clamped
            }
        };
        Some(RangeValue::new(fit(lo), fit(hi)))
    }
}

/// Fractional digits needed to write `value` exactly, capped at 9.
fn decimal_places(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (0..9)
        .find(|&places| {
            let scaled = value * 10f64.powi(places);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(9)
}

/// Labels shown next to the slider, taken from the raw initial value.
///
/// Exactly two comma-separated parts are shown verbatim; anything else
/// shows `"0"` for both ends.
pub fn initial_labels(initial: Option<&PropertyValue>) -> (String, String) {
    let parts = initial
        .and_then(PropertyValue::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| text.split(',').collect::<Vec<_>>());
    match parts.as_deref() {
        Some([min, max]) => (min.to_string(), max.to_string()),
        _ => (FALLBACK_LABEL.to_string(), FALLBACK_LABEL.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderRangeState {
    value: Option<RangeValue>,
    min_label: String,
    max_label: String,
}

impl SliderRangeState {
    pub fn value(&self) -> Option<RangeValue> {
        self.value
    }

    pub fn min_label(&self) -> &str {
        &self.min_label
    }

    pub fn max_label(&self) -> &str {
        &self.max_label
    }

    fn sliding_to(&self, value: RangeValue) -> Self {
        Self {
            value: Some(value),
            min_label: value.min.to_string(),
            max_label: value.max.to_string(),
        }
    }
}

/// Two-handle slider selecting a `[min, max]` range.
#[derive(Debug)]
pub struct SliderRangeField {
    key: String,
    label: String,
    disabled: bool,
    config: SliderConfig,
    state: SliderRangeState,
    pipeline: DeferredValidation<RangeValue>,
}

impl SliderRangeField {
    pub fn new(
        options: FieldOptions<RangeValue>,
        config: SliderConfig,
        binding: HostBinding,
        ids: &dyn IdGenerator,
    ) -> Result<Self, FieldError> {
        let (min_label, max_label) = initial_labels(options.initial_value.as_ref());
        let value = options
            .initial_value
            .as_ref()
            .and_then(PropertyValue::as_str)
            .and_then(|text| text.parse::<RangeValue>().ok());
        Ok(Self {
            key: ids.next_id(),
            label: options.label.clone(),
            disabled: options.disabled,
            config,
            state: SliderRangeState {
                value,
                min_label,
                max_label,
            },
            pipeline: options.pipeline(binding)?,
        })
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    pub fn state(&self) -> &SliderRangeState {
        &self.state
    }

    pub fn value(&self) -> Option<RangeValue> {
        self.state.value
    }

    pub fn validation(&self) -> &DeferredValidation<RangeValue> {
        &self.pipeline
    }

    /// Moves the handles and queues the resulting range.
    pub fn slide(&mut self, lower: f64, upper: f64) -> bool {
        if self.disabled {
            return false;
        }
        let Some(range) = self.config.normalize(lower, upper) else {
            return false;
        };
        if self.state.value == Some(range) {
            return false;
        }
        self.state = self.state.sliding_to(range);
        self.pipeline.schedule(range);
        true
    }

    /// `(min, max)` labels, or `None` when values are hidden.
    pub fn value_labels(&self) -> Option<(&str, &str)> {
        self.config
            .show_value
            .then(|| (self.state.min_label(), self.state.max_label()))
    }

    /// Labels in the order they appear: left to right, or top to bottom
    /// for a vertical slider (max first).
    pub fn labels_in_reading_order(&self) -> Option<[&str; 2]> {
        self.value_labels()
            .map(|(min, max)| match self.config.orientation {
                Orientation::Horizontal => [min, max],
                Orientation::Vertical => [max, min],
            })
    }

    pub fn slider_id(&self) -> String {
        self.element_id("slider")
    }

    pub async fn settled(&self) {
        self.pipeline.settled().await;
    }
}

impl PropertyField for SliderRangeField {
    fn kind(&self) -> FieldKind {
        FieldKind::SliderRange
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn target_property(&self) -> &str {
        self.pipeline.target_property()
    }

    fn display_value(&self) -> String {
        format!("{},{}", self.state.min_label, self.state.max_label)
    }

    fn error_message(&self) -> Option<String> {
        self.pipeline.error_message()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_pending(&self) -> bool {
        self.pipeline.is_pending()
    }

    fn dispose(&mut self) {
        self.pipeline.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationReply;
    use crate::form::ids::SequentialIds;
    use crate::host::SharedProperties;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn slider(
        options: FieldOptions<RangeValue>,
        config: SliderConfig,
    ) -> (SliderRangeField, Arc<Mutex<Vec<(Option<PropertyValue>, PropertyValue)>>>) {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&commits);
        let binding = HostBinding::new(SharedProperties::new(), "range").with_on_property_changed(
            move |_, previous, next| {
                sink.lock().unwrap().push((previous.cloned(), next.clone()));
                Ok(())
            },
        );
        let options = options.with_deferred_validation_time(Duration::from_millis(100));
        let field =
            SliderRangeField::new(options, config, binding, &SequentialIds::default()).unwrap();
        (field, commits)
    }

    #[test]
    fn initial_labels_parse_two_parts_verbatim() {
        assert_eq!(
            initial_labels(Some(&json!("10,90"))),
            ("10".to_string(), "90".to_string())
        );
    }

    #[test]
    fn malformed_or_missing_initial_labels_fall_back_to_zero() {
        let zero = ("0".to_string(), "0".to_string());
        assert_eq!(initial_labels(None), zero);
        assert_eq!(initial_labels(Some(&json!(""))), zero);
        assert_eq!(initial_labels(Some(&json!("10"))), zero);
        assert_eq!(initial_labels(Some(&json!("1,2,3"))), zero);
        assert_eq!(initial_labels(Some(&json!(42))), zero);
    }

    #[test]
    fn normalize_orders_clamps_and_snaps() {
        let config = SliderConfig {
            min: 0.0,
            max: 50.0,
            step: 5.0,
            ..SliderConfig::default()
        };
        assert_eq!(
            config.normalize(80.0, 12.0),
            Some(RangeValue::new(10.0, 50.0))
        );
        assert_eq!(
            config.normalize(-3.0, 23.0),
            Some(RangeValue::new(0.0, 25.0))
        );
        assert_eq!(config.normalize(f64::NAN, 1.0), None);
    }

    #[test]
    fn nan_bounds_normalize_to_nothing() {
        for config in [
            SliderConfig {
                min: f64::NAN,
                ..SliderConfig::default()
            },
            SliderConfig {
                max: f64::NAN,
                ..SliderConfig::default()
            },
        ] {
            assert_eq!(config.normalize(10.0, 20.0), None);
        }
    }

    #[test]
    fn fractional_steps_snap_to_clean_values() {
        let config = SliderConfig {
            min: 0.0,
            max: 1.0,
            step: 0.1,
            ..SliderConfig::default()
        };
        let range = config.normalize(0.3, 0.72).unwrap();
        assert_eq!(range, RangeValue::new(0.3, 0.7));
        assert_eq!(range.to_string(), "0.3,0.7");
    }

    #[tokio::test(start_paused = true)]
    async fn slide_commits_canonical_range_against_initial_value() {
        let (mut field, commits) = slider(
            FieldOptions::new().with_initial_value("10,90"),
            SliderConfig::default(),
        );
        assert_eq!(field.value_labels(), Some(("10", "90")));

        assert!(field.slide(20.0, 70.0));
        assert!(field.slide(25.0, 75.0));
        assert_eq!(field.value_labels(), Some(("25", "75")));
        field.settled().await;

        assert_eq!(
            *commits.lock().unwrap(),
            vec![(Some(json!("10,90")), json!("25,75"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_bounds_range_is_rejected_by_validator() {
        let validator = |value: &RangeValue| {
            if value.max - value.min < 10.0 {
                ValidationReply::invalid("Range must span at least 10")
            } else {
                ValidationReply::valid()
            }
        };
        let (mut field, commits) = slider(
            FieldOptions::new().with_validator(validator),
            SliderConfig::default(),
        );
        field.slide(40.0, 45.0);
        field.settled().await;
        assert_eq!(
            field.error_message().as_deref(),
            Some("Range must span at least 10")
        );
        assert!(commits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn vertical_slider_reads_max_first_and_hidden_values_show_nothing() {
        let (field, _) = slider(
            FieldOptions::new().with_initial_value("10,90"),
            SliderConfig {
                orientation: Orientation::Vertical,
                ..SliderConfig::default()
            },
        );
        assert_eq!(field.labels_in_reading_order(), Some(["90", "10"]));

        let (hidden, _) = slider(
            FieldOptions::new().with_initial_value("10,90"),
            SliderConfig {
                show_value: false,
                ..SliderConfig::default()
            },
        );
        assert_eq!(hidden.value_labels(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_slider_does_not_move() {
        let (mut field, commits) = slider(
            FieldOptions::new().with_initial_value("10,90").with_disabled(true),
            SliderConfig::default(),
        );
        assert!(!field.slide(0.0, 100.0));
        assert_eq!(field.value(), Some(RangeValue::new(10.0, 90.0)));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(commits.lock().unwrap().is_empty());
    }
}
