use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{Alignment, PropertyValue};
use crate::form::{
    DEFAULT_DEFERRED_VALIDATION_TIME, DropdownOption, FieldKind, IdStyle, SliderConfig,
};
use crate::host::PropertyBag;
use crate::io::{DocumentFormat, parse_typed_document};
use crate::validators::ValidatorSpec;

/// A scripted pane session: the host's bag, the fields bound to it and the
/// interactions to replay against them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub properties: PropertyBag,
    /// Generator for field keys and the element ids derived from them.
    pub ids: IdStyle,
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn parse(contents: &str, format: DocumentFormat) -> Result<Self> {
        parse_typed_document(contents, format)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub kind: FieldKind,
    /// Property the field reads and commits; steps address fields by it.
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Falls back to the bag's current value for `target`.
    #[serde(default)]
    pub initial: Option<PropertyValue>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub deferred_validation_ms: Option<u64>,
    #[serde(default = "reactive_by_default")]
    pub reactive: bool,
    #[serde(default)]
    pub validator: Option<ValidatorSpec>,
    /// Choices of a `drop_down_select` field.
    #[serde(default)]
    pub options: Vec<DropdownOption>,
    #[serde(default)]
    pub slider: Option<SliderConfig>,
}

fn reactive_by_default() -> bool {
    true
}

impl FieldSpec {
    pub fn new(kind: FieldKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            label: None,
            initial: None,
            disabled: false,
            deferred_validation_ms: None,
            reactive: true,
            validator: None,
            options: Vec::new(),
            slider: None,
        }
    }

    pub fn deferred_validation_time(&self) -> Duration {
        self.deferred_validation_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEFERRED_VALIDATION_TIME)
    }
}

/// One user interaction, or a pause between interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Click { field: String, align: Alignment },
    Toggle {
        field: String,
        option: String,
        checked: bool,
    },
    ToggleOpen { field: String },
    Slide { field: String, min: f64, max: f64 },
    Wait { ms: u64 },
}

impl Step {
    /// Target property of the field this step drives, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Step::Click { field, .. }
            | Step::Toggle { field, .. }
            | Step::ToggleOpen { field }
            | Step::Slide { field, .. } => Some(field),
            Step::Wait { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_fill_in_defaults() {
        let scenario: Scenario = serde_json::from_value(json!({
            "fields": [{"kind": "align_picker", "target": "textAlign"}]
        }))
        .unwrap();
        let field = &scenario.fields[0];
        assert!(field.reactive);
        assert!(!field.disabled);
        assert_eq!(
            field.deferred_validation_time(),
            DEFAULT_DEFERRED_VALIDATION_TIME
        );
        assert!(scenario.steps.is_empty());
        assert_eq!(scenario.ids, IdStyle::Sequential);
    }

    #[test]
    fn ulid_keys_can_be_requested() {
        let scenario: Scenario = serde_json::from_value(json!({"ids": "ulid"})).unwrap();
        assert_eq!(scenario.ids, IdStyle::Ulid);
        assert!(serde_json::from_value::<Scenario>(json!({"ids": "uuid"})).is_err());
    }

    #[test]
    fn steps_are_tagged_by_action() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"action": "click", "field": "textAlign", "align": "right"},
            {"action": "toggle", "field": "fonts", "option": "arial", "checked": true},
            {"action": "toggle_open", "field": "fonts"},
            {"action": "slide", "field": "range", "min": 5, "max": 70},
            {"action": "wait", "ms": 300}
        ]))
        .unwrap();
        assert_eq!(
            steps[0],
            Step::Click {
                field: "textAlign".into(),
                align: Alignment::Right
            }
        );
        assert_eq!(steps[2].field(), Some("fonts"));
        assert_eq!(steps[4], Step::Wait { ms: 300 });
        assert_eq!(steps[4].field(), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = Scenario::parse(
            r#"{"fields": [{"kind": "align_picker", "target": "a", "colour": "red"}]}"#,
            DocumentFormat::Json,
        );
        assert!(parsed.is_err());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_scenarios_parse() {
        let raw = "properties:\n  textAlign: left\nfields:\n  - kind: align_picker\n    target: textAlign\nsteps:\n  - action: click\n    field: textAlign\n    align: center\n";
        let scenario = Scenario::parse(raw, DocumentFormat::Yaml).unwrap();
        assert_eq!(scenario.properties["textAlign"], json!("left"));
        assert_eq!(scenario.steps.len(), 1);
    }
}
