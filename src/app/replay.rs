use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::domain::{Alignment, CandidateValue, PropertyValue, RangeValue};
use crate::form::{
    AlignPickerField, DropDownSelectField, FieldKind, FieldOptions, IdGenerator, PropertyField,
    SliderRangeField,
};
use crate::host::{HostBinding, PropertyBag, SharedProperties};
use crate::pipeline::FieldError;

use super::scenario::{FieldSpec, Scenario, Step};

/// One `on_property_changed` notification seen by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    pub property: String,
    pub previous: Option<PropertyValue>,
    pub next: PropertyValue,
}

/// Where a field ended up once the replay settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub target: String,
    pub kind: FieldKind,
    /// Key the field's element ids are derived from.
    pub key: String,
    pub label: String,
    pub display: String,
    pub error: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub properties: PropertyBag,
    pub commits: Vec<CommitRecord>,
    pub renders: usize,
    pub fields: Vec<FieldReport>,
    /// Host callback failures routed to the error boundary.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

#[derive(Debug)]
enum ReplayField {
    Align(AlignPickerField),
    Dropdown(DropDownSelectField),
    Slider(SliderRangeField),
}

impl ReplayField {
    fn as_field(&self) -> &dyn PropertyField {
        match self {
            ReplayField::Align(field) => field,
            ReplayField::Dropdown(field) => field,
            ReplayField::Slider(field) => field,
        }
    }

    fn as_field_mut(&mut self) -> &mut dyn PropertyField {
        match self {
            ReplayField::Align(field) => field,
            ReplayField::Dropdown(field) => field,
            ReplayField::Slider(field) => field,
        }
    }

    async fn settled(&self) {
        match self {
            ReplayField::Align(field) => field.settled().await,
            ReplayField::Dropdown(field) => field.settled().await,
            ReplayField::Slider(field) => field.settled().await,
        }
    }
}

#[derive(Default)]
struct HostLog {
    commits: Mutex<Vec<CommitRecord>>,
    renders: AtomicUsize,
    failures: Mutex<Vec<String>>,
}

/// Drives a [`Scenario`] against real fields on the current runtime.
#[derive(Debug, Clone)]
pub struct Replay {
    scenario: Scenario,
}

impl Replay {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Builds the fields, applies every step in order and waits for all
    /// pending validations before reporting.
    pub async fn run(&self) -> Result<ReplayReport> {
        let properties = SharedProperties::from_bag(self.scenario.properties.clone());
        let log = Arc::new(HostLog::default());
        let ids = self.scenario.ids.generator();

        let mut fields: Vec<(String, ReplayField)> =
            Vec::with_capacity(self.scenario.fields.len());
        for spec in &self.scenario.fields {
            if fields.iter().any(|(target, _)| target == &spec.target) {
                bail!("field '{}' is declared twice", spec.target);
            }
            let field = build_field(spec, &properties, &log, ids.as_ref())
                .with_context(|| format!("failed to build field '{}'", spec.target))?;
            fields.push((spec.target.clone(), field));
        }

        for (index, step) in self.scenario.steps.iter().enumerate() {
            if let Step::Wait { ms } = step {
                tracing::debug!(ms, "waiting");
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                continue;
            }
            let Some(target) = step.field() else {
                continue;
            };
            let Some((_, field)) = fields.iter_mut().find(|(name, _)| name == target) else {
                bail!("step {} refers to unknown field '{target}'", index + 1);
            };
            let changed = apply_step(field, step)
                .with_context(|| format!("step {} cannot be applied", index + 1))?;
            if !changed {
                tracing::debug!(step = index + 1, field = target, "step changed nothing");
            }
        }

        for (_, field) in &fields {
            field.settled().await;
        }

        let reports = fields
            .iter()
            .map(|(_, field)| {
                let field = field.as_field();
                FieldReport {
                    target: field.target_property().to_string(),
                    kind: field.kind(),
                    key: field.key().to_string(),
                    label: field.label().to_string(),
                    display: field.display_value(),
                    error: field.error_message(),
                    disabled: field.is_disabled(),
                }
            })
            .collect();
        for (_, field) in &mut fields {
            field.as_field_mut().dispose();
        }

        let commits = log
            .commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let failures = log
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(ReplayReport {
            properties: properties.snapshot(),
            commits,
            renders: log.renders.load(Ordering::Acquire),
            fields: reports,
            failures,
        })
    }
}

fn build_field(
    spec: &FieldSpec,
    properties: &SharedProperties,
    log: &Arc<HostLog>,
    ids: &dyn IdGenerator,
) -> Result<ReplayField> {
    let binding = binding_for(spec, properties, log);
    let field = match spec.kind {
        FieldKind::AlignPicker => {
            let options = field_options::<Alignment>(spec, properties)?;
            ReplayField::Align(AlignPickerField::new(options, binding, ids)?)
        }
        FieldKind::DropDownSelect => {
            if spec.options.is_empty() {
                bail!("a drop_down_select field needs at least one option");
            }
            let options = field_options::<Vec<String>>(spec, properties)?;
            ReplayField::Dropdown(DropDownSelectField::new(
                options,
                spec.options.clone(),
                binding,
                ids,
            )?)
        }
        FieldKind::SliderRange => {
            let options = field_options::<RangeValue>(spec, properties)?;
            let config = spec.slider.unwrap_or_default();
            ReplayField::Slider(SliderRangeField::new(options, config, binding, ids)?)
        }
    };
    Ok(field)
}

fn binding_for(
    spec: &FieldSpec,
    properties: &SharedProperties,
    log: &Arc<HostLog>,
) -> HostBinding {
    let commits = Arc::clone(log);
    let renders = Arc::clone(log);
    let failures = Arc::clone(log);
    HostBinding::new(properties.clone(), spec.target.clone())
        .with_on_property_changed(move |property, previous, next| {
            commits
                .commits
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CommitRecord {
                    property: property.to_string(),
                    previous: previous.cloned(),
                    next: next.clone(),
                });
            Ok(())
        })
        .with_render(move || {
            renders.renders.fetch_add(1, Ordering::AcqRel);
            Ok(())
        })
        .with_reactive_property_changes(spec.reactive)
        .with_error_boundary(move |error: &FieldError| {
            tracing::error!("{error}");
            failures
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(error.to_string());
        })
}

fn field_options<V: CandidateValue>(
    spec: &FieldSpec,
    properties: &SharedProperties,
) -> Result<FieldOptions<V>> {
    let mut options = FieldOptions::<V>::new()
        .with_label(spec.label.clone().unwrap_or_else(|| spec.target.clone()))
        .with_deferred_validation_time(spec.deferred_validation_time())
        .with_disabled(spec.disabled);
    if let Some(initial) = spec
        .initial
        .clone()
        .or_else(|| properties.get(&spec.target))
    {
        options = options.with_initial_value(initial);
    }
    if let Some(rules) = &spec.validator {
        let compiled = rules.compile().context("invalid validator rules")?;
        options = options.with_validator(compiled);
    }
    Ok(options)
}

fn apply_step(field: &mut ReplayField, step: &Step) -> Result<bool> {
    let changed = match (field, step) {
        (ReplayField::Align(field), Step::Click { align, .. }) => field.click(*align),
        (ReplayField::Dropdown(field), Step::Toggle { option, checked, .. }) => {
            if !field.options().iter().any(|choice| &choice.key == option) {
                bail!("'{}' has no option '{option}'", field.target_property());
            }
            field.toggle_option(option, *checked)
        }
        (ReplayField::Dropdown(field), Step::ToggleOpen { .. }) => field.toggle_open(),
        (ReplayField::Slider(field), Step::Slide { min, max, .. }) => field.slide(*min, *max),
        (field, step) => bail!(
            "'{}' does not apply to a {:?} field",
            step_name(step),
            field.as_field().kind()
        ),
    };
    Ok(changed)
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::Click { .. } => "click",
        Step::Toggle { .. } => "toggle",
        Step::ToggleOpen { .. } => "toggle_open",
        Step::Slide { .. } => "slide",
        Step::Wait { .. } => "wait",
    }
}
