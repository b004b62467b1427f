use crate::domain::{Alignment, CandidateValue};
use crate::host::HostBinding;
use crate::pipeline::{DeferredValidation, FieldError};

use super::base::{FieldKind, PropertyField};
use super::ids::IdGenerator;
use super::options::FieldOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Hover {
    left: bool,
    center: bool,
    right: bool,
}

impl Hover {
    fn get(self, alignment: Alignment) -> bool {
        match alignment {
            Alignment::Left => self.left,
            Alignment::Center => self.center,
            Alignment::Right => self.right,
        }
    }

    fn with(self, alignment: Alignment, flag: bool) -> Self {
        match alignment {
            Alignment::Left => Self { left: flag, ..self },
            Alignment::Center => Self {
                center: flag,
                ..self
            },
            Alignment::Right => Self {
                right: flag,
                ..self
            },
        }
    }
}

/// Selection plus hover flags. `mode == None` is the unselected state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignPickerState {
    mode: Option<Alignment>,
    hover: Hover,
}

impl AlignPickerState {
    pub fn new(mode: Option<Alignment>) -> Self {
        Self {
            mode,
            hover: Hover::default(),
        }
    }

    pub fn mode(&self) -> Option<Alignment> {
        self.mode
    }

    pub fn is_checked(&self, alignment: Alignment) -> bool {
        self.mode == Some(alignment)
    }

    pub fn is_hovered(&self, alignment: Alignment) -> bool {
        self.hover.get(alignment)
    }

    fn selecting(self, alignment: Alignment) -> Self {
        Self {
            mode: Some(alignment),
            ..self
        }
    }

    fn hovering(self, alignment: Alignment, flag: bool) -> Self {
        Self {
            hover: self.hover.with(alignment, flag),
            ..self
        }
    }
}

/// Three mutually exclusive alignment tiles.
#[derive(Debug)]
pub struct AlignPickerField {
    key: String,
    label: String,
    disabled: bool,
    state: AlignPickerState,
    pipeline: DeferredValidation<Alignment>,
}

impl AlignPickerField {
    pub fn new(
        options: FieldOptions<Alignment>,
        binding: HostBinding,
        ids: &dyn IdGenerator,
    ) -> Result<Self, FieldError> {
        let mode = options
            .initial_value
            .as_ref()
            .and_then(Alignment::from_property);
        Ok(Self {
            key: ids.next_id(),
            label: options.label.clone(),
            disabled: options.disabled,
            state: AlignPickerState::new(mode),
            pipeline: options.pipeline(binding)?,
        })
    }

    pub fn state(&self) -> AlignPickerState {
        self.state
    }

    pub fn mode(&self) -> Option<Alignment> {
        self.state.mode()
    }

    pub fn validation(&self) -> &DeferredValidation<Alignment> {
        &self.pipeline
    }

    /// Selects `alignment` and queues it for validation.
    ///
    /// Clicking the tile that is already checked is swallowed: it returns
    /// `false` and schedules no validation.
    pub fn click(&mut self, alignment: Alignment) -> bool {
        if self.disabled || self.state.is_checked(alignment) {
            return false;
        }
        self.state = self.state.selecting(alignment);
        self.pipeline.schedule(alignment);
        true
    }

    pub fn pointer_enter(&mut self, alignment: Alignment) -> bool {
        self.set_hover(alignment, true)
    }

    pub fn pointer_leave(&mut self, alignment: Alignment) -> bool {
        self.set_hover(alignment, false)
    }

    fn set_hover(&mut self, alignment: Alignment, flag: bool) -> bool {
        if self.disabled || self.state.is_hovered(alignment) == flag {
            return false;
        }
        self.state = self.state.hovering(alignment, flag);
        true
    }

    pub fn radio_id(&self, alignment: Alignment) -> String {
        self.element_id(&format!("{alignment}Radio"))
    }

    pub fn group_name(&self) -> String {
        self.element_id("align-picker")
    }

    pub async fn settled(&self) {
        self.pipeline.settled().await;
    }
}

impl PropertyField for AlignPickerField {
    fn kind(&self) -> FieldKind {
        FieldKind::AlignPicker
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
        self.state
            .mode()
            .map(|mode| mode.to_string())
            .unwrap_or_default()
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

    type Changes = Arc<Mutex<Vec<(String, Option<serde_json::Value>, serde_json::Value)>>>;

    fn binding(properties: &SharedProperties) -> (HostBinding, Changes) {
        let changes: Changes = Arc::default();
        let sink = Arc::clone(&changes);
        let binding = HostBinding::new(properties.clone(), "alignment").with_on_property_changed(
            move |key, previous, next| {
                sink.lock()
                    .unwrap()
                    .push((key.to_string(), previous.cloned(), next.clone()));
                Ok(())
            },
        );
        (binding, changes)
    }

    fn options() -> FieldOptions<Alignment> {
        FieldOptions::new()
            .with_label("Alignment")
            .with_initial_value("left")
            .with_deferred_validation_time(Duration::from_millis(50))
    }

    #[tokio::test(start_paused = true)]
    async fn clicking_right_commits_right_with_left_as_previous() {
        let properties = SharedProperties::new();
        let (binding, changes) = binding(&properties);
        let options = options().with_validator(|_: &Alignment| ValidationReply::valid());
        let mut field = AlignPickerField::new(options, binding, &SequentialIds::new("t")).unwrap();
        assert_eq!(field.mode(), Some(Alignment::Left));

        assert!(field.click(Alignment::Right));
        assert_eq!(field.mode(), Some(Alignment::Right));
        assert!(changes.lock().unwrap().is_empty());

        field.settled().await;
        assert_eq!(properties.get("alignment"), Some(json!("right")));
        assert_eq!(
            *changes.lock().unwrap(),
            vec![("alignment".to_string(), Some(json!("left")), json!("right"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn selection_is_mutually_exclusive() {
        let properties = SharedProperties::new();
        let (binding, _changes) = binding(&properties);
        let mut field =
            AlignPickerField::new(FieldOptions::new(), binding, &SequentialIds::default())
                .unwrap();
        assert_eq!(field.mode(), None);
        field.click(Alignment::Center);
        let state = field.state();
        assert!(state.is_checked(Alignment::Center));
        assert!(!state.is_checked(Alignment::Left));
        assert!(!state.is_checked(Alignment::Right));
        assert!(!field.click(Alignment::Center));
    }

    #[tokio::test(start_paused = true)]
    async fn clicking_the_checked_tile_schedules_nothing() {
        let properties = SharedProperties::new();
        let (binding, changes) = binding(&properties);
        let mut field =
            AlignPickerField::new(options(), binding, &SequentialIds::default()).unwrap();
        assert!(field.click(Alignment::Right));
        field.settled().await;
        let token = field.validation().latest_token();
        assert_eq!(changes.lock().unwrap().len(), 1);

        assert!(!field.click(Alignment::Right));
        assert!(!field.is_pending());
        assert_eq!(field.validation().latest_token(), token);
        field.settled().await;
        assert_eq!(changes.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_field_ignores_every_interaction() {
        let properties = SharedProperties::new();
        let (binding, changes) = binding(&properties);
        let mut field = AlignPickerField::new(
            options().with_disabled(true),
            binding,
            &SequentialIds::default(),
        )
        .unwrap();
        let before = field.state();

        assert!(!field.click(Alignment::Right));
        assert!(!field.pointer_enter(Alignment::Center));
        assert_eq!(field.state(), before);
        assert!(!field.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(changes.lock().unwrap().is_empty());
        assert_eq!(field.validation().latest_token(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn hover_flags_stay_local() {
        let properties = SharedProperties::new();
        let (binding, changes) = binding(&properties);
        let mut field =
            AlignPickerField::new(options(), binding, &SequentialIds::default()).unwrap();
        assert!(field.pointer_enter(Alignment::Right));
        assert!(field.state().is_hovered(Alignment::Right));
        assert!(!field.pointer_enter(Alignment::Right));
        assert!(field.pointer_leave(Alignment::Right));
        assert!(!field.state().is_hovered(Alignment::Right));
        assert!(!field.is_pending());
        assert!(changes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn element_ids_embed_the_generated_key() {
        let (binding, _) = binding(&SharedProperties::new());
        let field =
            AlignPickerField::new(options(), binding, &SequentialIds::new("align")).unwrap();
        assert_eq!(field.radio_id(Alignment::Left), "leftRadio-align-1");
        assert_eq!(field.group_name(), "align-picker-align-1");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_initial_value_starts_unselected() {
        let (binding, _) = binding(&SharedProperties::new());
        let field = AlignPickerField::new(
            FieldOptions::new().with_initial_value(json!("justify")),
            binding,
            &SequentialIds::default(),
        )
        .unwrap();
        assert_eq!(field.mode(), None);
        assert_eq!(field.display_value(), "");
    }
}
