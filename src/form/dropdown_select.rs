use serde::{Deserialize, Serialize};

use crate::domain::CandidateValue;
use crate::host::HostBinding;
use crate::pipeline::{DeferredValidation, FieldError};

use super::base::{FieldKind, PropertyField};
use super::ids::IdGenerator;
use super::options::FieldOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub key: String,
    pub text: String,
}

impl DropdownOption {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropDownSelectState {
    selected: Vec<bool>,
    is_open: bool,
    hover_dropdown: bool,
    hover_option: Option<String>,
}

impl DropDownSelectState {
    pub fn selected_flags(&self) -> &[bool] {
        &self.selected
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_hover_dropdown(&self) -> bool {
        self.hover_dropdown
    }

    pub fn hover_option(&self) -> Option<&str> {
        self.hover_option.as_deref()
    }

    fn with_selection(&self, index: usize, checked: bool) -> Self {
        let mut selected = self.selected.clone();
        selected[index] = checked;
        Self {
            selected,
            ..self.clone()
        }
    }

    fn with_open(&self, is_open: bool) -> Self {
        Self {
            is_open,
            ..self.clone()
        }
    }

    fn with_hover_dropdown(&self, hover_dropdown: bool) -> Self {
        Self {
            hover_dropdown,
            ..self.clone()
        }
    }

    fn with_hover_option(&self, hover_option: Option<String>) -> Self {
        Self {
            hover_option,
            ..self.clone()
        }
    }
}

/// Dropdown with a checkbox per option; any subset may be selected.
#[derive(Debug)]
pub struct DropDownSelectField {
    key: String,
    label: String,
    disabled: bool,
    options: Vec<DropdownOption>,
    state: DropDownSelectState,
    pipeline: DeferredValidation<Vec<String>>,
}

impl DropDownSelectField {
    pub fn new(
        options: FieldOptions<Vec<String>>,
        choices: Vec<DropdownOption>,
        binding: HostBinding,
        ids: &dyn IdGenerator,
    ) -> Result<Self, FieldError> {
        let initial = options
            .initial_value
            .as_ref()
            .and_then(Vec::<String>::from_property)
            .unwrap_or_default();
        let selected = choices
            .iter()
            .map(|choice| initial.iter().any(|key| key == &choice.key))
            .collect();
        Ok(Self {
            key: ids.next_id(),
            label: options.label.clone(),
            disabled: options.disabled,
            options: choices,
            state: DropDownSelectState {
                selected,
                ..DropDownSelectState::default()
            },
            pipeline: options.pipeline(binding)?,
        })
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn state(&self) -> &DropDownSelectState {
        &self.state
    }

    pub fn validation(&self) -> &DeferredValidation<Vec<String>> {
        &self.pipeline
    }

    /// Selected keys, in option order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.selected_options()
            .map(|option| option.key.clone())
            .collect()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.index_of(key)
            .is_some_and(|index| self.state.selected[index])
    }

    /// Sets membership of one option and queues the whole selection.
    /// Unknown keys and no-op toggles change nothing.
    pub fn toggle_option(&mut self, key: &str, checked: bool) -> bool {
        if self.disabled {
            return false;
        }
        let Some(index) = self.index_of(key) else {
            tracing::debug!(key, "ignoring toggle for unknown option");
            return false;
        };
        if self.state.selected[index] == checked {
            return false;
        }
        self.state = self.state.with_selection(index, checked);
        self.pipeline.schedule(self.selected_keys());
        true
    }

    pub fn toggle_open(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        self.state = self.state.with_open(!self.state.is_open);
        true
    }

    pub fn pointer_enter_dropdown(&mut self) -> bool {
        self.set_hover_dropdown(true)
    }

    pub fn pointer_leave_dropdown(&mut self) -> bool {
        self.set_hover_dropdown(false)
    }

    pub fn hover_option(&mut self, key: &str) -> bool {
        if self.disabled || self.index_of(key).is_none() {
            return false;
        }
        self.state = self.state.with_hover_option(Some(key.to_string()));
        true
    }

    pub fn leave_option(&mut self) -> bool {
        if self.disabled || self.state.hover_option.is_none() {
            return false;
        }
        self.state = self.state.with_hover_option(None);
        true
    }

    pub fn checkbox_id(&self, key: &str) -> String {
        self.element_id(&format!("checkbox-{key}"))
    }

    pub async fn settled(&self) {
        self.pipeline.settled().await;
    }

    fn set_hover_dropdown(&mut self, flag: bool) -> bool {
        if self.disabled || self.state.hover_dropdown == flag {
            return false;
        }
        self.state = self.state.with_hover_dropdown(flag);
        true
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.options.iter().position(|option| option.key == key)
    }

    fn selected_options(&self) -> impl Iterator<Item = &DropdownOption> {
        self.options
            .iter()
            .zip(self.state.selected.iter())
            .filter_map(|(option, flag)| flag.then_some(option))
    }
}

impl PropertyField for DropDownSelectField {
    fn kind(&self) -> FieldKind {
        FieldKind::DropDownSelect
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
        self.selected_options()
            .map(|option| option.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
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

    fn fonts() -> Vec<DropdownOption> {
        vec![
            DropdownOption::new("arial", "Arial"),
            DropdownOption::new("georgia", "Georgia"),
            DropdownOption::new("verdana", "Verdana"),
        ]
    }

    fn field(
        options: FieldOptions<Vec<String>>,
    ) -> (DropDownSelectField, SharedProperties, Arc<Mutex<Vec<serde_json::Value>>>) {
        let properties = SharedProperties::new();
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&commits);
        let binding = HostBinding::new(properties.clone(), "fonts").with_on_property_changed(
            move |_, _, next| {
                sink.lock().unwrap().push(next.clone());
                Ok(())
            },
        );
        let options = options.with_deferred_validation_time(Duration::from_millis(100));
        let field =
            DropDownSelectField::new(options, fonts(), binding, &SequentialIds::default())
                .unwrap();
        (field, properties, commits)
    }

    #[tokio::test(start_paused = true)]
    async fn initial_keys_seed_the_selection() {
        let (field, _, _) =
            field(FieldOptions::new().with_initial_value(json!(["verdana", "arial", "nope"])));
        assert_eq!(field.state().selected_flags(), &[true, false, true]);
        assert_eq!(field.display_value(), "Arial, Verdana");
        assert_eq!(field.selected_keys(), vec!["arial", "verdana"]);
    }

    #[tokio::test(start_paused = true)]
    async fn toggles_accumulate_and_commit_once_in_option_order() {
        let (mut field, properties, commits) = field(FieldOptions::new());
        assert!(field.toggle_option("verdana", true));
        assert!(field.toggle_option("arial", true));
        assert!(field.toggle_option("georgia", true));
        assert!(field.toggle_option("georgia", false));
        field.settled().await;

        assert_eq!(*commits.lock().unwrap(), vec![json!(["arial", "verdana"])]);
        assert_eq!(properties.get("fonts"), Some(json!(["arial", "verdana"])));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_and_redundant_toggles_are_ignored() {
        let (mut field, _, _) = field(FieldOptions::new());
        assert!(!field.toggle_option("comic-sans", true));
        assert!(!field.toggle_option("arial", false));
        assert!(!field.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_selection_keeps_the_error_visible() {
        let validator = |value: &Vec<String>| {
            if value.len() > 1 {
                ValidationReply::invalid("Select a single font")
            } else {
                ValidationReply::valid()
            }
        };
        let (mut field, properties, commits) =
            field(FieldOptions::new().with_validator(validator));
        field.toggle_option("arial", true);
        field.toggle_option("georgia", true);
        field.settled().await;

        assert_eq!(field.error_message().as_deref(), Some("Select a single font"));
        assert!(commits.lock().unwrap().is_empty());
        assert!(!properties.contains("fonts"));

        field.toggle_option("georgia", false);
        field.settled().await;
        assert_eq!(field.error_message(), None);
        assert_eq!(*commits.lock().unwrap(), vec![json!(["arial"])]);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_flags_never_reach_the_host() {
        let (mut field, properties, commits) = field(FieldOptions::new());
        assert!(field.toggle_open());
        assert!(field.state().is_open());
        assert!(field.pointer_enter_dropdown());
        assert!(field.hover_option("georgia"));
        assert_eq!(field.state().hover_option(), Some("georgia"));
        assert!(field.leave_option());
        assert!(field.toggle_open());
        assert!(!field.state().is_open());
        assert!(!field.is_pending());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(commits.lock().unwrap().is_empty());
        assert!(properties.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_dropdown_is_inert() {
        let (mut field, _, commits) = field(FieldOptions::new().with_disabled(true));
        let before = field.state().clone();
        assert!(!field.toggle_open());
        assert!(!field.toggle_option("arial", true));
        assert!(!field.pointer_enter_dropdown());
        assert!(!field.hover_option("arial"));
        assert_eq!(field.state(), &before);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(commits.lock().unwrap().is_empty());
    }
}
