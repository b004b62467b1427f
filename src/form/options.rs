use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{CandidateValue, PropertyValue, Validator};
use crate::host::HostBinding;
use crate::pipeline::{DeferredValidation, FieldError};

pub const DEFAULT_DEFERRED_VALIDATION_TIME: Duration = Duration::from_millis(200);

/// Per-field configuration supplied by the host.
#[derive(Clone)]
pub struct FieldOptions<V> {
    pub label: String,
    pub initial_value: Option<PropertyValue>,
    pub deferred_validation_time: Duration,
    pub disabled: bool,
    pub validator: Option<Arc<dyn Validator<V>>>,
}

impl<V> Default for FieldOptions<V> {
    fn default() -> Self {
        Self {
            label: String::new(),
            initial_value: None,
            deferred_validation_time: DEFAULT_DEFERRED_VALIDATION_TIME,
            disabled: false,
            validator: None,
        }
    }
}

impl<V: CandidateValue> FieldOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_initial_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn with_deferred_validation_time(mut self, delay: Duration) -> Self {
        self.deferred_validation_time = delay;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_validator<T>(mut self, validator: T) -> Self
    where
        T: Validator<V> + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_shared_validator(mut self, validator: Arc<dyn Validator<V>>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub(crate) fn pipeline(&self, binding: HostBinding) -> Result<DeferredValidation<V>, FieldError> {
        DeferredValidation::new(
            binding,
            self.validator.clone(),
            self.initial_value.clone(),
            self.deferred_validation_time,
        )
    }
}

impl<V> fmt::Debug for FieldOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("label", &self.label)
            .field("initial_value", &self.initial_value)
            .field("deferred_validation_time", &self.deferred_validation_time)
            .field("disabled", &self.disabled)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
