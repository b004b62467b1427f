use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ValidationOutcome;

use super::token::TokenCounter;

/// Validation-owned part of a field's state.
///
/// Never edited in place: every transition builds the next value and the
/// slot installs it whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationState<V> {
    error: Option<String>,
    last_resolved: Option<V>,
    disposed: bool,
}

impl<V> Default for ValidationState<V> {
    fn default() -> Self {
        Self {
            error: None,
            last_resolved: None,
            disposed: false,
        }
    }
}

impl<V: Clone + PartialEq> ValidationState<V> {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }

    pub fn last_resolved(&self) -> Option<&V> {
        self.last_resolved.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn already_resolved(&self, value: &V) -> bool {
        self.last_resolved.as_ref() == Some(value)
    }

    pub(crate) fn resolved(&self, value: V, outcome: &ValidationOutcome) -> Self {
        Self {
            error: outcome.message().map(str::to_string),
            last_resolved: Some(value),
            disposed: self.disposed,
        }
    }

    pub(crate) fn disposed(&self) -> Self {
        Self {
            disposed: true,
            ..self.clone()
        }
    }
}

/// Shared between a field and the tasks validating on its behalf.
#[derive(Debug)]
pub(crate) struct ValidationSlot<V> {
    state: Mutex<ValidationState<V>>,
    pub(crate) tokens: TokenCounter,
}

impl<V: Clone + PartialEq> ValidationSlot<V> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(ValidationState::default()),
            tokens: TokenCounter::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> ValidationState<V> {
        self.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ValidationState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
