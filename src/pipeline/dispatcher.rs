use std::sync::Arc;

use serde::Serialize;

use crate::domain::{CandidateValue, PropertyValue, ValidationOutcome, ValidationReply, Validator};

use super::error::FieldError;
use super::gateway::{CommitGateway, CommitOutcome};
use super::state::ValidationSlot;
use super::token::ValidationToken;

/// What happened to one dispatched candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The outcome became the field's state; `commit` is present only for
    /// valid outcomes.
    Applied {
        token: ValidationToken,
        outcome: ValidationOutcome,
        commit: Option<CommitOutcome>,
    },
    /// A newer candidate was scheduled before this one resolved.
    Stale { token: ValidationToken },
    /// The same value already went through the pipeline.
    Duplicate { token: ValidationToken },
    /// The field was torn down.
    Disposed,
}

impl DispatchOutcome {
    pub fn committed(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Applied {
                commit: Some(commit),
                ..
            } if commit.is_committed()
        )
    }
}

pub struct Dispatcher<V> {
    validator: Option<Arc<dyn Validator<V>>>,
    gateway: CommitGateway,
    initial_value: Option<PropertyValue>,
    slot: Arc<ValidationSlot<V>>,
}

impl<V: CandidateValue> Dispatcher<V> {
    pub(crate) fn new(
        validator: Option<Arc<dyn Validator<V>>>,
        gateway: CommitGateway,
        initial_value: Option<PropertyValue>,
        slot: Arc<ValidationSlot<V>>,
    ) -> Self {
        Self {
            validator,
            gateway,
            initial_value,
            slot,
        }
    }

    pub fn gateway(&self) -> &CommitGateway {
        &self.gateway
    }

    pub async fn validate(
        &self,
        token: ValidationToken,
        value: V,
    ) -> Result<DispatchOutcome, FieldError> {
        if let Some(skipped) = self.precheck(token, &value) {
            return Ok(skipped);
        }

        let outcome = match &self.validator {
            None => ValidationOutcome::Valid,
            Some(validator) => match validator.error_message(&value) {
                ValidationReply::Immediate(message) => ValidationOutcome::from_message(message),
                ValidationReply::Deferred(pending) => {
                    tracing::debug!(%token, "awaiting deferred validation");
                    ValidationOutcome::from_message(pending.await)
                }
            },
        };

        self.apply(token, value, outcome)
    }

    fn precheck(&self, token: ValidationToken, value: &V) -> Option<DispatchOutcome> {
        let state = self.slot.lock();
        if state.is_disposed() {
            return Some(DispatchOutcome::Disposed);
        }
        if !self.slot.tokens.is_latest(token) {
            tracing::trace!(%token, "dropping superseded candidate before validation");
            return Some(DispatchOutcome::Stale { token });
        }
        if state.already_resolved(value) {
            tracing::trace!(%token, ?value, "candidate already resolved");
            return Some(DispatchOutcome::Duplicate { token });
        }
        None
    }

    fn apply(
        &self,
        token: ValidationToken,
        value: V,
        outcome: ValidationOutcome,
    ) -> Result<DispatchOutcome, FieldError> {
        let property = value.to_property();
        {
            let mut state = self.slot.lock();
            if state.is_disposed() {
                return Ok(DispatchOutcome::Disposed);
            }
            if !self.slot.tokens.is_latest(token) {
                tracing::trace!(%token, "discarding stale validation result");
                return Ok(DispatchOutcome::Stale { token });
            }
            let next = state.resolved(value, &outcome);
            *state = next;
        }

        let commit = if outcome.is_valid() {
            Some(
                self.gateway
                    .commit(self.initial_value.as_ref(), Some(property))?,
            )
        } else {
            tracing::debug!(%token, message = outcome.message(), "candidate rejected");
            None
        };
        Ok(DispatchOutcome::Applied {
            token,
            outcome,
            commit,
        })
    }
}
