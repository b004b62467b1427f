use serde::Serialize;

use crate::domain::PropertyValue;
use crate::host::HostBinding;

use super::error::{CommitStage, FieldError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// Value written, host notified, and `rendered` says whether the forced
    /// re-render ran.
    Committed { next: PropertyValue, rendered: bool },
    /// No change callback on the host, or nothing to write.
    Skipped,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Writes accepted values into the host and tells it about them.
#[derive(Debug, Clone)]
pub struct CommitGateway {
    binding: HostBinding,
}

impl CommitGateway {
    pub fn new(binding: HostBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &HostBinding {
        &self.binding
    }

    /// Bag write, then change callback, then optional render. A failing
    /// callback is returned as is; the bag write is not undone.
    pub fn commit(
        &self,
        previous: Option<&PropertyValue>,
        next: Option<PropertyValue>,
    ) -> Result<CommitOutcome, FieldError> {
        let Some(on_changed) = self.binding.on_property_changed.as_ref() else {
            return Ok(CommitOutcome::Skipped);
        };
        let Some(next) = next.filter(|value| !value.is_null()) else {
            return Ok(CommitOutcome::Skipped);
        };
        let target = self.binding.target_property.as_str();

        self.binding.properties.set(target, next.clone());
        on_changed(target, previous, &next)
            .map_err(|error| FieldError::host(CommitStage::PropertyChanged, target, error))?;
        tracing::info!(property = target, value = %next, "property committed");

        let mut rendered = false;
        if !self.binding.disable_reactive_property_changes
            && let Some(render) = self.binding.render.as_ref()
        {
            render().map_err(|error| FieldError::host(CommitStage::Render, target, error))?;
            rendered = true;
        }
        Ok(CommitOutcome::Committed { next, rendered })
    }
}
