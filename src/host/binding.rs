use std::fmt;
use std::sync::Arc;

use crate::domain::PropertyValue;
use crate::pipeline::FieldError;

use super::properties::SharedProperties;

pub type ChangeCallback =
    Arc<dyn Fn(&str, Option<&PropertyValue>, &PropertyValue) -> anyhow::Result<()> + Send + Sync>;
pub type RenderCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;
pub type ErrorBoundary = Arc<dyn Fn(&FieldError) + Send + Sync>;

/// Everything a field may touch on its host.
#[derive(Clone)]
pub struct HostBinding {
    pub(crate) properties: SharedProperties,
    pub(crate) target_property: String,
    pub(crate) on_property_changed: Option<ChangeCallback>,
    pub(crate) render: Option<RenderCallback>,
    pub(crate) disable_reactive_property_changes: bool,
    pub(crate) error_boundary: Option<ErrorBoundary>,
}

impl HostBinding {
    pub fn new(properties: SharedProperties, target_property: impl Into<String>) -> Self {
        Self {
            properties,
            target_property: target_property.into(),
            on_property_changed: None,
            render: None,
            disable_reactive_property_changes: false,
            error_boundary: None,
        }
    }

    pub fn with_on_property_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, Option<&PropertyValue>, &PropertyValue) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.on_property_changed = Some(Arc::new(callback));
        self
    }

    pub fn with_render<F>(mut self, callback: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(callback));
        self
    }

    pub fn with_reactive_property_changes(mut self, enabled: bool) -> Self {
        self.disable_reactive_property_changes = !enabled;
        self
    }

    /// Receives host-callback failures from timer-driven commits, which have
    /// no caller to return them to.
    pub fn with_error_boundary<F>(mut self, boundary: F) -> Self
    where
        F: Fn(&FieldError) + Send + Sync + 'static,
    {
        self.error_boundary = Some(Arc::new(boundary));
        self
    }

    pub fn properties(&self) -> &SharedProperties {
        &self.properties
    }

    pub fn target_property(&self) -> &str {
        &self.target_property
    }

    pub fn is_reactive(&self) -> bool {
        !self.disable_reactive_property_changes
    }

    pub(crate) fn report(&self, error: &FieldError) {
        match &self.error_boundary {
            Some(boundary) => boundary(error),
            None => tracing::error!(property = %self.target_property, "{error}"),
        }
    }
}

impl fmt::Debug for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBinding")
            .field("target_property", &self.target_property)
            .field("on_property_changed", &self.on_property_changed.is_some())
            .field("render", &self.render.is_some())
            .field(
                "disable_reactive_property_changes",
                &self.disable_reactive_property_changes,
            )
            .finish_non_exhaustive()
    }
}
