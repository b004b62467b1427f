use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    AlignPicker,
    DropDownSelect,
    SliderRange,
}

/// Behaviour every property field exposes to its host, whatever its widget.
pub trait PropertyField: std::fmt::Debug {
    fn kind(&self) -> FieldKind;

    /// Unique key used to derive element ids.
    fn key(&self) -> &str;

    fn label(&self) -> &str;

    fn target_property(&self) -> &str;

    fn display_value(&self) -> String;

    /// Current error text; `None` means nothing is shown.
    fn error_message(&self) -> Option<String>;

    fn is_disabled(&self) -> bool;

    /// A debounce timer is armed or a validation is still running.
    fn is_pending(&self) -> bool;

    fn dispose(&mut self);

    fn element_id(&self, part: &str) -> String {
        format!("{part}-{}", self.key())
    }
}
