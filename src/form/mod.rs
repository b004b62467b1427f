mod align_picker;
mod base;
mod dropdown_select;
mod ids;
mod options;
mod slider_range;

pub use align_picker::{AlignPickerField, AlignPickerState};
pub use base::{FieldKind, PropertyField};
pub use dropdown_select::{DropDownSelectField, DropDownSelectState, DropdownOption};
pub use ids::{IdGenerator, IdStyle, SequentialIds, UlidIds};
pub use options::{DEFAULT_DEFERRED_VALIDATION_TIME, FieldOptions};
pub use slider_range::{
    Orientation, SliderConfig, SliderRangeField, SliderRangeState, initial_labels,
};
