#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod form;
pub mod host;
pub mod io;
pub mod pipeline;
pub mod validators;

pub use domain::{
    Alignment, CandidateValue, PropertyValue, RangeValue, ValidationReply, Validator,
};
pub use form::{
    AlignPickerField, DropDownSelectField, FieldOptions, PropertyField, SliderRangeField,
};
pub use host::{HostBinding, SharedProperties};
pub use pipeline::{DeferredValidation, FieldError};

pub mod prelude {
    pub use super::app::{Replay, ReplayReport, Scenario};
    pub use super::form::{DropdownOption, IdStyle, SliderConfig, UlidIds};
    pub use super::validators::ValidatorSpec;
    pub use super::{
        AlignPickerField, Alignment, DropDownSelectField, FieldError, FieldOptions, HostBinding,
        PropertyField, RangeValue, SharedProperties, SliderRangeField, ValidationReply, Validator,
    };
}
