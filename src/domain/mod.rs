mod outcome;
mod value;

pub use outcome::{PendingMessage, ValidationOutcome, ValidationReply, Validator};
pub use value::{
    Alignment, CandidateValue, MalformedRange, PropertyValue, RangeValue, UnknownAlignment,
    property_text,
};
