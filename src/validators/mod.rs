mod error;
mod rules;
mod schema;

pub use error::RuleError;
pub use rules::{Bounds, RuleValidator, ValidatorSpec};
pub use schema::SchemaRule;
