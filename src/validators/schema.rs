use jsonschema::{Validator as SchemaValidator, validator_for};
use serde_json::Value;

use super::error::RuleError;

/// Compiled JSON Schema applied to a single property value.
pub struct SchemaRule {
    validator: SchemaValidator,
}

impl SchemaRule {
    pub fn compile(schema: &Value) -> Result<Self, RuleError> {
        let validator = validator_for(schema).map_err(|err| RuleError::Schema {
            message: err.to_string(),
        })?;
        Ok(Self { validator })
    }

    /// First violation, prefixed with its instance path when it has one.
    pub fn first_error(&self, value: &Value) -> Option<String> {
        self.validator.iter_errors(value).next().map(|error| {
            let pointer = error.instance_path.to_string();
            let message = error.to_string();
            if pointer.is_empty() {
                message
            } else {
                format!("{pointer}: {message}")
            }
        })
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl std::fmt::Debug for SchemaRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRule").finish_non_exhaustive()
    }
}
