use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    CandidateValue, PropertyValue, RangeValue, ValidationReply, Validator, property_text,
};

use super::error::RuleError;
use super::schema::SchemaRule;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Declarative validator, as read from configuration documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorSpec {
    pub required: bool,
    pub pattern: Option<String>,
    pub min_selected: Option<usize>,
    pub max_selected: Option<usize>,
    pub within: Option<Bounds>,
    pub schema: Option<Value>,
    /// Replaces whatever message the failing rule produced.
    pub message: Option<String>,
    /// When non-zero the reply is deferred by this many milliseconds.
    pub latency_ms: u64,
}

impl ValidatorSpec {
    pub fn compile(&self) -> Result<RuleValidator, RuleError> {
        let pattern = self
            .pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| RuleError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;
        if let Some(bounds) = self.within
            && bounds.min > bounds.max
        {
            return Err(RuleError::ReversedBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        let schema = self
            .schema
            .as_ref()
            .map(SchemaRule::compile)
            .transpose()?
            .map(Arc::new);
        Ok(RuleValidator {
            required: self.required,
            pattern,
            min_selected: self.min_selected,
            max_selected: self.max_selected,
            within: self.within,
            schema,
            message: self.message.clone(),
            latency: Duration::from_millis(self.latency_ms),
        })
    }
}

/// Compiled [`ValidatorSpec`]. Works for every candidate type by checking
/// the candidate's property form.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    required: bool,
    pattern: Option<Regex>,
    min_selected: Option<usize>,
    max_selected: Option<usize>,
    within: Option<Bounds>,
    schema: Option<Arc<SchemaRule>>,
    message: Option<String>,
    latency: Duration,
}

impl RuleValidator {
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// First failing rule's message, or `None` when every rule passes.
    pub fn check(&self, value: &PropertyValue) -> Option<String> {
        self.first_failure(value)
            .map(|failure| self.message.clone().unwrap_or(failure))
    }

    fn first_failure(&self, value: &PropertyValue) -> Option<String> {
        if self.required && is_blank(value) {
            return Some("A value is required.".to_string());
        }
        if let Some(pattern) = &self.pattern {
            let texts: Vec<String> = match value {
                Value::Array(items) => items.iter().map(property_text).collect(),
                other => vec![property_text(other)],
            };
            if let Some(text) = texts.iter().find(|text| !pattern.is_match(text)) {
                return Some(format!("'{text}' does not match {}", pattern.as_str()));
            }
        }
        if let Value::Array(items) = value {
            if let Some(min) = self.min_selected
                && items.len() < min
            {
                return Some(format!("Select at least {min} option(s)."));
            }
            if let Some(max) = self.max_selected
                && items.len() > max
            {
                return Some(format!("Select at most {max} option(s)."));
            }
        }
        if let Some(bounds) = self.within
            && let Some(range) = value.as_str().and_then(|text| text.parse::<RangeValue>().ok())
            && (range.min < bounds.min || range.max > bounds.max)
        {
            return Some(format!(
                "Range must stay within {} and {}.",
                bounds.min, bounds.max
            ));
        }
        if let Some(schema) = &self.schema {
            return schema.first_error(value);
        }
        None
    }
}

fn is_blank(value: &PropertyValue) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl<V: CandidateValue> Validator<V> for RuleValidator {
    fn error_message(&self, value: &V) -> ValidationReply {
        let message = self.check(&value.to_property());
        if self.latency.is_zero() {
            return ValidationReply::Immediate(message);
        }
        let latency = self.latency;
        ValidationReply::deferred(async move {
            tokio::time::sleep(latency).await;
            message
        })
    }
}
