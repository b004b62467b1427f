use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

/// Result of a single validation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    /// Empty and absent messages both mean "valid".
    pub fn from_message(message: Option<String>) -> Self {
        match message {
            Some(text) if !text.is_empty() => ValidationOutcome::Invalid(text),
            _ => ValidationOutcome::Valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(message) => Some(message),
        }
    }
}

pub type PendingMessage = Pin<Box<dyn Future<Output = Option<String>> + Send + 'static>>;

/// What a validator hands back: an error message now, or one later.
pub enum ValidationReply {
    Immediate(Option<String>),
    Deferred(PendingMessage),
}

impl ValidationReply {
    pub fn valid() -> Self {
        ValidationReply::Immediate(None)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationReply::Immediate(Some(message.into()))
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Option<String>> + Send + 'static,
    {
        ValidationReply::Deferred(Box::pin(future))
    }
}

impl fmt::Debug for ValidationReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReply::Immediate(message) => {
                f.debug_tuple("Immediate").field(message).finish()
            }
            ValidationReply::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<String> for ValidationReply {
    fn from(message: String) -> Self {
        ValidationReply::Immediate(Some(message))
    }
}

impl From<&str> for ValidationReply {
    fn from(message: &str) -> Self {
        ValidationReply::Immediate(Some(message.to_string()))
    }
}

impl From<Option<String>> for ValidationReply {
    fn from(message: Option<String>) -> Self {
        ValidationReply::Immediate(message)
    }
}

/// Caller-supplied check producing an error message for a candidate value.
pub trait Validator<V>: Send + Sync {
    fn error_message(&self, value: &V) -> ValidationReply;
}

impl<V, F> Validator<V> for F
where
    F: Fn(&V) -> ValidationReply + Send + Sync,
{
    fn error_message(&self, value: &V) -> ValidationReply {
        self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_counts_as_valid() {
        assert_eq!(
            ValidationOutcome::from_message(Some(String::new())),
            ValidationOutcome::Valid
        );
        assert_eq!(ValidationOutcome::from_message(None), ValidationOutcome::Valid);
        assert_eq!(
            ValidationOutcome::from_message(Some("too short".into())).message(),
            Some("too short")
        );
    }

    #[test]
    fn closures_are_validators() {
        let validator = |value: &String| {
            if value.is_empty() {
                ValidationReply::invalid("required")
            } else {
                ValidationReply::valid()
            }
        };
        match validator.error_message(&String::new()) {
            ValidationReply::Immediate(Some(message)) => assert_eq!(message, "required"),
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
