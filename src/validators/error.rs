use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid JSON schema: {message}")]
    Schema { message: String },

    #[error("range bounds are reversed: {min} > {max}")]
    ReversedBounds { min: f64, max: f64 },
}
