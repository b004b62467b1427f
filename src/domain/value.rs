use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Value stored in a host's property bag.
pub type PropertyValue = Value;

/// A typed value proposed by a field after a user interaction.
///
/// Every candidate has a canonical `PropertyValue` form; that form is what the
/// commit gateway writes into the host's bag and what declarative rules
/// inspect.
pub trait CandidateValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn to_property(&self) -> PropertyValue;

    fn from_property(value: &PropertyValue) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alignment '{0}'")]
pub struct UnknownAlignment(pub String);

impl FromStr for Alignment {
    type Err = UnknownAlignment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(UnknownAlignment(other.to_string())),
        }
    }
}

impl CandidateValue for Alignment {
    fn to_property(&self) -> PropertyValue {
        Value::String(self.as_str().to_string())
    }

    fn from_property(value: &PropertyValue) -> Option<Self> {
        value.as_str().and_then(|text| text.parse().ok())
    }
}

/// Ordered list of selected option keys.
impl CandidateValue for Vec<String> {
    fn to_property(&self) -> PropertyValue {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }

    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// A `[min, max]` pair whose canonical form is `"min,max"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub min: f64,
    pub max: f64,
}

impl RangeValue {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn canonical(&self) -> String {
        format!("{},{}", self.min, self.max)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected 'min,max' but found '{0}'")]
pub struct MalformedRange(pub String);

impl FromStr for RangeValue {
    type Err = MalformedRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedRange(s.to_string());
        let (min, max) = s.split_once(',').ok_or_else(malformed)?;
        if max.contains(',') {
            return Err(malformed());
        }
        let min = min.trim().parse::<f64>().map_err(|_| malformed())?;
        let max = max.trim().parse::<f64>().map_err(|_| malformed())?;
        Ok(RangeValue { min, max })
    }
}

impl CandidateValue for RangeValue {
    fn to_property(&self) -> PropertyValue {
        Value::String(self.canonical())
    }

    fn from_property(value: &PropertyValue) -> Option<Self> {
        value.as_str().and_then(|text| text.parse().ok())
    }
}

/// Canonical text of a property value: strings verbatim, lists comma-joined.
pub fn property_text(value: &PropertyValue) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(property_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
