use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a loaded dataset row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Missing cell
    Null,
}

/// Column type inferred from the values of a dataset column at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every present cell parses as a signed 64-bit integer
    Integer,
    /// Every present cell parses as a float
    Float,
    /// Anything else
    String,
}

impl ColumnType {
    /// Narrowest type that can hold `raw`.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        if raw.parse::<i64>().is_ok() {
            Self::Integer
        } else if raw.parse::<f64>().is_ok() {
            Self::Float
        } else {
            Self::String
        }
    }

    /// Smallest type able to hold values of both `self` and `other`.
    #[must_use]
    pub const fn widen(self, other: Self) -> Self {
        match (self, other) {
            (Self::String, _) | (_, Self::String) => Self::String,
            (Self::Float, _) | (_, Self::Float) => Self::Float,
            (Self::Integer, Self::Integer) => Self::Integer,
        }
    }

    /// Convert a raw cell into a value of this column type.
    ///
    /// Cells are expected to have been accepted by [`ColumnType::infer`] for a
    /// type no wider than `self`; anything unparseable degrades to a string.
    #[must_use]
    pub fn convert(self, raw: &str) -> FieldValue {
        match self {
            Self::Integer => raw
                .parse::<i64>()
                .map_or_else(|_| FieldValue::String(raw.to_string()), FieldValue::Integer),
            Self::Float => raw
                .parse::<f64>()
                .map_or_else(|_| FieldValue::String(raw.to_string()), FieldValue::Float),
            Self::String => FieldValue::String(raw.to_string()),
        }
    }

    /// Lowercase name used in schema dumps
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}
