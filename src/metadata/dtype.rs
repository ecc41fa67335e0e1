use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::MetadataError;

static NULL_RE: Lazy<Regex> = Lazy::new(|| build(r"^(NA|NULL|#N/A|NaN)$"));
static BOOL_RE: Lazy<Regex> = Lazy::new(|| build(r"^(true|True|TRUE|false|False|FALSE)$"));
// ASCII digits only, matching what the numeric parsers accept.
static INT_RE: Lazy<Regex> = Lazy::new(|| build(r"^[+\-]?[0-9]+$"));
static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    build(r"^[+\-]?([0-9]+(\.[0-9]*)?|\.[0-9]+|[0-9]+(\.[0-9]*)?[eE][+\-]?[0-9]+)$")
});

// Patterns are literals; a failure here is a programming error caught by the unit tests.
fn build(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid annotation token pattern {pattern}: {e}"),
    }
}

/// Value type of a sample annotation.
///
/// Variants form the lattice `Null < Bool < Int < Float < String`. When two
/// sources disagree about a key, the larger type wins so that every raw value
/// still converts without losing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dtype {
    /// Empty string or a recognized missing-value token
    Null,
    /// `true` / `false` in one of the accepted spellings
    Bool,
    /// Optionally signed decimal integer
    Int,
    /// Decimal or exponential floating point number
    Float,
    /// Anything else
    String,
}

impl Dtype {
    /// All variants in lattice order.
    pub const ALL: [Dtype; 5] = [
        Dtype::Null,
        Dtype::Bool,
        Dtype::Int,
        Dtype::Float,
        Dtype::String,
    ];

    /// Position of the type in the lattice.
    pub fn rank(self) -> u8 {
        match self {
            Dtype::Null => 0,
            Dtype::Bool => 1,
            Dtype::Int => 2,
            Dtype::Float => 3,
            Dtype::String => 4,
        }
    }

    /// Name used in the `sampleMetadataTypes.annotationType` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Null => "NULL",
            Dtype::Bool => "BOOL",
            Dtype::Int => "INT",
            Dtype::Float => "FLOAT",
            Dtype::String => "STRING",
        }
    }

    /// Classify a raw annotation token.
    ///
    /// Checks run in lattice order and the first match wins, so `"NA"` is
    /// `Null` and `"1"` is `Int` even though both would also be valid strings.
    /// Integer literals outside the `i64` range are `Float`.
    pub fn infer(raw: &str) -> Dtype {
        if raw.is_empty() || NULL_RE.is_match(raw) {
            Dtype::Null
        } else if BOOL_RE.is_match(raw) {
            Dtype::Bool
        } else if INT_RE.is_match(raw) {
            if raw.parse::<i64>().is_ok() {
                Dtype::Int
            } else {
                Dtype::Float
            }
        } else if FLOAT_RE.is_match(raw) {
            Dtype::Float
        } else {
            Dtype::String
        }
    }

    /// Convert `raw` to a value of this type.
    ///
    /// `raw` conforms when its own inferred type is at or below `self`. Null
    /// tokens therefore convert to [`TypedValue::Null`] for every type, and
    /// booleans widen to `1`/`0` for numeric types.
    pub fn convert(self, raw: &str) -> Result<TypedValue, MetadataError> {
        let observed = Dtype::infer(raw);
        if observed > self {
            return Err(self.conversion_error(raw));
        }

        let value = match (self, observed) {
            (_, Dtype::Null) => TypedValue::Null,
            (Dtype::String, _) => TypedValue::String(raw.to_string()),
            (Dtype::Bool, Dtype::Bool) => TypedValue::Bool(parse_bool(raw)),
            (Dtype::Int, Dtype::Bool) => TypedValue::Int(i64::from(parse_bool(raw))),
            (Dtype::Int, Dtype::Int) => TypedValue::Int(
                raw.parse::<i64>()
                    .map_err(|_| self.conversion_error(raw))?,
            ),
            (Dtype::Float, Dtype::Bool) => {
                TypedValue::Float(if parse_bool(raw) { 1.0 } else { 0.0 })
            }
            (Dtype::Float, _) => TypedValue::Float(
                raw.parse::<f64>()
                    .map_err(|_| self.conversion_error(raw))?,
            ),
            _ => return Err(self.conversion_error(raw)),
        };
        Ok(value)
    }

    /// Compare against a type given by name.
    ///
    /// Fails with [`MetadataError::UnknownDtype`] when `other` names no type.
    pub fn try_cmp(self, other: &str) -> Result<Ordering, MetadataError> {
        let other: Dtype = other.parse()?;
        Ok(self.cmp(&other))
    }

    fn conversion_error(self, raw: &str) -> MetadataError {
        MetadataError::Conversion {
            value: raw.to_string(),
            dtype: self,
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Classify a raw annotation token. See [`Dtype::infer`].
pub fn infer_type(raw: &str) -> Dtype {
    Dtype::infer(raw)
}

impl PartialOrd for Dtype {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dtype {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dtype::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| MetadataError::UnknownDtype(s.to_string()))
    }
}

/// An annotation value converted with its key's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Raw text
    String(String),
}

impl TypedValue {
    /// Returns true for a missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("NA"),
            TypedValue::Bool(v) => write!(f, "{v}"),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::String(v) => f.write_str(v),
        }
    }
}
