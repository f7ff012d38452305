use crate::core::{data_type::DataType, error::ValueError, value::Value};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// One edge of a range partition: a typed constant or an open-ended sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BoundaryValue {
    MinValue,
    Value(Value),
    MaxValue,
}

impl BoundaryValue {
    pub fn is_max(&self) -> bool {
        matches!(self, BoundaryValue::MaxValue)
    }

    pub fn is_min(&self) -> bool {
        matches!(self, BoundaryValue::MinValue)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            BoundaryValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `true` for a literal `NULL`, which is never a legal boundary.
    pub fn is_null(&self) -> bool {
        matches!(self, BoundaryValue::Value(Value::Null))
    }

    /// Casts the constant to the key type; sentinels pass through.
    pub fn cast_to(&self, target: &DataType) -> Result<BoundaryValue, ValueError> {
        match self {
            BoundaryValue::Value(v) => v.cast_to(target).map(BoundaryValue::Value),
            other => Ok(other.clone()),
        }
    }

    /// Sentinels order outside every constant. Two constants that cannot be
    /// compared (mismatched types, `NULL`) yield `None`.
    pub fn compare(&self, other: &BoundaryValue) -> Option<Ordering> {
        match (self, other) {
            (BoundaryValue::MinValue, BoundaryValue::MinValue)
            | (BoundaryValue::MaxValue, BoundaryValue::MaxValue) => Some(Ordering::Equal),
            (BoundaryValue::MinValue, _) | (_, BoundaryValue::MaxValue) => Some(Ordering::Less),
            (_, BoundaryValue::MinValue) | (BoundaryValue::MaxValue, _) => Some(Ordering::Greater),
            (BoundaryValue::Value(a), BoundaryValue::Value(b)) => a.compare(b),
        }
    }
}

impl From<Value> for BoundaryValue {
    fn from(value: Value) -> Self {
        BoundaryValue::Value(value)
    }
}

impl fmt::Display for BoundaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryValue::MinValue => write!(f, "MINVALUE"),
            BoundaryValue::Value(v) => write!(f, "{v}"),
            BoundaryValue::MaxValue => write!(f, "MAXVALUE"),
        }
    }
}
