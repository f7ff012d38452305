use crate::core::{data_type::DataType, interval::Interval};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// An arbitrary-precision decimal, which unlike `BigDecimal` can hold `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Numeric {
    NaN,
    Finite(#[serde(with = "decimal_text")] BigDecimal),
}

/// Decimals travel as their text form so non-self-describing encoders can
/// read them back.
mod decimal_text {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigDecimal::from_str(&text).map_err(D::Error::custom)
    }
}

/// A date or timestamp that may also be one of the infinities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Temporal<T> {
    NegInfinity,
    Finite(T),
    Infinity,
}

/// A typed constant as it appears in a DDL statement: a default, a check
/// operand, or a partition boundary. `Text` is also used for untyped string
/// literals that are cast once the target type is known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Numeric(Numeric),
    Float4(f32),
    Float8(f64),
    Date(Temporal<NaiveDate>),
    Timestamp(Temporal<NaiveDateTime>),
    TimestampTz(Temporal<DateTime<Utc>>),
    Interval(Interval),
    Text(String),
}

impl Numeric {
    pub fn is_nan(&self) -> bool {
        matches!(self, Numeric::NaN)
    }

    /// Total order where `NaN` sorts above every number and equals itself.
    pub fn compare(&self, other: &Numeric) -> Ordering {
        match (self, other) {
            (Numeric::NaN, Numeric::NaN) => Ordering::Equal,
            (Numeric::NaN, _) => Ordering::Greater,
            (_, Numeric::NaN) => Ordering::Less,
            (Numeric::Finite(a), Numeric::Finite(b)) => a.cmp(b),
        }
    }
}

impl FromStr for Numeric {
    type Err = bigdecimal::ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("nan") {
            return Ok(Numeric::NaN);
        }
        BigDecimal::from_str(trimmed).map(Numeric::Finite)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::NaN => write!(f, "NaN"),
            Numeric::Finite(v) => write!(f, "{}", canonical(v)),
        }
    }
}

impl<T> Temporal<T> {
    pub fn is_finite(&self) -> bool {
        matches!(self, Temporal::Finite(_))
    }

    pub fn finite(&self) -> Option<&T> {
        match self {
            Temporal::Finite(v) => Some(v),
            _ => None,
        }
    }

    /// Maps the finite payload, keeping the infinities as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Temporal<U> {
        match self {
            Temporal::NegInfinity => Temporal::NegInfinity,
            Temporal::Finite(v) => Temporal::Finite(f(v)),
            Temporal::Infinity => Temporal::Infinity,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Temporal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::NegInfinity => write!(f, "-infinity"),
            Temporal::Finite(v) => write!(f, "{v}"),
            Temporal::Infinity => write!(f, "infinity"),
        }
    }
}

impl Value {
    pub fn int(v: i64) -> Self {
        match i32::try_from(v) {
            Ok(small) => Value::Int4(small),
            Err(_) => Value::Int8(v),
        }
    }

    /// Parses a decimal literal such as `1.5` or `NaN`.
    pub fn numeric(literal: &str) -> Option<Self> {
        Numeric::from_str(literal).ok().map(Value::Numeric)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Value::Date(Temporal::Finite(d)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `false` for numeric `NaN`, float infinities and infinite dates or timestamps.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Numeric(n) => !n.is_nan(),
            Value::Float4(v) => v.is_finite(),
            Value::Float8(v) => v.is_finite(),
            Value::Date(t) => t.is_finite(),
            Value::Timestamp(t) => t.is_finite(),
            Value::TimestampTz(t) => t.is_finite(),
            _ => true,
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Value::Numeric(n) => n.is_nan(),
            Value::Float4(v) => v.is_nan(),
            Value::Float8(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn is_infinite(&self) -> bool {
        match self {
            Value::Float4(v) => v.is_infinite(),
            Value::Float8(v) => v.is_infinite(),
            Value::Date(t) => !t.is_finite(),
            Value::Timestamp(t) => !t.is_finite(),
            Value::TimestampTz(t) => !t.is_finite(),
            _ => false,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int2(v) => Some(*v as i64),
            Value::Int4(v) => Some(*v as i64),
            Value::Int8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int2(v) => Some(*v as f64),
            Value::Int4(v) => Some(*v as f64),
            Value::Int8(v) => Some(*v as f64),
            Value::Numeric(Numeric::NaN) => Some(f64::NAN),
            Value::Numeric(Numeric::Finite(v)) => v.to_f64(),
            Value::Float4(v) => Some(*v as f64),
            Value::Float8(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts to a decimal. Floats keep only the digits their type guarantees
    /// (6 for `float4`, 15 for `float8`), so `0.1::float8` becomes exactly `0.1`.
    pub fn to_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int2(v) => Some(Numeric::Finite(BigDecimal::from(*v))),
            Value::Int4(v) => Some(Numeric::Finite(BigDecimal::from(*v))),
            Value::Int8(v) => Some(Numeric::Finite(BigDecimal::from(*v))),
            Value::Numeric(n) => Some(n.clone()),
            Value::Float4(v) => float_to_numeric(*v as f64, 6),
            Value::Float8(v) => float_to_numeric(*v, 15),
            _ => None,
        }
    }

    /// Promotes dates to midnight so dates and timestamps compare with each other.
    pub fn to_timestamp(&self) -> Option<Temporal<NaiveDateTime>> {
        match self {
            Value::Date(t) => Some(t.map(|d| d.and_time(chrono::NaiveTime::MIN))),
            Value::Timestamp(t) => Some(*t),
            Value::TimestampTz(t) => Some(t.map(|ts| ts.naive_utc())),
            _ => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Custom("unknown".to_string()),
            Value::Bool(_) => DataType::Bool,
            Value::Int2(_) => DataType::Int2,
            Value::Int4(_) => DataType::Int4,
            Value::Int8(_) => DataType::Int8,
            Value::Numeric(_) => DataType::Numeric(None),
            Value::Float4(_) => DataType::Float4,
            Value::Float8(_) => DataType::Float8,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::TimestampTz(_) => DataType::TimestampTz,
            Value::Interval(_) => DataType::Interval,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Compares two constants of compatible types. Integers, decimals and floats
    /// compare across widths; dates compare against timestamps. Returns `None`
    /// for incomparable pairs and for `NULL`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Interval(a), Interval(b)) => Some(a.cmp_span(b)),
            (a, b) if a.as_i64().is_some() && b.as_i64().is_some() => {
                Some(a.as_i64()?.cmp(&b.as_i64()?))
            }
            (Float4(_) | Float8(_), _) | (_, Float4(_) | Float8(_)) => {
                Some(float_cmp(self.to_f64()?, other.to_f64()?))
            }
            (Numeric(_), _) | (_, Numeric(_)) => {
                Some(self.to_numeric()?.compare(&other.to_numeric()?))
            }
            (TimestampTz(a), TimestampTz(b)) => Some(a.cmp(b)),
            _ => Some(self.to_timestamp()?.cmp(&other.to_timestamp()?)),
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

/// Float ordering with `NaN` above every number, equal to itself.
fn float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn float_to_numeric(v: f64, digits: usize) -> Option<Numeric> {
    if v.is_nan() {
        return Some(Numeric::NaN);
    }
    if v.is_infinite() {
        return None;
    }
    let rendered = format!("{:.*e}", digits.saturating_sub(1), v);
    BigDecimal::from_str(&rendered)
        .ok()
        .map(|d| Numeric::Finite(canonical(&d)))
}

/// Strips trailing fractional zeros without switching to exponent form.
pub fn canonical(d: &BigDecimal) -> BigDecimal {
    let n = d.normalized();
    let (_, scale) = n.as_bigint_and_exponent();
    if scale < 0 { n.with_scale(0) } else { n }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int2(v) => write!(f, "{v}"),
            Value::Int4(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Numeric(Numeric::NaN) => write!(f, "'NaN'"),
            Value::Numeric(n) => write!(f, "{n}"),
            Value::Float4(v) => write_float(f, *v as f64, &v.to_string()),
            Value::Float8(v) => write_float(f, *v, &v.to_string()),
            Value::Date(v) => write!(f, "'{v}'"),
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::TimestampTz(Temporal::Finite(v)) => {
                write!(f, "'{}'", v.format("%Y-%m-%d %H:%M:%S%.f+00"))
            }
            Value::TimestampTz(v) => write!(f, "'{v}'"),
            Value::Interval(v) => write!(f, "'{v}'"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64, shortest: &str) -> fmt::Result {
    if v.is_nan() {
        write!(f, "'NaN'")
    } else if v.is_infinite() && v > 0.0 {
        write!(f, "'Infinity'")
    } else if v.is_infinite() {
        write!(f, "'-Infinity'")
    } else {
        write!(f, "{shortest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_width_comparison() {
        assert_eq!(Value::Int2(5).compare(&Value::Int8(5)), Some(Ordering::Equal));
        assert_eq!(
            Value::Int4(1).compare(&Value::numeric("1.5").unwrap()),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Float8(2.0).compare(&Value::Int4(1)), Some(Ordering::Greater));
        assert_eq!(Value::Text("a".into()).compare(&Value::Int4(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_nan_sorts_last() {
        let nan = Value::Numeric(Numeric::NaN);
        assert_eq!(nan.compare(&Value::Int8(i64::MAX)), Some(Ordering::Greater));
        assert_eq!(nan.compare(&nan), Some(Ordering::Equal));
        assert!(!nan.is_finite());
    }

    #[test]
    fn test_date_against_timestamp() {
        let date = Value::date(2020, 1, 1).unwrap();
        let ts = Value::Timestamp(Temporal::Finite(
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap(),
        ));
        assert_eq!(date.compare(&ts), Some(Ordering::Less));
        assert_eq!(
            Value::Date(Temporal::Infinity).compare(&date),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_float_to_numeric_keeps_type_digits() {
        assert_eq!(
            Value::Float8(0.1).to_numeric(),
            Some(Numeric::Finite(BigDecimal::from_str("0.1").unwrap()))
        );
        assert_eq!(Value::Float8(f64::INFINITY).to_numeric(), None);
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Value::Text("it's".into()).to_string(), "'it''s'");
        assert_eq!(Value::date(2021, 3, 4).unwrap().to_string(), "'2021-03-04'");
        assert_eq!(Value::Float8(f64::INFINITY).to_string(), "'Infinity'");
        assert_eq!(Value::numeric("10.50").unwrap().to_string(), "10.5");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Value::Int4(7)).unwrap();
        assert_eq!(json, r#"{"Int4":7}"#);
        let back: Value = serde_json::from_str(r#"{"Text":"2020-01-01"}"#).unwrap();
        assert_eq!(back, Value::text("2020-01-01"));
    }
}
