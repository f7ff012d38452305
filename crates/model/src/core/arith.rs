//! Assignment casts and `+` over the constant types that can key a range partition.

use crate::core::{
    data_type::{DataType, NumericTypmod},
    error::ValueError,
    interval::Interval,
    value::{Numeric, Temporal, Value},
};
use bigdecimal::{RoundingMode, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::str::FromStr;

impl Value {
    /// Casts the constant to `target` with assignment semantics: integers are
    /// range checked, decimals are rounded half away from zero to the column
    /// scale, floats round half to even into integers, and text is parsed.
    pub fn cast_to(&self, target: &DataType) -> Result<Value, ValueError> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        match target {
            DataType::Int2 => {
                let v = self.to_integer(target)?;
                i16::try_from(v)
                    .map(Value::Int2)
                    .map_err(|_| out_of_range(target))
            }
            DataType::Int4 => {
                let v = self.to_integer(target)?;
                i32::try_from(v)
                    .map(Value::Int4)
                    .map_err(|_| out_of_range(target))
            }
            DataType::Int8 => self.to_integer(target).map(Value::Int8),
            DataType::Numeric(typmod) => {
                let n = match self {
                    Value::Text(s) => {
                        Numeric::from_str(s).map_err(|_| invalid_input(target, s))?
                    }
                    other => other
                        .to_numeric()
                        .ok_or_else(|| self.not_castable(target))?,
                };
                apply_typmod(n, *typmod).map(Value::Numeric)
            }
            DataType::Float4 => {
                let v = self.to_float(target)?;
                let narrowed = v as f32;
                if v.is_finite() && narrowed.is_infinite() {
                    return Err(out_of_range(target));
                }
                Ok(Value::Float4(narrowed))
            }
            DataType::Float8 => self.to_float(target).map(Value::Float8),
            DataType::Date => match self {
                Value::Date(_) => Ok(self.clone()),
                Value::Text(s) => parse_date(s).map(Value::Date),
                _ => {
                    let ts = self.to_timestamp().ok_or_else(|| self.not_castable(target))?;
                    Ok(Value::Date(ts.map(|t| t.date())))
                }
            },
            DataType::Timestamp => match self {
                Value::Text(s) => parse_timestamp(s).map(Value::Timestamp),
                _ => self
                    .to_timestamp()
                    .map(Value::Timestamp)
                    .ok_or_else(|| self.not_castable(target)),
            },
            DataType::TimestampTz => match self {
                Value::TimestampTz(_) => Ok(self.clone()),
                Value::Text(s) => parse_timestamptz(s).map(Value::TimestampTz),
                _ => {
                    let ts = self.to_timestamp().ok_or_else(|| self.not_castable(target))?;
                    Ok(Value::TimestampTz(ts.map(|t| t.and_utc())))
                }
            },
            DataType::Interval => match self {
                Value::Interval(_) => Ok(self.clone()),
                Value::Text(s) => Interval::parse(s).map(Value::Interval),
                _ => Err(self.not_castable(target)),
            },
            DataType::Bool => match self {
                Value::Bool(_) => Ok(self.clone()),
                Value::Text(s) => match s.trim().to_lowercase().as_str() {
                    "t" | "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                    "f" | "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                    _ => Err(invalid_input(target, s)),
                },
                _ => Err(self.not_castable(target)),
            },
            DataType::Text | DataType::VarChar | DataType::Char | DataType::Name => match self {
                Value::Text(_) => Ok(self.clone()),
                other => Ok(Value::Text(other.to_string().trim_matches('\'').to_string())),
            },
            DataType::RegClass | DataType::Custom(_) => match self {
                Value::Text(_) => Ok(self.clone()),
                _ => Err(self.not_castable(target)),
            },
        }
    }

    /// Evaluates `self + rhs` with the result type the operator would pick:
    /// the wider integer, decimal when either side is decimal, `float8` for mixed
    /// floats, and a timestamp for `date + interval`.
    pub fn checked_add(&self, rhs: &Value) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Int2(a), Value::Int2(b)) => a
                .checked_add(*b)
                .map(Value::Int2)
                .ok_or_else(|| out_of_range(&DataType::Int2)),
            (Value::Int2(_) | Value::Int4(_), Value::Int2(_) | Value::Int4(_)) => {
                let sum = self.as_i64().unwrap_or_default() + rhs.as_i64().unwrap_or_default();
                i32::try_from(sum)
                    .map(Value::Int4)
                    .map_err(|_| out_of_range(&DataType::Int4))
            }
            (a, b) if a.as_i64().is_some() && b.as_i64().is_some() => a
                .as_i64()
                .zip(b.as_i64())
                .and_then(|(x, y)| x.checked_add(y))
                .map(Value::Int8)
                .ok_or_else(|| out_of_range(&DataType::Int8)),
            (Value::Float4(a), Value::Float4(b)) => {
                let sum = a + b;
                if sum.is_infinite() && a.is_finite() && b.is_finite() {
                    return Err(out_of_range(&DataType::Float4));
                }
                Ok(Value::Float4(sum))
            }
            (Value::Float4(_) | Value::Float8(_), _) | (_, Value::Float4(_) | Value::Float8(_))
                if self.to_f64().is_some() && rhs.to_f64().is_some() =>
            {
                let a = self.to_f64().unwrap_or(f64::NAN);
                let b = rhs.to_f64().unwrap_or(f64::NAN);
                let sum = a + b;
                if sum.is_infinite() && a.is_finite() && b.is_finite() {
                    return Err(out_of_range(&DataType::Float8));
                }
                Ok(Value::Float8(sum))
            }
            (Value::Numeric(_), _) | (_, Value::Numeric(_))
                if self.as_i64().is_some() || rhs.as_i64().is_some() || both_numeric(self, rhs) =>
            {
                match (self.to_numeric(), rhs.to_numeric()) {
                    (Some(Numeric::Finite(a)), Some(Numeric::Finite(b))) => {
                        Ok(Value::Numeric(Numeric::Finite(a + b)))
                    }
                    (Some(_), Some(_)) => Ok(Value::Numeric(Numeric::NaN)),
                    _ => Err(no_operator(self, rhs)),
                }
            }
            (Value::Date(d), step) if step.as_i64().is_some() => {
                let days = step.as_i64().unwrap_or_default();
                match d {
                    Temporal::Finite(date) => TimeDelta::try_days(days)
                        .and_then(|delta| date.checked_add_signed(delta))
                        .map(|next| Value::Date(Temporal::Finite(next)))
                        .ok_or_else(|| out_of_range(&DataType::Date)),
                    other => Ok(Value::Date(*other)),
                }
            }
            (Value::Date(_) | Value::Timestamp(_), Value::Interval(step)) => {
                let ts = self.to_timestamp().ok_or_else(|| no_operator(self, rhs))?;
                add_interval(ts, step)
                    .map(Value::Timestamp)
                    .ok_or_else(|| out_of_range(&DataType::Timestamp))
            }
            (Value::TimestampTz(ts), Value::Interval(step)) => {
                add_interval(ts.map(|t| t.naive_utc()), step)
                    .map(|t| Value::TimestampTz(t.map(|n| n.and_utc())))
                    .ok_or_else(|| out_of_range(&DataType::TimestampTz))
            }
            (Value::Interval(a), Value::Interval(b)) => Ok(Value::Interval(Interval::new(
                a.months.saturating_add(b.months),
                a.days.saturating_add(b.days),
                a.micros.saturating_add(b.micros),
            ))),
            _ => Err(no_operator(self, rhs)),
        }
    }

    fn to_integer(&self, target: &DataType) -> Result<i64, ValueError> {
        match self {
            Value::Int2(_) | Value::Int4(_) | Value::Int8(_) => {
                Ok(self.as_i64().unwrap_or_default())
            }
            Value::Numeric(Numeric::NaN) => Err(ValueError::NotFinite(
                "NaN".to_string(),
                target.name().into_owned(),
            )),
            Value::Numeric(Numeric::Finite(d)) => d
                .with_scale_round(0, RoundingMode::HalfUp)
                .to_i64()
                .ok_or_else(|| out_of_range(target)),
            Value::Float4(_) | Value::Float8(_) => {
                let v = self.to_f64().unwrap_or(f64::NAN);
                if !v.is_finite() {
                    return Err(ValueError::NotFinite(v.to_string(), target.name().into_owned()));
                }
                let rounded = v.round_ties_even();
                if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Err(out_of_range(target));
                }
                Ok(rounded as i64)
            }
            Value::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                if s.trim().chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+') {
                    out_of_range(target)
                } else {
                    invalid_input(target, s)
                }
            }),
            _ => Err(self.not_castable(target)),
        }
    }

    fn to_float(&self, target: &DataType) -> Result<f64, ValueError> {
        match self {
            Value::Text(s) => {
                let trimmed = s.trim();
                match trimmed.to_lowercase().as_str() {
                    "infinity" | "inf" | "+infinity" => Ok(f64::INFINITY),
                    "-infinity" | "-inf" => Ok(f64::NEG_INFINITY),
                    "nan" => Ok(f64::NAN),
                    _ => trimmed.parse::<f64>().map_err(|_| invalid_input(target, s)),
                }
            }
            other => other.to_f64().ok_or_else(|| self.not_castable(target)),
        }
    }

    fn not_castable(&self, target: &DataType) -> ValueError {
        ValueError::CannotCast {
            from: self.data_type().name().into_owned(),
            to: target.name().into_owned(),
        }
    }
}

fn apply_typmod(n: Numeric, typmod: Option<NumericTypmod>) -> Result<Numeric, ValueError> {
    let (Numeric::Finite(d), Some(m)) = (&n, typmod) else {
        return Ok(n);
    };
    let rounded = d.with_scale_round(m.scale as i64, RoundingMode::HalfUp);
    let integral_digits = rounded
        .with_scale_round(0, RoundingMode::Down)
        .abs()
        .to_string()
        .trim_start_matches('0')
        .len() as u32;
    if integral_digits > m.precision.saturating_sub(m.scale) {
        return Err(ValueError::NumericFieldOverflow {
            precision: m.precision,
            scale: m.scale,
        });
    }
    Ok(Numeric::Finite(rounded))
}

fn add_interval(
    ts: Temporal<NaiveDateTime>,
    step: &Interval,
) -> Option<Temporal<NaiveDateTime>> {
    match ts {
        Temporal::Finite(t) => step.add_to(t).map(Temporal::Finite),
        other => Some(other),
    }
}

fn parse_date(s: &str) -> Result<Temporal<NaiveDate>, ValueError> {
    let trimmed = s.trim();
    match trimmed.to_lowercase().as_str() {
        "infinity" | "+infinity" => return Ok(Temporal::Infinity),
        "-infinity" => return Ok(Temporal::NegInfinity),
        _ => {}
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Temporal::Finite(d));
    }
    // A timestamp literal assigned to a date keeps the date part.
    parse_timestamp(trimmed)
        .map(|ts| ts.map(|t| t.date()))
        .map_err(|_| invalid_input(&DataType::Date, s))
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_timestamp(s: &str) -> Result<Temporal<NaiveDateTime>, ValueError> {
    let trimmed = s.trim();
    match trimmed.to_lowercase().as_str() {
        "infinity" | "+infinity" => return Ok(Temporal::Infinity),
        "-infinity" => return Ok(Temporal::NegInfinity),
        _ => {}
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Temporal::Finite(ts));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| Temporal::Finite(d.and_time(NaiveTime::MIN)))
        .map_err(|_| invalid_input(&DataType::Timestamp, s))
}

fn parse_timestamptz(s: &str) -> Result<Temporal<DateTime<Utc>>, ValueError> {
    let trimmed = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(trimmed, format) {
            return Ok(Temporal::Finite(ts.with_timezone(&Utc)));
        }
    }
    parse_timestamp(trimmed)
        .map(|ts| ts.map(|t| t.and_utc()))
        .map_err(|_| invalid_input(&DataType::TimestampTz, s))
}

fn out_of_range(target: &DataType) -> ValueError {
    ValueError::OutOfRange(target.name().into_owned())
}

fn invalid_input(target: &DataType, input: &str) -> ValueError {
    ValueError::InvalidInput {
        type_name: target.name().into_owned(),
        input: input.to_string(),
    }
}

fn no_operator(left: &Value, right: &Value) -> ValueError {
    ValueError::NoOperator {
        left: left.data_type().name().into_owned(),
        right: right.data_type().name().into_owned(),
    }
}

fn both_numeric(a: &Value, b: &Value) -> bool {
    matches!((a, b), (Value::Numeric(_), Value::Numeric(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32) -> Value {
        Value::Timestamp(Temporal::Finite(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_time(NaiveTime::MIN),
        ))
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(Value::Int8(300).cast_to(&DataType::Int2).unwrap(), Value::Int2(300));
        assert!(matches!(
            Value::Int8(70_000).cast_to(&DataType::Int2),
            Err(ValueError::OutOfRange(_))
        ));
        assert_eq!(Value::Float8(2.5).cast_to(&DataType::Int4).unwrap(), Value::Int4(2));
        assert_eq!(
            Value::numeric("2.5").unwrap().cast_to(&DataType::Int4).unwrap(),
            Value::Int4(3)
        );
        assert_eq!(Value::text(" 42 ").cast_to(&DataType::Int8).unwrap(), Value::Int8(42));
    }

    #[test]
    fn test_numeric_scale_rounding() {
        let target = DataType::Numeric(Some(NumericTypmod {
            precision: 5,
            scale: 2,
        }));
        assert_eq!(
            Value::numeric("1.005").unwrap().cast_to(&target).unwrap(),
            Value::numeric("1.01").unwrap()
        );
        assert!(matches!(
            Value::numeric("1000").unwrap().cast_to(&target),
            Err(ValueError::NumericFieldOverflow { .. })
        ));
    }

    #[test]
    fn test_text_to_temporal() {
        assert_eq!(
            Value::text("2020-02-01").cast_to(&DataType::Date).unwrap(),
            Value::date(2020, 2, 1).unwrap()
        );
        assert_eq!(
            Value::text("infinity").cast_to(&DataType::Timestamp).unwrap(),
            Value::Timestamp(Temporal::Infinity)
        );
        assert_eq!(
            Value::text("1 month").cast_to(&DataType::Interval).unwrap(),
            Value::Interval(Interval::months(1))
        );
        assert!(Value::text("yesterday-ish").cast_to(&DataType::Date).is_err());
    }

    #[test]
    fn test_integer_addition_widens() {
        assert_eq!(Value::Int4(1).checked_add(&Value::Int4(30)).unwrap(), Value::Int4(31));
        assert_eq!(
            Value::Int4(i32::MAX).checked_add(&Value::Int8(1)).unwrap(),
            Value::Int8(i32::MAX as i64 + 1)
        );
        assert!(Value::Int2(i16::MAX).checked_add(&Value::Int2(1)).is_err());
    }

    #[test]
    fn test_mixed_float_addition_is_float8() {
        let sum = Value::Float4(1.0)
            .checked_add(&Value::numeric("0.00001").unwrap())
            .unwrap();
        assert!(matches!(sum, Value::Float8(v) if (v - 1.00001).abs() < 1e-12));
    }

    #[test]
    fn test_date_plus_interval_is_timestamp() {
        let next = Value::date(2020, 1, 31)
            .unwrap()
            .checked_add(&Value::Interval(Interval::months(1)))
            .unwrap();
        assert_eq!(next, ts(2020, 2, 29));
        assert_eq!(next.cast_to(&DataType::Date).unwrap(), Value::date(2020, 2, 29).unwrap());
    }

    #[test]
    fn test_text_has_no_addition() {
        assert!(matches!(
            Value::text("a").checked_add(&Value::Int4(1)),
            Err(ValueError::NoOperator { .. })
        ));
    }
}
