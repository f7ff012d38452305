//! Cuts one `START .. END .. EVERY ..` range into consecutive boundaries.

use super::PartitionKey;
use crate::{
    error::{DiagnosticExt, ElaborateError},
    invalid,
};
use model::core::{data_type::DataType, value::Value};
use std::cmp::Ordering;

const VALID_TYPES_HINT: &str = "Valid datatypes are: smallint, int, bigint, float4/real, float8/double, numeric, date and timestamp [with time zone].";

/// One START/END/EVERY entry, with operands already cast to the key type
/// (an interval for temporal keys).
#[derive(Debug, Clone)]
pub struct RangeSplitRequest<'a> {
    pub partition_name: &'a str,
    pub key: &'a PartitionKey,
    pub start: &'a Value,
    pub end: &'a Value,
    pub every: &'a Value,
    /// EVERY as written, before any cast.
    pub every_literal: &'a Value,
    /// Room left below the partition limit.
    pub max_partitions: usize,
    pub limit: usize,
}

/// Returns the upper boundaries of the generated partitions. The last one is
/// always `end`; a step that overshoots it yields a shorter final partition.
pub fn divide_start_end_every(request: &RangeSplitRequest<'_>) -> Result<Vec<Value>, ElaborateError> {
    let name = request.partition_name;
    let (start, end, every) = (request.start, request.end, request.every);

    let check_ambiguity = match &request.key.data_type {
        DataType::Numeric(_) => {
            if start.is_nan() || end.is_nan() || every.is_nan() {
                return Err(invalid_partition(name, "NaN"));
            }
            true
        }
        DataType::Float4 | DataType::Float8 => {
            if start.is_infinite() || end.is_infinite() || every.is_infinite() {
                return Err(invalid_partition(name, "INF"));
            }
            true
        }
        DataType::Int2 | DataType::Int4 | DataType::Int8 => false,
        DataType::Date | DataType::Timestamp | DataType::TimestampTz => {
            if !start.is_finite() || !end.is_finite() {
                return Err(invalid_partition(name, "INF"));
            }
            false
        }
        _ => {
            return Err(
                invalid!("unsupported datatype served as a partition key in the start/end clause.")
                    .with_hint(VALID_TYPES_HINT),
            );
        }
    };

    if compare(end, start)? != Ordering::Greater {
        return Err(invalid!(
            "start value must be less than end value for partition \"{}\".",
            name
        ));
    }

    let mut result = Vec::new();
    let mut current = start.clone();
    let mut finished = false;
    while result.len() < request.max_partitions {
        let point = current
            .checked_add(every)?
            .cast_to(&request.key.data_type)?;

        if result.is_empty() {
            if check_ambiguity && !point.equal(&uncast_first_step(request)?) {
                return Err(invalid!(
                    "ambiguous partition rule is raised by EVERY parameter in partition \"{}\".",
                    name
                ));
            }
            if compare(&point, start)? != Ordering::Greater {
                return Err(invalid!("partition step is too small for partition \"{}\".", name));
            }
        }

        match compare(&point, end)? {
            Ordering::Less => result.push(point.clone()),
            Ordering::Equal => {
                result.push(point);
                finished = true;
                break;
            }
            Ordering::Greater if result.is_empty() => {
                return Err(invalid!("partition step is too big for partition \"{}\".", name));
            }
            Ordering::Greater => {
                result.push(end.clone());
                finished = true;
                break;
            }
        }
        current = point;
    }

    if !finished {
        return Err(too_many_partitions(name, request.limit));
    }
    Ok(result)
}

/// `start + every` computed in the operand types, without the cast back to
/// the key type. A float8 key stepped by a decimal literal compares as decimal.
fn uncast_first_step(request: &RangeSplitRequest<'_>) -> Result<Value, ElaborateError> {
    let literal = match request.every_literal {
        Value::Text(_) => request.every,
        other => other,
    };
    let sum = request.start.checked_add(literal)?;
    if request.key.data_type == DataType::Float8 && matches!(literal, Value::Numeric(_)) {
        return Ok(sum.cast_to(&DataType::Numeric(None))?);
    }
    Ok(sum)
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, ElaborateError> {
    a.compare(b).ok_or_else(|| {
        ElaborateError::Internal(format!("cannot compare partition values {a} and {b}"))
    })
}

fn invalid_partition(name: &str, what: &str) -> ElaborateError {
    invalid!("partition \"{}\" is invalid.", name)
        .with_hint(format!("{what} can not appear in a (START, END, EVERY) clause."))
}

pub(crate) fn too_many_partitions(name: &str, limit: usize) -> ElaborateError {
    invalid!("too many partitions after split partition \"{}\".", name).with_hint(format!(
        "number of partitions can not be more than {limit}, MINVALUE will be auto-included if not assigned."
    ))
}
