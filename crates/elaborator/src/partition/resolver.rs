//! Turns a START/END/EVERY partition list into explicit `LESS THAN`
//! boundaries.
//!
//! Entries are walked in order while the last placed boundary is tracked:
//! each entry must start exactly where the previous one ended. Without a low
//! bound the first entry gets an extra `<name>_0` partition below its start,
//! and a trailing START-only entry runs up to MAXVALUE or the up bound of the
//! partition being split.

use super::{
    PartitionBoundarySpec, PartitionKey,
    divide::{RangeSplitRequest, divide_start_end_every, too_many_partitions},
    naming::{announced_prefix, name_prefix, numbered},
};
use crate::{
    error::{DiagnosticExt, ElaborateError},
    invalid,
    notice::Notices,
    settings::ElaborateSettings,
};
use model::core::{boundary::BoundaryValue, data_type::DataType};
use statement::ast::partition::StartEndDef;
use std::{cmp::Ordering, collections::HashSet};
use tracing::debug;

const GAP_HINT: &str = "partition gap or overlapping is not allowed.";

/// Everything the resolver needs besides the settings.
#[derive(Debug, Clone)]
pub struct StartEndRequest<'a> {
    pub keys: &'a [PartitionKey],
    pub definitions: &'a [StartEndDef],
    /// Partitions the table already has.
    pub existing: usize,
    /// Upper boundary of the partition just below the new ones.
    pub low_bound: Option<BoundaryValue>,
    /// Upper boundary of the partition being split.
    pub up_bound: Option<BoundaryValue>,
}

impl<'a> StartEndRequest<'a> {
    /// A fresh table: no existing partitions and no bounds.
    pub fn new(keys: &'a [PartitionKey], definitions: &'a [StartEndDef]) -> Self {
        Self {
            keys,
            definitions,
            existing: 0,
            low_bound: None,
            up_bound: None,
        }
    }
}

struct Resolver<'a> {
    key: &'a PartitionKey,
    settings: &'a ElaborateSettings,
    low_bound: Option<&'a BoundaryValue>,
    up_bound: Option<&'a BoundaryValue>,
    out: PartitionBoundarySpec,
    total: usize,
}

pub fn resolve_start_end(
    request: &StartEndRequest<'_>,
    settings: &ElaborateSettings,
    notices: &mut Notices,
) -> Result<PartitionBoundarySpec, ElaborateError> {
    let defs = request.definitions;
    if defs.is_empty() {
        return Ok(PartitionBoundarySpec::default());
    }

    let [key] = request.keys else {
        return Err(invalid!("partitioned table has too many partition keys.")
            .with_hint("start/end syntax requires a partitioned table with only one partition key."));
    };

    for def in defs {
        let single = |part: &Option<Vec<BoundaryValue>>| part.as_ref().is_none_or(|v| v.len() == 1);
        if !single(&def.start) || !single(&def.end) || !single(&def.every) {
            return Err(invalid!("too many partition keys for partition \"{}\".", def.name)
                .with_hint("only one partition key is allowed in start/end clause."));
        }
    }

    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.name.as_str()) {
            return Err(invalid!("duplicate partition name: \"{}\"", def.name).on(&def.name));
        }
    }

    let is_interval = match key.data_type {
        DataType::Int2
        | DataType::Int4
        | DataType::Int8
        | DataType::Numeric(_)
        | DataType::Float4
        | DataType::Float8 => false,
        DataType::Date | DataType::Timestamp | DataType::TimestampTz => true,
        _ => {
            return Err(invalid!(
                "datatype of column \"{}\" is unsupported for partition key in start/end clause.",
                key.name
            )
            .with_hint("Valid datatypes are: smallint, int, bigint, float4/real, float8/double, numeric, date and timestamp [with time zone]."));
        }
    };

    if request.existing >= settings.max_partitions {
        return Err(invalid!(
            "can not add more partitions as partition number is already at its maximum."
        ));
    }

    let mut resolver = Resolver {
        key,
        settings,
        low_bound: request.low_bound.as_ref(),
        up_bound: request.up_bound.as_ref(),
        out: PartitionBoundarySpec::default(),
        total: request.existing,
    };

    let mut last_val: Option<BoundaryValue> = None;
    let mut start_val: Option<BoundaryValue> = None;
    let mut end_val: Option<BoundaryValue> = None;
    // Index of the entry being processed; stays put when the loop stops at the limit.
    let mut cur = 0;

    for (i, def) in defs.iter().enumerate() {
        let last_def = i.checked_sub(1).map(|p| &defs[p]);
        resolver.precheck_integer_operands(def)?;

        match (&def.start, &def.end, &def.every) {
            (Some(start), Some(end), Some(every)) => {
                let start = resolver.key_value(&start[0])?;
                let end = resolver.key_value(&end[0])?;
                let every_literal = &every[0];
                let every = resolver.step_value(every_literal, is_interval)?;
                if start.is_max() || end.is_max() || every.is_max() {
                    return Err(invalid!("partition \"{}\" is invalid.", def.name)
                        .with_hint("MAXVALUE can not appear in a (START, END, EVERY) clause."));
                }
                if compare(&start, &end)? != Ordering::Less {
                    return Err(invalid!(
                        "start value must be less than end value for partition \"{}\".",
                        def.name
                    ));
                }
                check_continuity(last_val.as_ref(), &start, def)?;
                if last_val.is_none() {
                    resolver.open_first_range(last_def, &start, def, cur)?;
                }

                let prefix = announced_prefix(&def.name, settings.partition_prefix_len, notices);
                let (Some(start_v), Some(end_v), Some(every_v)) =
                    (start.as_value(), end.as_value(), every.as_value())
                else {
                    return Err(ElaborateError::Internal(format!(
                        "partition \"{}\" has an open-ended START/END/EVERY operand",
                        def.name
                    )));
                };
                let literal = every_literal.as_value().unwrap_or(every_v);
                let points = divide_start_end_every(&RangeSplitRequest {
                    partition_name: &def.name,
                    key,
                    start: start_v,
                    end: end_v,
                    every: every_v,
                    every_literal: literal,
                    max_partitions: settings.max_partitions - resolver.total,
                    limit: settings.max_partitions,
                })?;
                debug!(
                    "Partition '{}' divided into {} ranges",
                    def.name,
                    points.len()
                );
                for (j, point) in points.into_iter().enumerate() {
                    resolver.place(numbered(prefix, j + 1), point.into(), def);
                }
                start_val = Some(start);
                last_val = Some(end.clone());
                end_val = Some(end);
            }
            (Some(start), Some(end), None) => {
                let start = resolver.key_value(&start[0])?;
                let end = resolver.key_value(&end[0])?;
                if start.is_max() {
                    return Err(invalid!(
                        "start value can not be MAXVALUE for partition \"{}\".",
                        def.name
                    ));
                }
                if compare(&start, &end)? != Ordering::Less {
                    return Err(invalid!(
                        "start value must be less than end value for partition \"{}\".",
                        def.name
                    ));
                }
                check_continuity(last_val.as_ref(), &start, def)?;
                if last_val.is_some() {
                    resolver.place(def.name.clone(), end.clone(), def);
                } else if let Some(last_def) = last_def {
                    resolver.close_single_start(last_def, &start, def, cur)?;
                    resolver.place(def.name.clone(), end.clone(), def);
                } else if resolver.low_bound.is_none() {
                    let prefix = name_prefix(&def.name, settings.partition_prefix_len);
                    resolver.place(numbered(prefix, 0), start.clone(), def);
                    resolver.place(numbered(prefix, 1), end.clone(), def);
                } else {
                    resolver.check_split_start(&start, def)?;
                    resolver.place(def.name.clone(), end.clone(), def);
                }
                start_val = Some(start);
                last_val = Some(end.clone());
                end_val = Some(end);
            }
            (Some(start), None, _) => {
                let start = resolver.key_value(&start[0])?;
                if start.is_max() {
                    return Err(invalid!(
                        "start value can not be MAXVALUE for partition \"{}\".",
                        def.name
                    ));
                }
                check_continuity(last_val.as_ref(), &start, def)?;
                if last_val.is_none() {
                    resolver.open_first_range(last_def, &start, def, cur)?;
                }
                start_val = Some(start);
                last_val = None;
                end_val = None;
            }
            (None, Some(end), _) => {
                let end = resolver.key_value(&end[0])?;
                match &last_val {
                    Some(last) => {
                        if last.is_max() {
                            return Err(invalid!(
                                "partition \"{}\" is not allowed behind MAXVALUE.",
                                def.name
                            ));
                        }
                        if compare(last, &end)? != Ordering::Less {
                            return Err(invalid!(
                                "end value of partition \"{}\" is too low.",
                                def.name
                            )
                            .with_hint(GAP_HINT));
                        }
                    }
                    None if last_def.is_some() => {
                        return Err(invalid!(
                            "partition \"{}\" is an invalid definition clause.",
                            def.name
                        )
                        .with_hint("Do not use a single END after a single START."));
                    }
                    None => {
                        if let Some(low) = resolver.low_bound
                            && compare(low, &end)? != Ordering::Less
                        {
                            return Err(invalid!(
                                "end value of partition \"{}\" MUST be greater than up-boundary of last partition.",
                                def.name
                            ));
                        }
                    }
                }
                resolver.place(def.name.clone(), end.clone(), def);
                start_val = None;
                last_val = Some(end.clone());
                end_val = Some(end);
            }
            (None, None, _) => {
                return Err(invalid!(
                    "partition \"{}\" is an invalid definition clause.",
                    def.name
                ));
            }
        }

        if resolver.total >= settings.max_partitions {
            if resolver.total == settings.max_partitions && i + 1 == defs.len() {
                break;
            }
            return Err(too_many_partitions(&def.name, settings.max_partitions));
        }
        cur += 1;
    }

    let Some(last) = defs.last() else {
        return Ok(resolver.out);
    };
    if last.end.is_none() {
        let boundary = match resolver.up_bound {
            None => BoundaryValue::MaxValue,
            Some(up) => {
                let start = start_val.as_ref().ok_or_else(|| {
                    ElaborateError::Internal(format!("partition \"{}\" lost its start value", last.name))
                })?;
                if compare(up, start)? != Ordering::Greater {
                    return Err(invalid!(
                        "start value of partition \"{}\" MUST be less than up-boundary of the partition to be splitted.",
                        last.name
                    ));
                }
                up.clone()
            }
        };
        let name = if resolver.low_bound.is_none() && cur == 1 {
            numbered(name_prefix(&last.name, settings.partition_prefix_len), 1)
        } else {
            last.name.clone()
        };
        resolver.place(name, boundary, last);
    } else if let (Some(up), Some(end)) = (resolver.up_bound, end_val.as_ref())
        && compare(up, end)? != Ordering::Equal
    {
        return Err(invalid!(
            "end value of partition \"{}\" NOT EQUAL up-boundary of the partition to be splitted.",
            last.name
        ));
    }

    if resolver.total > settings.max_partitions {
        return Err(too_many_partitions(&last.name, settings.max_partitions));
    }

    let mut names = HashSet::new();
    for name in resolver.out.names() {
        if !names.insert(name) {
            return Err(invalid!("duplicate partition name: \"{}\".", name)
                .on(name)
                .with_hint("partitions defined by (START, END, EVERY) are named as \"partitionName_x\" where x is an integer and starts from 0 or 1."));
        }
    }

    Ok(resolver.out)
}

impl Resolver<'_> {
    /// Casts an operand to the key type; sentinels pass through.
    fn key_value(&self, value: &BoundaryValue) -> Result<BoundaryValue, ElaborateError> {
        if value.is_null() {
            return Err(invalid!("Partition key value can not be null"));
        }
        Ok(value.cast_to(&self.key.data_type)?)
    }

    /// EVERY is an interval for temporal keys and a key-typed value otherwise.
    fn step_value(&self, value: &BoundaryValue, is_interval: bool) -> Result<BoundaryValue, ElaborateError> {
        if is_interval {
            if value.is_null() {
                return Err(invalid!("Partition key value can not be null"));
            }
            return Ok(value.cast_to(&DataType::Interval)?);
        }
        self.key_value(value)
    }

    /// Integer keys accept only operands that survive the cast unchanged.
    fn precheck_integer_operands(&self, def: &StartEndDef) -> Result<(), ElaborateError> {
        if !self.key.data_type.is_integer() {
            return Ok(());
        }
        let operands = [&def.start, &def.end, &def.every];
        for value in operands.into_iter().flatten().flat_map(|v| v.first()) {
            let cast = self.key_value(value)?;
            if !cast.is_max() && compare(&cast, value)? != Ordering::Equal {
                return Err(invalid!(
                    "start/end/every value must be an const-integer for partition \"{}\"",
                    def.name
                ));
            }
        }
        Ok(())
    }

    fn place(&mut self, name: String, boundary: BoundaryValue, def: &StartEndDef) {
        self.out.push(name, boundary, def.tablespace.as_ref());
        self.total += 1;
    }

    /// The first boundary of a START-carrying entry that follows no END.
    fn open_first_range(
        &mut self,
        last_def: Option<&StartEndDef>,
        start: &BoundaryValue,
        def: &StartEndDef,
        cur: usize,
    ) -> Result<(), ElaborateError> {
        if let Some(last_def) = last_def {
            self.close_single_start(last_def, start, def, cur)
        } else if self.low_bound.is_none() {
            let prefix = name_prefix(&def.name, self.settings.partition_prefix_len);
            self.place(numbered(prefix, 0), start.clone(), def);
            Ok(())
        } else {
            self.check_split_start(start, def)
        }
    }

    /// Closes a preceding START-only entry at this entry's start.
    fn close_single_start(
        &mut self,
        last_def: &StartEndDef,
        start: &BoundaryValue,
        def: &StartEndDef,
        cur: usize,
    ) -> Result<(), ElaborateError> {
        let last_start = last_def
            .start
            .as_ref()
            .and_then(|s| s.first())
            .ok_or_else(|| {
                ElaborateError::Internal(format!(
                    "partition \"{}\" has neither START nor END",
                    last_def.name
                ))
            })?;
        let last_start = self.key_value(last_start)?;
        if compare(&last_start, start)? != Ordering::Less {
            return Err(invalid!("start value of partition \"{}\" is too low.", def.name)
                .with_hint(GAP_HINT));
        }
        let name = if self.low_bound.is_none() && cur == 1 {
            numbered(name_prefix(&last_def.name, self.settings.partition_prefix_len), 1)
        } else {
            last_def.name.clone()
        };
        self.place(name, start.clone(), last_def);
        Ok(())
    }

    /// A split must start exactly at the boundary below the split partition.
    fn check_split_start(&self, start: &BoundaryValue, def: &StartEndDef) -> Result<(), ElaborateError> {
        if let (Some(low), Some(_)) = (self.low_bound, self.up_bound)
            && compare(low, start)? != Ordering::Equal
        {
            return Err(invalid!(
                "start value of partition \"{}\" NOT EQUAL up-boundary of last partition.",
                def.name
            ));
        }
        Ok(())
    }
}

/// The previous entry's END must equal this entry's START.
fn check_continuity(
    last_val: Option<&BoundaryValue>,
    start: &BoundaryValue,
    def: &StartEndDef,
) -> Result<(), ElaborateError> {
    let Some(last) = last_val else {
        return Ok(());
    };
    if last.is_max() {
        return Err(invalid!(
            "partition \"{}\" is not allowed behind MAXVALUE.",
            def.name
        ));
    }
    match compare(last, start)? {
        Ordering::Greater => Err(invalid!("start value of partition \"{}\" is too low.", def.name)
            .with_hint(GAP_HINT)),
        Ordering::Less => Err(invalid!("start value of partition \"{}\" is too high.", def.name)
            .with_hint(GAP_HINT)),
        Ordering::Equal => Ok(()),
    }
}

fn compare(a: &BoundaryValue, b: &BoundaryValue) -> Result<Ordering, ElaborateError> {
    a.compare(b).ok_or_else(|| {
        ElaborateError::Internal(format!("cannot compare partition values {a} and {b}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use model::core::value::Value;
    use tracing_test::traced_test;

    fn boundary(value: Value) -> BoundaryValue {
        BoundaryValue::Value(value)
    }

    fn int_key() -> Vec<PartitionKey> {
        vec![PartitionKey::new("id", DataType::Int4)]
    }

    fn resolve(defs: &[StartEndDef]) -> Result<PartitionBoundarySpec, ElaborateError> {
        let keys = int_key();
        resolve_start_end(
            &StartEndRequest::new(&keys, defs),
            &ElaborateSettings::default(),
            &mut Notices::new(),
        )
    }

    fn ints(spec: &PartitionBoundarySpec) -> Vec<String> {
        spec.boundaries().iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_every_with_auto_minvalue() {
        let spec = resolve(&[StartEndDef::new("p")
            .start(Value::Int4(1))
            .end(Value::Int4(100))
            .every(Value::Int4(30))])
        .unwrap();
        assert_eq!(spec.names(), vec!["p_0", "p_1", "p_2", "p_3", "p_4"]);
        assert_eq!(ints(&spec), vec!["1", "31", "61", "91", "100"]);
    }

    #[test]
    fn test_start_end_chain() {
        let spec = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)).end(Value::Int4(10)),
            StartEndDef::new("b").start(Value::Int4(10)).end(Value::Int4(20)),
            StartEndDef::new("c").end(Value::Int4(30)),
        ])
        .unwrap();
        assert_eq!(spec.names(), vec!["a_0", "a_1", "b", "c"]);
        assert_eq!(ints(&spec), vec!["0", "10", "20", "30"]);
    }

    #[test]
    fn test_single_start_runs_to_maxvalue() {
        let spec = resolve(&[StartEndDef::new("p").start(Value::Int4(5))]).unwrap();
        assert_eq!(spec.names(), vec!["p_0", "p_1"]);
        assert!(spec.boundaries()[1].is_max());
    }

    #[test]
    fn test_start_only_closed_by_next_start() {
        let spec = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)),
            StartEndDef::new("b").start(Value::Int4(50)).end(Value::Int4(60)),
        ])
        .unwrap();
        assert_eq!(spec.names(), vec!["a_0", "a_1", "b"]);
        assert_eq!(ints(&spec), vec!["0", "50", "60"]);
    }

    #[test]
    fn test_gap_and_overlap_rejected() {
        let err = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)).end(Value::Int4(10)),
            StartEndDef::new("b").start(Value::Int4(11)).end(Value::Int4(20)),
        ])
        .unwrap_err();
        assert_eq!(err.message(), "start value of partition \"b\" is too high.");
        assert_eq!(err.hint(), Some(GAP_HINT));

        let err = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)).end(Value::Int4(10)),
            StartEndDef::new("b").start(Value::Int4(5)).end(Value::Int4(20)),
        ])
        .unwrap_err();
        assert_eq!(err.message(), "start value of partition \"b\" is too low.");
    }

    #[test]
    fn test_end_after_single_start_rejected() {
        let err = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)),
            StartEndDef::new("b").end(Value::Int4(10)),
        ])
        .unwrap_err();
        assert_eq!(err.message(), "partition \"b\" is an invalid definition clause.");
    }

    #[test]
    fn test_nothing_after_maxvalue() {
        let err = resolve(&[
            StartEndDef::new("a").start(Value::Int4(0)).end(BoundaryValue::MaxValue),
            StartEndDef::new("b").end(Value::Int4(10)),
        ])
        .unwrap_err();
        assert_eq!(err.message(), "partition \"b\" is not allowed behind MAXVALUE.");
    }

    #[test]
    fn test_non_integer_operand_on_integer_key() {
        let err = resolve(&[StartEndDef::new("p")
            .start(Value::numeric("1.5").unwrap())
            .end(Value::Int4(10))])
        .unwrap_err();
        assert_eq!(
            err.message(),
            "start/end/every value must be an const-integer for partition \"p\""
        );
    }

    #[test]
    fn test_duplicate_generated_names() {
        let err = resolve(&[
            StartEndDef::new("p").start(Value::Int4(0)).end(Value::Int4(10)),
            StartEndDef::new("p_1").start(Value::Int4(10)).end(Value::Int4(20)),
        ])
        .unwrap_err();
        assert_eq!(err.message(), "duplicate partition name: \"p_1\".");
        assert_eq!(err.kind(), ErrorKind::InvalidDefinition);
    }

    #[test]
    fn test_key_checks() {
        let keys = vec![
            PartitionKey::new("a", DataType::Int4),
            PartitionKey::new("b", DataType::Int4),
        ];
        let defs = [StartEndDef::new("p").start(Value::Int4(1))];
        let err = resolve_start_end(
            &StartEndRequest::new(&keys, &defs),
            &ElaborateSettings::default(),
            &mut Notices::new(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "partitioned table has too many partition keys.");

        let keys = vec![PartitionKey::new("t", DataType::Text)];
        let err = resolve_start_end(
            &StartEndRequest::new(&keys, &defs),
            &ElaborateSettings::default(),
            &mut Notices::new(),
        )
        .unwrap_err();
        assert!(err.message().starts_with("datatype of column \"t\" is unsupported"));
    }

    #[test]
    fn test_split_against_bounds() {
        let keys = int_key();
        let defs = [
            StartEndDef::new("s1").start(Value::Int4(10)).end(Value::Int4(15)),
            StartEndDef::new("s2").start(Value::Int4(15)),
        ];
        let request = StartEndRequest {
            keys: &keys,
            definitions: &defs,
            existing: 2,
            low_bound: Some(boundary(Value::Int4(10))),
            up_bound: Some(boundary(Value::Int4(20))),
        };
        let spec =
            resolve_start_end(&request, &ElaborateSettings::default(), &mut Notices::new()).unwrap();
        assert_eq!(spec.names(), vec!["s1", "s2"]);
        assert_eq!(ints(&spec), vec!["15", "20"]);

        let bad = [StartEndDef::new("s1").start(Value::Int4(11)).end(Value::Int4(20))];
        let err = resolve_start_end(
            &StartEndRequest { definitions: &bad, ..request.clone() },
            &ElaborateSettings::default(),
            &mut Notices::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "start value of partition \"s1\" NOT EQUAL up-boundary of last partition."
        );
    }

    #[test]
    fn test_partition_limit_counts_existing() {
        let keys = int_key();
        let defs = [StartEndDef::new("p")
            .start(Value::Int4(0))
            .end(Value::Int4(10))
            .every(Value::Int4(1))];
        let settings = ElaborateSettings {
            max_partitions: 8,
            ..Default::default()
        };
        let err = resolve_start_end(
            &StartEndRequest::new(&keys, &defs),
            &settings,
            &mut Notices::new(),
        )
        .unwrap_err();
        assert_eq!(err.message(), "too many partitions after split partition \"p\".");
    }

    #[traced_test]
    #[test]
    fn test_long_name_prefix_notice() {
        let keys = int_key();
        let name = "n".repeat(60);
        let defs = [StartEndDef::new(name.as_str())
            .start(Value::Int4(0))
            .end(Value::Int4(2))
            .every(Value::Int4(1))];
        let mut notices = Notices::new();
        let spec = resolve_start_end(
            &StartEndRequest::new(&keys, &defs),
            &ElaborateSettings::default(),
            &mut notices,
        )
        .unwrap();
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.names()[1], format!("{}_1", "n".repeat(57)));
        assert_eq!(notices.as_slice().len(), 1);
        assert!(logs_contain("NOTICE:"));
    }
}
