//! Syntax-level checks on PARTITION BY clauses that need no boundary math.

use crate::{
    catalog::{Catalog, RelationKind},
    error::{DiagnosticExt, ElaborateError},
    invalid,
    settings::ElaborateSettings,
    undefined, unsupported,
};
use model::core::interval::Interval;
use statement::ast::{
    common::{Persistence, find_option},
    create_table::{CreateTableStmt, OnCommit},
    partition::{PartitionDef, PartitionStrategy},
};
use std::collections::HashSet;

/// Rejects table shapes that cannot be partitioned, and inheritance from
/// relations that cannot be inherited.
pub fn check_partition_syntax(
    stmt: &CreateTableStmt,
    catalog: &dyn Catalog,
    settings: &ElaborateSettings,
) -> Result<(), ElaborateError> {
    if !stmt.inherits.is_empty() {
        if stmt.partition.is_some() {
            return Err(invalid!("unsupport inherits clause for partitioned table"));
        }
        for parent in &stmt.inherits {
            let rel = catalog.relation_by_name(parent).ok_or_else(|| {
                undefined!("relation \"{}\" does not exist", parent.name)
                    .on(&parent.name)
                    .at(parent.location)
            })?;
            match rel.kind {
                RelationKind::ForeignTable => {
                    return Err(invalid!("inherited relation \"{}\" is a foreign table", parent.name)
                        .with_detail("can not inherit from a foreign table"));
                }
                RelationKind::Table => {}
                _ => {
                    return Err(invalid!("inherited relation \"{}\" is not a table", parent.name));
                }
            }
            if rel.is_partitioned() {
                return Err(invalid!("inherited relation \"{}\" is a partitioned table", parent.name)
                    .with_detail("can not inherit from partitioned table"));
            }
        }
    }

    let Some(part) = &stmt.partition else {
        return Ok(());
    };

    let value_partition = part.strategy == PartitionStrategy::Value;
    if value_partition {
        if part.keys.is_empty() {
            return Err(invalid!("Value-based partition table should have one column at least"));
        }
        if part.interval.is_some() || !part.definitions.is_empty() {
            return Err(invalid!(
                "Value-Based partition table creation encounters unexpected data in unnecessary fields"
            ));
        }
    }

    if stmt.on_commit != OnCommit::Noop {
        return Err(invalid!("ON COMMIT option is not supported for partitioned table"));
    }
    if stmt.of_type.is_some() {
        return Err(invalid!("Typed table can't not be partitioned"));
    }
    if stmt.relation.persistence != Persistence::Permanent {
        return Err(unsupported!(
            "unsupported feature with temporary/unlogged table for partitioned table"
        ));
    }
    if stmt
        .options
        .iter()
        .any(|o| o.namespace.is_none() && o.name.eq_ignore_ascii_case("oids"))
    {
        return Err(invalid!("OIDS option is not supported for partitioned table"));
    }

    if !value_partition {
        if part.keys.len() > settings.max_partition_keys {
            return Err(invalid!("too many partition keys for partitioned table").with_hint(format!(
                "Partittion key columns can not be more than {}",
                settings.max_partition_keys
            )));
        }
        if part.definitions.len() > settings.max_partitions {
            return Err(invalid!("too many partitions for partitioned table").with_hint(format!(
                "Number of partitions can not be more than {}",
                settings.max_partitions
            )));
        }
    }

    if let Some(interval) = &part.interval {
        if part.keys.len() > 1 {
            return Err(
                invalid!("Range partitioned table with INTERVAL clause has more than one column")
                    .with_hint("Only support one partition key for interval partition"),
            );
        }
        if Interval::parse(interval).is_err() {
            return Err(invalid!("invalid input syntax for type interval"));
        }
    }

    if part.has_less_than() && part.has_start_end() {
        return Err(invalid!(
            "partition definitions mix VALUES LESS THAN and START/END forms"
        )
        .with_hint("use a single partition definition form per statement."));
    }

    Ok(())
}

/// Every boundary element must be a constant or MAXVALUE.
pub fn check_partition_values(definitions: &[PartitionDef]) -> Result<(), ElaborateError> {
    let null_error = || {
        invalid!("Partition key value can not be null").with_detail(
            "partition bound element must be one of: string, datetime or interval literal, number, or MAXVALUE, and not null",
        )
    };
    for def in definitions {
        let has_null = match def {
            PartitionDef::LessThan(d) => d.boundary.iter().any(|b| b.is_null()),
            PartitionDef::List(d) => d.values.iter().any(|b| b.is_null()),
            PartitionDef::StartEnd(d) => [&d.start, &d.end, &d.every]
                .into_iter()
                .flatten()
                .flatten()
                .any(|b| b.is_null()),
        };
        if has_null {
            return Err(null_error().on(def.name()));
        }
    }
    Ok(())
}

/// Duplicate names among explicit `LESS THAN` partitions.
pub fn check_partition_names(definitions: &[PartitionDef]) -> Result<(), ElaborateError> {
    let mut seen = HashSet::new();
    for def in definitions {
        if let PartitionDef::LessThan(d) = def
            && !seen.insert(d.name.as_str())
        {
            return Err(invalid!("duplicate partition name: \"{}\"", d.name).on(&d.name));
        }
    }
    Ok(())
}

/// Whether the list uses the START/END form.
pub fn is_start_end_list(definitions: &[PartitionDef]) -> bool {
    definitions.first().is_some_and(|d| matches!(d, PartitionDef::StartEnd(_)))
}

/// `true` for options such as `WITH (oids = true)`.
pub fn wants_oids(stmt: &CreateTableStmt) -> bool {
    find_option(&stmt.options, "oids").and_then(|o| o.as_bool()) == Some(true)
}
