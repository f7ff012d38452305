//! Turns PRIMARY KEY / UNIQUE / EXCLUDE constraints into index specs and
//! folds them together with indexes copied from LIKE sources.

use crate::{
    catalog::{IndexInfo, RelationInfo, RelationKind},
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, undefined, unsupported,
};
use statement::ast::{
    constraint::{ConstraintKind, ConstraintSpec, KeyConstraint},
    index::{IndexElem, IndexSpec},
};
use tracing::debug;

const UNUSABLE_INDEX_DETAIL: &str =
    "Cannot create a primary key or unique constraint using such an index.";

/// Builds the index list for the statement: constraint indexes first, then
/// cloned ones, with duplicates collapsed and the primary key leading.
pub fn transform_index_constraints(
    cxt: &mut WorkingContext<'_>,
) -> Result<Vec<IndexSpec>, ElaborateError> {
    let constraints = std::mem::take(&mut cxt.ix_constraints);
    let mut indexes = Vec::with_capacity(constraints.len() + cxt.inh_indexes.len());

    for constraint in &constraints {
        if cxt.is_partitioned && !cxt.is_alter() && !cxt.value_partitioned_foreign {
            check_partition_key_coverage(cxt, constraint)?;
        }
        indexes.push(transform_index_constraint(cxt, constraint)?);
    }

    for index in std::mem::take(&mut cxt.inh_indexes) {
        if index.primary {
            if cxt.has_pkey {
                return Err(invalid!(
                    "multiple primary keys for table \"{}\" are not allowed",
                    cxt.relation.name
                ));
            }
            cxt.has_pkey = true;
        }
        indexes.push(index);
    }

    let before = indexes.len();
    let merged = merge_indexes(indexes, cxt.is_resizing);
    debug!(
        "Synthesized {} index(es) for \"{}\" ({} merged away)",
        merged.len(),
        cxt.relation.name,
        before - merged.len()
    );
    Ok(merged)
}

/// Unique keys on a partitioned table must include every partition key.
fn check_partition_key_coverage(
    cxt: &WorkingContext<'_>,
    constraint: &ConstraintSpec,
) -> Result<(), ElaborateError> {
    let keys = match &constraint.kind {
        ConstraintKind::Exclusion(_) => {
            return Err(unsupported!("Partitioned table does not support EXCLUDE index"));
        }
        ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => &k.keys,
        _ => return Ok(()),
    };
    if cxt.partition_keys.iter().all(|pk| keys.contains(pk)) {
        return Ok(());
    }
    Err(
        unsupported!("Invalid PRIMARY KEY/UNIQUE constraint for partitioned table")
            .with_detail("Columns of PRIMARY KEY/UNIQUE constraint Must contain PARTITION KEY")
            .at(constraint.location),
    )
}

pub fn transform_index_constraint(
    cxt: &mut WorkingContext<'_>,
    constraint: &ConstraintSpec,
) -> Result<IndexSpec, ElaborateError> {
    let mut index = IndexSpec::new(
        cxt.relation.clone(),
        cxt.settings.default_access_method.clone(),
    );
    index.unique = !matches!(constraint.kind, ConstraintKind::Exclusion(_));
    index.primary = constraint.is_primary_key();
    if index.primary {
        if cxt.has_pkey {
            let err = if cxt.is_foreign() {
                invalid!(
                    "Multiple primary keys for foreign table \"{}\" are not allowed.",
                    cxt.relation.name
                )
            } else {
                invalid!(
                    "multiple primary keys for table \"{}\" are not allowed",
                    cxt.relation.name
                )
            };
            return Err(err.at(constraint.location));
        }
        cxt.has_pkey = true;
    }
    index.is_constraint = true;
    index.deferrable = constraint.deferrable;
    index.initially_deferred = constraint.initially_deferred;
    index.name = constraint.name.clone();
    index.is_partitioned = !cxt.is_foreign() && cxt.is_partitioned;

    let key = match &constraint.kind {
        ConstraintKind::Exclusion(ex) => {
            index.access_method = ex.access_method.clone();
            index.options = ex.options.clone();
            index.table_space = ex.index_space.clone();
            index.where_clause = ex.where_clause.clone();
            for (elem, op) in &ex.elements {
                index.params.push(elem.clone());
                index.exclude_op_names.push(op.clone());
            }
            return Ok(index);
        }
        ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => k,
        _ => {
            return Err(ElaborateError::Internal(format!(
                "unexpected constraint type {} in index list",
                constraint.kind
            )));
        }
    };
    index.options = key.options.clone();
    index.table_space = key.index_space.clone();

    let keys = match &key.index_name {
        Some(name) => bind_existing_index(cxt, constraint, key, name, &mut index)?,
        None => key.keys.clone(),
    };

    for key_name in keys {
        let found = match cxt.column_mut(&key_name) {
            Some(column) => {
                // A primary key forces NOT NULL unless it is informational.
                if index.primary && !constraint.not_enforced {
                    column.is_not_null = true;
                }
                true
            }
            None => cxt.is_system_column(&key_name) || inherited_column_exists(cxt, &key_name)?,
        };
        if !found && !cxt.is_alter() {
            return Err(undefined!("column \"{}\" named in key does not exist", key_name)
                .on(&key_name)
                .at(constraint.location));
        }

        if index.params.iter().any(|p| p.name.as_deref() == Some(&key_name)) {
            let err = if index.primary {
                invalid!("column \"{}\" appears twice in primary key constraint", key_name)
            } else {
                invalid!("column \"{}\" appears twice in unique constraint", key_name)
            };
            return Err(err.on(&key_name).at(constraint.location));
        }

        // First key of the primary key, or of the first unique key, becomes
        // the fallback distribution column.
        if index.params.is_empty() && (index.primary || cxt.fallback_dist_col.is_empty()) {
            cxt.fallback_dist_col = vec![key_name.clone()];
        }
        index.params.push(IndexElem::column(key_name));
    }

    Ok(index)
}

fn inherited_column_exists(cxt: &WorkingContext<'_>, name: &str) -> Result<bool, ElaborateError> {
    for parent in &cxt.inh_relations {
        let Some(rel) = cxt.catalog.relation_by_name(parent) else {
            return Err(undefined!("relation \"{}\" does not exist", parent.name).on(&parent.name));
        };
        if rel.kind != RelationKind::Table {
            return Err(invalid!("inherited relation \"{}\" is not a table", parent.name));
        }
        if rel.attribute_by_name(name).is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `ADD CONSTRAINT .. USING INDEX`: validate the index and return the names
/// of its key columns.
fn bind_existing_index(
    cxt: &WorkingContext<'_>,
    constraint: &ConstraintSpec,
    key: &KeyConstraint,
    index_name: &str,
    index: &mut IndexSpec,
) -> Result<Vec<String>, ElaborateError> {
    if !cxt.is_alter() {
        return Err(unsupported!("cannot use an existing index in CREATE TABLE")
            .at(constraint.location));
    }
    let Some(rel) = cxt.existing.as_ref() else {
        return Err(ElaborateError::Internal(
            "USING INDEX outside an ALTER TABLE target".to_string(),
        ));
    };
    let info = cxt
        .catalog
        .index_by_name(&rel.schema, index_name)
        .ok_or_else(|| {
            undefined!("index \"{}\" does not exist", index_name)
                .on(index_name)
                .at(constraint.location)
        })?;
    check_index_usable(cxt, constraint, rel, &info)?;

    let mut keys = Vec::with_capacity(info.keys.len());
    for k in &info.keys {
        if k.opclass.is_some() || k.desc || k.nulls_first {
            return Err(invalid!(
                "index \"{}\" does not have default sorting behavior",
                index_name
            )
            .with_detail(UNUSABLE_INDEX_DETAIL)
            .at(constraint.location));
        }
        let name = rel
            .attribute(k.attnum)
            .map_or_else(|| k.column_name.clone(), |a| a.name.clone());
        keys.push(name);
    }
    debug!(
        "Constraint on \"{}\" adopts index \"{}\" ({} key(s), {} requested)",
        rel.name,
        info.name,
        keys.len(),
        key.keys.len()
    );
    index.index_oid = Some(info.oid);
    Ok(keys)
}

fn check_index_usable(
    cxt: &WorkingContext<'_>,
    constraint: &ConstraintSpec,
    rel: &RelationInfo,
    info: &IndexInfo,
) -> Result<(), ElaborateError> {
    let name = &info.name;
    let err = if info.constraint.is_some() {
        invalid!("index \"{}\" is already associated with a constraint", name)
    } else if info.relation != rel.oid {
        invalid!("index \"{}\" does not belong to table \"{}\"", name, rel.name)
    } else if !info.valid {
        invalid!("index \"{}\" is not valid", name)
    } else if !info.unique {
        invalid!("\"{}\" is not a unique index", name).with_detail(UNUSABLE_INDEX_DETAIL)
    } else if !info.exprs.is_empty() {
        invalid!("index \"{}\" contains expressions", name).with_detail(UNUSABLE_INDEX_DETAIL)
    } else if info.predicate.is_some() {
        invalid!("\"{}\" is a partial index", name).with_detail(UNUSABLE_INDEX_DETAIL)
    } else if !info.immediate && !constraint.deferrable {
        invalid!("\"{}\" is a deferrable index", name).with_detail(
            "Cannot create a non-deferrable constraint using a deferrable index.",
        )
    } else if info.access_method != cxt.settings.default_access_method {
        invalid!("index \"{}\" is not a btree", name)
    } else {
        return Ok(());
    };
    Err(err.on(name).at(constraint.location))
}

/// Collapses indexes that would be identical. The primary key always comes
/// first; a table being resized keeps every entry.
pub fn merge_indexes(mut indexes: Vec<IndexSpec>, keep_all: bool) -> Vec<IndexSpec> {
    let mut merged = Vec::with_capacity(indexes.len());
    if let Some(pos) = indexes.iter().position(|i| i.primary) {
        merged.push(indexes.remove(pos));
    }
    for index in indexes {
        if keep_all {
            merged.push(index);
            continue;
        }
        match merged.iter_mut().find(|prior| same_index(prior, &index)) {
            Some(prior) => {
                prior.unique |= index.unique;
                if prior.name.is_none() {
                    prior.name = index.name;
                }
            }
            None => merged.push(index),
        }
    }
    merged
}

fn same_index(a: &IndexSpec, b: &IndexSpec) -> bool {
    a.params == b.params
        && a.where_clause == b.where_clause
        && a.exclude_op_names == b.exclude_op_names
        && a.access_method == b.access_method
        && a.deferrable == b.deferrable
        && a.initially_deferred == b.initially_deferred
}

/// Marks indexes created alongside a new table: informational ones are
/// internal, the rest skip the memory check.
pub fn mark_created_indexes(indexes: &mut [IndexSpec], informational: bool) {
    for index in indexes {
        if informational {
            index.internal_flag = true;
        } else {
            index.skip_mem_check = true;
        }
    }
}
