//! ALTER TABLE / ALTER FOREIGN TABLE elaboration.

use crate::{
    Elaboration,
    catalog::{Catalog, PartitionEntry, PartitionInfo, RelationInfo, RelationKind},
    column::transform_column_definition,
    constraint::{check_cluster_constraints, check_reserved_columns, transform_table_constraint},
    context::{StmtType, WorkingContext},
    error::{DiagnosticExt, ElaborateError},
    foreign_key::transform_fk_constraints,
    index::{mark_created_indexes, transform_index_constraints},
    invalid,
    partition::{
        PartitionKey, StartEndRequest,
        check::{check_partition_values, is_start_end_list},
        resolve_start_end,
    },
    settings::{ElaborateRequest, ElaborateSettings},
    undefined,
};
use model::core::boundary::BoundaryValue;
use statement::{
    action::Action,
    ast::{
        alter_table::{AlterTableCmd, AlterTableStmt, PartitionRef},
        constraint::ConstraintKind,
        partition::{PartitionDef, StartEndDef},
    },
};
use tracing::debug;

/// Elaborates an ALTER TABLE on an existing relation. Constraint and index
/// work becomes extra commands on the same ALTER.
pub fn elaborate_alter(
    catalog: &dyn Catalog,
    settings: &ElaborateSettings,
    input: &AlterTableStmt,
    request: &ElaborateRequest,
) -> Result<Elaboration, ElaborateError> {
    let mut stmt = input.clone();
    let rel = catalog.relation_by_name(&stmt.relation).ok_or_else(|| {
        undefined!("relation \"{}\" does not exist", stmt.relation.name)
            .on(&stmt.relation.name)
            .at(stmt.relation.location)
    })?;

    let stmt_type = if stmt.is_foreign {
        StmtType::AlterForeignTable
    } else {
        StmtType::AlterTable
    };
    stmt.relation.persistence = rel.persistence;

    let mut cxt = WorkingContext::new(catalog, settings, stmt_type, stmt.relation.clone());
    cxt.namespace = rel.schema.clone();
    cxt.uuids = request.uuid_queue();
    cxt.is_partitioned = rel.is_partitioned();
    if let Some(info) = &rel.partition {
        cxt.partition_keys = info
            .key_attnums
            .iter()
            .filter_map(|attnum| rel.attribute(*attnum).map(|a| a.name.clone()))
            .collect();
    }
    cxt.can_informational_constraint =
        rel.kind == RelationKind::ForeignTable && rel.informational_constraints;
    cxt.existing = Some(rel.clone());

    let mut skip_validation = true;
    let mut cmds = Vec::with_capacity(stmt.cmds.len());

    for cmd in std::mem::take(&mut stmt.cmds) {
        match cmd {
            AlterTableCmd::AddColumn(column) => {
                transform_column_definition(&mut cxt, column, false)?;
                let Some(mut added) = cxt.columns.last().cloned() else {
                    return Err(ElaborateError::Internal(
                        "added column missing from the working context".into(),
                    ));
                };
                if added.raw_default.is_some() {
                    skip_validation = false;
                }
                added.constraints.clear();
                cmds.push(AlterTableCmd::AddColumn(added));
            }
            AlterTableCmd::AddConstraint(constraint) => {
                if matches!(constraint.kind, ConstraintKind::ForeignKey(_)) {
                    skip_validation = false;
                }
                transform_table_constraint(&mut cxt, constraint)?;
            }
            AlterTableCmd::ProcessedConstraint(constraint) => {
                cmds.push(AlterTableCmd::AddConstraint(constraint));
            }
            AlterTableCmd::AddPartition(mut defs) => {
                check_partition_values(&defs)?;
                if is_start_end_list(&defs) {
                    defs = resolve_added_partitions(&mut cxt, &rel, &defs)?;
                }
                cmds.push(AlterTableCmd::AddPartition(defs));
            }
            AlterTableCmd::SplitPartition {
                source,
                split_point,
                mut dest,
            } => {
                if split_point.is_none() {
                    check_partition_values(&dest)?;
                }
                if is_start_end_list(&dest) {
                    dest = resolve_split_partitions(&mut cxt, &rel, &source, &dest)?;
                }
                cmds.push(AlterTableCmd::SplitPartition {
                    source,
                    split_point,
                    dest,
                });
            }
            other => cmds.push(other),
        }
    }

    let saved_alist = std::mem::take(&mut cxt.alist);

    let mut indexes = transform_index_constraints(&mut cxt)?;
    transform_fk_constraints(&mut cxt, skip_validation, true)?;
    check_cluster_constraints(&cxt)?;
    check_reserved_columns(&cxt)?;

    if stmt.is_foreign && rel.informational_constraints {
        mark_created_indexes(&mut indexes, true);
    }

    cmds.extend(indexes.into_iter().map(|index| {
        if index.index_oid.is_some() {
            AlterTableCmd::AddIndexConstraint(index)
        } else {
            AlterTableCmd::AddIndex(index)
        }
    }));
    cmds.extend(
        std::mem::take(&mut cxt.ck_constraints)
            .into_iter()
            .chain(std::mem::take(&mut cxt.fk_constraints))
            .chain(std::mem::take(&mut cxt.cluster_constraints))
            .map(AlterTableCmd::AddConstraint),
    );
    debug!(
        "ALTER of \"{}\" carries {} command(s)",
        stmt.relation.name,
        cmds.len()
    );
    stmt.cmds = cmds;

    let mut actions = std::mem::take(&mut cxt.blist);
    actions.push(Action::AlterTable(stmt));
    actions.append(&mut cxt.alist);
    actions.extend(saved_alist);

    Ok(Elaboration {
        actions,
        notices: cxt.notices.into_vec(),
    })
}

/// `ADD PARTITION .. START/END`: the new partitions continue from the
/// current last boundary.
fn resolve_added_partitions(
    cxt: &mut WorkingContext<'_>,
    rel: &RelationInfo,
    defs: &[PartitionDef],
) -> Result<Vec<PartitionDef>, ElaborateError> {
    let Some(info) = &rel.partition else {
        return Err(invalid!("can not add partition against NON-PARTITIONED table"));
    };
    let existing = info.partitions.len();
    if existing >= cxt.settings.max_partitions {
        return Err(invalid!(
            "the current relation have already reached max number of partitions"
        ));
    }

    let keys = partition_keys(cxt, rel, info)?;
    let defs = start_end_defs(defs);
    let request = StartEndRequest {
        keys: &keys,
        definitions: &defs,
        existing,
        low_bound: info.ordered().last().and_then(|p| upper_boundary(p)),
        up_bound: None,
    };
    let resolved = resolve_start_end(&request, cxt.settings, &mut cxt.notices)?;
    Ok(resolved.into_definitions())
}

/// `SPLIT PARTITION .. INTO (START/END ..)`: the new partitions must exactly
/// cover the range of the partition being split.
fn resolve_split_partitions(
    cxt: &mut WorkingContext<'_>,
    rel: &RelationInfo,
    source: &PartitionRef,
    defs: &[PartitionDef],
) -> Result<Vec<PartitionDef>, ElaborateError> {
    let Some(info) = &rel.partition else {
        return Err(invalid!("can not split partition against NON-PARTITIONED table"));
    };

    let position = match source {
        PartitionRef::Name(name) => info.position(name),
        PartitionRef::Value(values) => info.position_for_value(values),
    };
    let Some(position) = position else {
        let shown = match source {
            PartitionRef::Name(name) => name.clone(),
            PartitionRef::Value(values) => values
                .iter()
                .map(BoundaryValue::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        };
        return Err(undefined!("split partition \"{}\" does not exist.", shown).on(shown));
    };

    let ordered = info.ordered();
    let keys = partition_keys(cxt, rel, info)?;
    let defs = start_end_defs(defs);
    let request = StartEndRequest {
        keys: &keys,
        definitions: &defs,
        existing: info.partitions.len().saturating_sub(1),
        low_bound: position
            .checked_sub(1)
            .and_then(|prev| ordered.get(prev))
            .and_then(|p| upper_boundary(p)),
        up_bound: ordered.get(position).and_then(|p| upper_boundary(p)),
    };
    let resolved = resolve_start_end(&request, cxt.settings, &mut cxt.notices)?;
    Ok(resolved.into_definitions())
}

fn upper_boundary(entry: &PartitionEntry) -> Option<BoundaryValue> {
    entry.boundary.first().cloned()
}

fn start_end_defs(defs: &[PartitionDef]) -> Vec<StartEndDef> {
    defs.iter()
        .filter_map(|d| match d {
            PartitionDef::StartEnd(d) => Some(d.clone()),
            _ => None,
        })
        .collect()
}

fn partition_keys(
    cxt: &WorkingContext<'_>,
    rel: &RelationInfo,
    info: &PartitionInfo,
) -> Result<Vec<PartitionKey>, ElaborateError> {
    info.key_attnums
        .iter()
        .map(|attnum| {
            let attribute = rel.attribute(*attnum).ok_or_else(|| {
                ElaborateError::Internal(format!(
                    "partition key attribute {attnum} missing from \"{}\"",
                    rel.name
                ))
            })?;
            let data_type = cxt.catalog.resolve_type(&attribute.type_name)?;
            Ok(PartitionKey::new(&attribute.name, data_type))
        })
        .collect()
}
