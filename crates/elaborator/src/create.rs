//! CREATE TABLE / CREATE FOREIGN TABLE elaboration.

use crate::{
    Elaboration,
    catalog::{Catalog, RelationKind},
    column::transform_column_definition,
    constraint::{check_cluster_constraints, check_reserved_columns, transform_table_constraint},
    context::{StmtType, WorkingContext},
    error::{DiagnosticExt, ElaborateError},
    foreign_key::transform_fk_constraints,
    index::{mark_created_indexes, transform_index_constraints},
    invalid,
    like::transform_table_like_clause,
    partition::{
        PartitionKey, StartEndRequest,
        check::{
            check_partition_names, check_partition_syntax, check_partition_values,
            is_start_end_list, wants_oids,
        },
        resolve_start_end,
    },
    settings::{ElaborateRequest, ElaborateSettings},
    undefined, unsupported,
};
use statement::{
    action::Action,
    ast::{
        column::ColumnDef,
        common::{DefElem, RangeVar},
        create_table::{
            CreateTableStmt, DistributeBy, DistributionKind, LikeOptions, TableElement,
            TableLikeClause,
        },
        partition::PartitionDef,
        type_name::TypeName,
    },
};
use tracing::{debug, info};

/// Elaborates a CREATE TABLE statement into the ordered actions that carry
/// it out. The input is left untouched.
pub fn elaborate_create(
    catalog: &dyn Catalog,
    settings: &ElaborateSettings,
    input: &CreateTableStmt,
    request: &ElaborateRequest,
) -> Result<Elaboration, ElaborateError> {
    let mut stmt = input.clone();

    if stmt.relation.is_temp() && stmt.relation.schema.is_some() {
        return Err(invalid!("temporary tables cannot specify a schema name")
            .at(stmt.relation.location));
    }

    let (namespace, existing) = catalog.resolve_creation_namespace(&stmt.relation)?;
    if stmt.if_not_exists && existing.is_some() {
        let mut elaboration = Elaboration::default();
        let notice = format!("relation \"{}\" already exists, skipping", stmt.relation.name);
        info!("NOTICE: {}", notice);
        elaboration.notices.push(notice);
        return Ok(elaboration);
    }

    if stmt.relation.schema.is_none() && !stmt.relation.is_temp() {
        stmt.relation.schema = Some(namespace.clone());
    }

    let stmt_type = if stmt.is_foreign() {
        StmtType::CreateForeignTable
    } else {
        StmtType::CreateTable
    };
    let mut cxt = WorkingContext::new(catalog, settings, stmt_type, stmt.relation.clone());
    cxt.namespace = namespace;
    cxt.inh_relations = stmt.inherits.clone();
    cxt.subcluster = stmt.subcluster.clone();
    cxt.internal_data = stmt.internal_data.clone();
    cxt.uuids = request.uuid_queue();

    if settings.is_coordinator && settings.is_first_node && stmt.internal_data.is_some() {
        return Err(unsupported!(
            "Do not support create table with INTERNAL DATA clause."
        ));
    }

    if let Some(foreign) = &stmt.foreign {
        cxt.can_informational_constraint = foreign.informational_constraints;
        cxt.value_partitioned_foreign = foreign.value_partitioned;
    }

    if let Some(of_type) = &stmt.of_type {
        if !stmt.inherits.is_empty() {
            return Err(invalid!("cannot create a typed table with INHERITS"));
        }
        transform_of_type(&mut cxt, of_type)?;
    }

    let pre_check = !settings.emit_serial_notices();
    for element in std::mem::take(&mut stmt.elements) {
        match element {
            TableElement::Column(column) => transform_column_definition(&mut cxt, column, pre_check)?,
            TableElement::Constraint(constraint) => transform_table_constraint(&mut cxt, constraint)?,
            TableElement::Like(mut clause) => {
                check_like_conflicts(&stmt, &clause, settings)?;
                transform_table_like_clause(&mut cxt, &mut clause, pre_check)?;
                if !stmt.relation.is_temp() && clause.relation.is_temp() {
                    return Err(unsupported!(
                        "do not support create non-local-temp table like local temp table"
                    ));
                }
            }
        }
    }

    if let Some(cloned) = cxt.cloned_partition.take() {
        stmt.partition = Some(cloned);
    }
    check_partition_syntax(&stmt, catalog, settings)?;

    if let Some(part) = &mut stmt.partition {
        cxt.is_partitioned = true;
        cxt.partition_keys = part.keys.clone();
        check_partition_values(&part.definitions)?;

        if is_start_end_list(&part.definitions) {
            let keys = partition_keys(&cxt, &part.keys)?;
            let defs: Vec<_> = part
                .definitions
                .iter()
                .filter_map(|d| match d {
                    PartitionDef::StartEnd(d) => Some(d.clone()),
                    _ => None,
                })
                .collect();
            let resolved = resolve_start_end(
                &StartEndRequest::new(&keys, &defs),
                settings,
                &mut cxt.notices,
            )?;
            debug!(
                "START/END list of \"{}\" resolved to {} partition(s)",
                stmt.relation.name,
                resolved.len()
            );
            part.definitions = resolved.into_definitions();
        }

        // Remote nodes trust the coordinator's check.
        if settings.is_coordinator && settings.is_first_node {
            check_partition_names(&part.definitions)?;
        }
    }

    if let Some(reloptions) = cxt.reloptions.take() {
        stmt.options.extend(reloptions);
    }
    if cxt.has_oids {
        stmt.options.push(DefElem::new("oids", "true"));
    }
    cxt.has_oids = wants_oids(&stmt);

    match cxt.distribute_by.clone() {
        Some(dist) => stmt.distribute_by = Some(dist),
        None => cxt.distribute_by = stmt.distribute_by.clone(),
    }
    if let Some(dist) = &stmt.distribute_by {
        match dist.kind {
            DistributionKind::RoundRobin if stmt.is_foreign() => {
                return Err(unsupported!(
                    "For foreign table ROUNDROBIN distribution type is built-in support."
                ));
            }
            DistributionKind::RoundRobin => {
                return Err(unsupported!("Unsupport ROUNDROBIN distribute type"));
            }
            DistributionKind::Modulo => {
                return Err(unsupported!("Unsupport MODULO distribute type"));
            }
            DistributionKind::Hash | DistributionKind::Replication => {}
        }
    }

    // Everything planned so far runs after the index actions.
    let saved_alist = std::mem::take(&mut cxt.alist);

    let mut indexes = transform_index_constraints(&mut cxt)?;
    mark_created_indexes(&mut indexes, cxt.can_informational_constraint);
    transform_fk_constraints(&mut cxt, true, false)?;
    check_cluster_constraints(&cxt)?;
    check_reserved_columns(&cxt)?;

    stmt.elements = std::mem::take(&mut cxt.columns)
        .into_iter()
        .map(TableElement::Column)
        .collect();
    stmt.constraints = std::mem::take(&mut cxt.ck_constraints);
    stmt.constraints
        .append(&mut std::mem::take(&mut cxt.cluster_constraints));
    if stmt.internal_data.is_none() {
        stmt.internal_data = cxt.internal_data.take();
    }

    if !stmt.is_foreign()
        && stmt.distribute_by.is_none()
        && stmt.inherits.is_empty()
        && !cxt.fallback_dist_col.is_empty()
    {
        debug!(
            "Distributing \"{}\" by hash on fallback column(s) {:?}",
            stmt.relation.name, cxt.fallback_dist_col
        );
        stmt.distribute_by = Some(DistributeBy {
            kind: DistributionKind::Hash,
            columns: std::mem::take(&mut cxt.fallback_dist_col),
        });
    }

    let mut actions = std::mem::take(&mut cxt.blist);
    actions.push(Action::CreateTable(stmt));
    actions.extend(indexes.into_iter().map(Action::CreateIndex));
    actions.append(&mut cxt.alist);
    actions.extend(saved_alist);

    Ok(Elaboration {
        actions,
        notices: cxt.notices.into_vec(),
    })
}

fn check_like_conflicts(
    stmt: &CreateTableStmt,
    clause: &TableLikeClause,
    settings: &ElaborateSettings,
) -> Result<(), ElaborateError> {
    if stmt.partition.is_some() && clause.options.contains(LikeOptions::PARTITION) {
        return Err(
            invalid!("unsupport \"like clause including partition\" for partitioned table")
                .with_detail("use either \"like clause including partition\" or \"partition by\" clause"),
        );
    }
    if !stmt.options.is_empty() && clause.options.contains(LikeOptions::RELOPTIONS) {
        return Err(
            invalid!("unsupport \"like clause including reloptions\" together with \"with\"")
                .with_detail("use either \"like clause including reloptions\" or \"with\" clause"),
        );
    }
    if settings.is_coordinator
        && stmt.distribute_by.is_some()
        && clause.options.contains(LikeOptions::DISTRIBUTION)
    {
        return Err(invalid!(
            "unsupport \"like clause including distribution\" together with \"distribute by\""
        )
        .with_detail("use either \"like clause including distribution\" or \"distribute by\" clause"));
    }
    Ok(())
}

/// `CREATE TABLE t OF type`: one column per live attribute of the type.
fn transform_of_type(
    cxt: &mut WorkingContext<'_>,
    of_type: &TypeName,
) -> Result<(), ElaborateError> {
    cxt.catalog.resolve_type(of_type)?;
    let relation = match of_type.names.as_slice() {
        [schema, name] => RangeVar::qualified(schema, name),
        _ => RangeVar::new(of_type.last_name()),
    };
    let composite = cxt
        .catalog
        .relation_by_name(&relation)
        .filter(|r| r.kind == RelationKind::CompositeType)
        .ok_or_else(|| {
            invalid!("type {} is not a composite type", of_type).at(of_type.location)
        })?;

    for attribute in composite.attributes.iter().filter(|a| !a.dropped) {
        let mut column = ColumnDef::new(&attribute.name, attribute.type_name.clone());
        column.is_from_type = true;
        column.collation = attribute.collation.clone();
        cxt.columns.push(column);
    }
    Ok(())
}

/// Partition key columns with their resolved types.
fn partition_keys(
    cxt: &WorkingContext<'_>,
    names: &[String],
) -> Result<Vec<PartitionKey>, ElaborateError> {
    names
        .iter()
        .map(|name| {
            let column = cxt.column(name).ok_or_else(|| {
                undefined!("partition key column \"{}\" does not exist", name).on(name)
            })?;
            let data_type = match &column.data_type {
                Some(data_type) => data_type.clone(),
                None => cxt.catalog.resolve_type(&column.type_name)?,
            };
            Ok(PartitionKey::new(name, data_type))
        })
        .collect()
}
