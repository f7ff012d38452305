//! `CREATE TABLE .. (LIKE source INCLUDING ..)`: copies the source table's
//! columns and whichever extra metadata the options ask for.

use crate::{
    catalog::{RelationInfo, RelationKind},
    column::create_seq_owned_by_table,
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, undefined, unsupported,
};
use statement::{
    action::Action,
    ast::{
        column::ColumnDef,
        comment::{CommentStmt, CommentTarget},
        common::{DefElem, Persistence},
        constraint::{ConstraintKind, ConstraintSpec},
        create_table::{LikeOptions, TableLikeClause},
        partition::{PartitionDef, PartitionSpec, PartitionStrategy, RangePartitionDef},
    },
};
use tracing::{debug, info};

pub mod cloned_index;
pub mod meta;

pub use cloned_index::generate_cloned_index;
pub use meta::TableLikeMeta;

/// Storage options that only describe an in-flight redistribution.
const REDISTRIBUTION_OPTIONS: &[&str] = &[
    "append_mode",
    "rel_cn_oid",
    "start_ctid_internal",
    "end_ctid_internal",
];

pub fn transform_table_like_clause(
    cxt: &mut WorkingContext<'_>,
    clause: &mut TableLikeClause,
    pre_check: bool,
) -> Result<(), ElaborateError> {
    let Some(source) = cxt.catalog.relation_by_name(&clause.relation) else {
        // A datanode outside the source's placement group works from the
        // metadata the coordinator shipped along.
        if !cxt.settings.is_coordinator {
            if let Some(bytes) = &cxt.internal_data {
                let decoded = TableLikeMeta::decode(bytes)?;
                return meta::replay(cxt, clause, decoded);
            }
            let schema = clause.relation.schema.as_deref().unwrap_or(&cxt.namespace);
            return Err(undefined!(
                "Table {}.{} does not exist in current datanode.",
                schema,
                clause.relation.name
            ));
        }
        return Err(undefined!("relation \"{}\" does not exist", clause.relation.name)
            .on(&clause.relation.name)
            .at(clause.relation.location));
    };

    check_like_options(cxt, clause, &source)?;

    let mut meta = TableLikeMeta::default();
    if source.is_temp() {
        clause.relation.persistence = Persistence::Temp;
        meta.temp_table = true;
    }
    if source.kind == RelationKind::View {
        return Err(unsupported!("VIEW in LIKE clauses is not supported")
            .with_detail("The feature is not currently supported"));
    }

    let multi_group = cxt.settings.is_coordinator
        && cxt.settings.is_first_node
        && cxt
            .catalog
            .is_multi_nodegroup(cxt.subcluster.as_deref(), source.oid);
    let options = clause.options;

    // attmap[source attnum - 1] = target attnum; zero for skipped columns.
    let mut attmap = vec![0; source.attributes.len()];
    for (i, attribute) in source.attributes.iter().enumerate() {
        if attribute.dropped && !cxt.settings.cluster_resize {
            continue;
        }
        let mut column = ColumnDef::new(&attribute.name, attribute.type_name.clone());
        if attribute.dropped {
            column.dropped = true;
        } else {
            column.is_not_null = attribute.not_null;
            column.collation = attribute.collation.clone();

            if let Some(default) = &attribute.default {
                if let Some(sequence) = default.nextval_target()
                    && source.owns_sequence(&sequence)
                {
                    column.is_serial = true;
                    create_seq_owned_by_table(cxt, &mut column, pre_check)?;
                }
                if !column.is_serial && options.contains(LikeOptions::DEFAULTS) {
                    column.cooked_default = Some(default.clone());
                }
            }
            if options.contains(LikeOptions::STORAGE) {
                column.storage = attribute.storage.clone();
            }
        }

        if multi_group {
            let mut shipped = column.clone();
            if shipped.is_serial {
                shipped.constraints.clear();
                shipped.raw_default = None;
            }
            meta.columns.push(shipped);
        }

        if options.contains(LikeOptions::COMMENTS)
            && let Some(comment) = &attribute.comment
        {
            let stmt = CommentStmt {
                target: CommentTarget::Column {
                    relation: cxt.relation.clone(),
                    column: column.name.clone(),
                },
                comment: Some(comment.clone()),
            };
            if multi_group {
                meta.comments.push(stmt.clone());
            }
            cxt.alist.push(Action::Comment(stmt));
        }

        cxt.columns.push(column);
        attmap[i] = cxt.columns.len() as i32;
    }

    if options.contains(LikeOptions::CONSTRAINTS) {
        let with_comments = options.contains(LikeOptions::COMMENTS);
        copy_constraints(cxt, &source, &attmap, with_comments, multi_group.then_some(&mut meta))?;
    }

    // Partitioning first: it decides how the cloned indexes are built.
    if options.contains(LikeOptions::PARTITION)
        && let Some(spec) = clone_partition_spec(&source)?
    {
        cxt.cloned_partition = Some(spec);
    }

    if options.contains(LikeOptions::INDEXES) {
        for oid in &source.indexes {
            let source_index = cxt.catalog.index(*oid).ok_or_else(|| {
                ElaborateError::Internal(format!("cache lookup failed for index {oid}"))
            })?;
            let mut index = generate_cloned_index(cxt, &source, &source_index, &attmap)?;
            if options.contains(LikeOptions::COMMENTS) {
                index.comment = source_index.comment.clone();
            }
            cxt.inh_indexes.push(index);
        }
    }

    if options.contains(LikeOptions::RELOPTIONS) {
        let reloptions = strip_reloptions(&source.reloptions, cxt.relation.is_temp());
        meta.reloptions = reloptions.clone();
        cxt.reloptions = Some(reloptions);
    }

    if options.contains(LikeOptions::DISTRIBUTION) {
        cxt.distribute_by = source.distribution.clone();
    }

    if options.contains(LikeOptions::OIDS) {
        cxt.has_oids = source.has_oids;
    }

    if multi_group {
        meta.options = options;
        meta.has_oids = cxt.has_oids;
        meta.partition = cxt.cloned_partition.clone();
        meta.indexes = cxt.inh_indexes.clone();
        let bytes = meta.encode()?;
        info!(
            "LIKE \"{}\" crosses placement groups; shipping {} bytes of table metadata",
            source.name,
            bytes.len()
        );
        cxt.internal_data = Some(bytes);
        cxt.like_meta = Some(meta);
    }

    if cxt.settings.cluster_resize {
        cxt.is_resizing = source.in_resizing;
    }

    debug!(
        "LIKE \"{}\" contributed {} column(s) and {} index(es)",
        source.name,
        cxt.columns.len(),
        cxt.inh_indexes.len()
    );
    Ok(())
}

fn check_like_options(
    cxt: &WorkingContext<'_>,
    clause: &mut TableLikeClause,
    source: &RelationInfo,
) -> Result<(), ElaborateError> {
    match source.kind {
        RelationKind::Table
        | RelationKind::View
        | RelationKind::CompositeType
        | RelationKind::ForeignTable => {}
        RelationKind::Index | RelationKind::Sequence => {
            return Err(invalid!(
                "\"{}\" is not a table, view, composite type, or foreign table",
                source.name
            )
            .on(&source.name)
            .at(clause.relation.location));
        }
    }

    // INCLUDING ALL quietly skips PARTITION for a plain table.
    if clause.options.contains(LikeOptions::EXPLICIT_ALL) && !source.is_partitioned() {
        clause.options.remove(LikeOptions::PARTITION);
    }

    if clause.options.contains(LikeOptions::PARTITION) {
        if !source.is_partitioned() {
            return Err(invalid!(
                "could not specify \"INCLUDING PARTITION\" for non-partitioned-table relation:\"{}\"",
                source.name
            ));
        }
        if cxt.cloned_partition.is_some() {
            return Err(invalid!(
                "could not specify 2 or more \"INCLUDING PARTITION\" clauses, only one is allowed"
            ));
        }
    }
    if clause.options.contains(LikeOptions::RELOPTIONS) && cxt.reloptions.is_some() {
        return Err(invalid!(
            "could not specify 2 or more \"INCLUDING RELOPTIONS\" clauses, only one is allowed"
        ));
    }
    if clause.options.contains(LikeOptions::DISTRIBUTION) && cxt.distribute_by.is_some() {
        return Err(invalid!(
            "could not specify 2 or more \"INCLUDING DISTRIBUTION\" clauses, only one is allowed"
        ));
    }
    Ok(())
}

/// CHECK constraints (renumbered, with comments) and the partial cluster key.
fn copy_constraints(
    cxt: &mut WorkingContext<'_>,
    source: &RelationInfo,
    attmap: &[i32],
    with_comments: bool,
    mut meta: Option<&mut TableLikeMeta>,
) -> Result<(), ElaborateError> {
    for check in &source.checks {
        let (expr, found_whole_row) = check.expr.map_attnos(attmap);
        if found_whole_row {
            return Err(unsupported!("cannot convert whole-row table reference").with_detail(
                format!(
                    "Constraint \"{}\" contains a whole-row reference to table \"{}\".",
                    check.name, source.name
                ),
            ));
        }
        let constraint = ConstraintSpec::named(
            &check.name,
            ConstraintKind::Check {
                raw: None,
                cooked: Some(expr),
            },
        );
        if let Some(meta) = meta.as_deref_mut() {
            meta.check_constraints.push(constraint.clone());
        }
        cxt.ck_constraints.push(constraint);

        if with_comments && let Some(comment) = &check.comment {
            let stmt = CommentStmt {
                target: CommentTarget::Constraint {
                    relation: cxt.relation.clone(),
                    name: check.name.clone(),
                },
                comment: Some(comment.clone()),
            };
            if let Some(meta) = meta.as_deref_mut() {
                meta.comments.push(stmt.clone());
            }
            cxt.alist.push(Action::Comment(stmt));
        }
    }

    if !source.cluster_keys.is_empty() {
        let keys = source
            .cluster_keys
            .iter()
            .map(|attnum| {
                source.attribute(*attnum).map(|a| a.name.clone()).ok_or_else(|| {
                    ElaborateError::Internal(format!(
                        "cluster key attribute {attnum} missing from \"{}\"",
                        source.name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let constraint = ConstraintSpec::new(ConstraintKind::ClusterKey { keys });
        if let Some(meta) = meta {
            meta.cluster_keys.push(constraint.clone());
        }
        cxt.cluster_constraints.push(constraint);
    }
    Ok(())
}

/// The source's partition key and its non-interval partitions in boundary
/// order. `None` when there is nothing to copy.
fn clone_partition_spec(source: &RelationInfo) -> Result<Option<PartitionSpec>, ElaborateError> {
    let Some(info) = &source.partition else {
        return Ok(None);
    };
    if info.strategy == PartitionStrategy::List {
        return Err(unsupported!(
            "\" including partition \" for list partitioned relation: \"{}\" not implemented yet",
            source.name
        ));
    }
    if info.partitions.is_empty() && info.strategy != PartitionStrategy::Value {
        return Ok(None);
    }

    let keys = info
        .key_attnums
        .iter()
        .map(|attnum| {
            source.attribute(*attnum).map(|a| a.name.clone()).ok_or_else(|| {
                invalid!(
                    "partition key column's number of {} not in the range of all its columns",
                    source.name
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let definitions = info
        .ordered()
        .into_iter()
        .filter(|p| !p.interval_created)
        .map(|p| {
            PartitionDef::LessThan(RangePartitionDef {
                name: p.name.clone(),
                boundary: p.boundary.clone(),
                tablespace: p.tablespace.clone(),
            })
        })
        .collect();

    Ok(Some(PartitionSpec {
        strategy: info.strategy,
        keys,
        definitions,
        interval: match info.strategy {
            PartitionStrategy::Interval => info.interval.clone(),
            _ => None,
        },
        row_movement: info.row_movement,
        location: None,
    }))
}

/// Drops options that must not carry over: `on_commit_delete_rows` unless
/// the new table is temporary, and every redistribution marker.
fn strip_reloptions(options: &[DefElem], target_is_temp: bool) -> Vec<DefElem> {
    options
        .iter()
        .filter(|o| target_is_temp || !o.name.eq_ignore_ascii_case("on_commit_delete_rows"))
        .filter(|o| !REDISTRIBUTION_OPTIONS.iter().any(|r| o.name.eq_ignore_ascii_case(r)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{AttributeInfo, IndexInfo, MemoryCatalog, PartitionEntry, PartitionInfo},
        context::StmtType,
        error::ErrorKind,
        settings::ElaborateSettings,
    };
    use model::core::{boundary::BoundaryValue, identifiers::QualifiedName, value::Value};
    use statement::ast::{common::RangeVar, expr::Expr, type_name::TypeName};

    fn source() -> RelationInfo {
        let mut rel = RelationInfo::table("public", "src")
            .with_attribute(
                AttributeInfo::new("id", TypeName::new("int4"))
                    .not_null()
                    .with_default(Expr::nextval(&QualifiedName::qualified("public", "src_id_seq"))),
            )
            .with_attribute(AttributeInfo::new("gone", TypeName::new("int4")).dropped())
            .with_attribute(
                AttributeInfo::new("price", TypeName::new("numeric"))
                    .with_default(Value::Int4(0).into())
                    .with_comment("unit price"),
            )
            .with_check(
                "price_positive",
                Expr::binary(">", Expr::var(3), Value::Int4(0).into()),
            );
        rel.owned_sequences
            .push(QualifiedName::qualified("public", "src_id_seq"));
        rel.reloptions = vec![
            DefElem::new("fillfactor", "70"),
            DefElem::new("on_commit_delete_rows", "true"),
            DefElem::new("append_mode", "on"),
        ];
        rel
    }

    fn catalog(rel: RelationInfo) -> MemoryCatalog {
        let pkey = IndexInfo::on_columns(&rel, "src_pkey", &["id"])
            .primary()
            .constraint("src_pkey");
        MemoryCatalog::new()
            .with_relation(rel)
            .with_index("src", pkey)
    }

    fn like(options: LikeOptions) -> TableLikeClause {
        TableLikeClause {
            relation: RangeVar::new("src"),
            options,
        }
    }

    fn cxt<'a>(catalog: &'a MemoryCatalog, settings: &'a ElaborateSettings) -> WorkingContext<'a> {
        WorkingContext::new(
            catalog,
            settings,
            StmtType::CreateTable,
            RangeVar::qualified("public", "dst"),
        )
    }

    #[test]
    fn test_including_all_copies_everything() {
        let catalog = catalog(source());
        let settings = ElaborateSettings::default();
        let mut cxt = cxt(&catalog, &settings);
        let mut clause = like(LikeOptions::ALL);

        transform_table_like_clause(&mut cxt, &mut clause, false).unwrap();

        // PARTITION is dropped silently for a plain source.
        assert!(!clause.options.contains(LikeOptions::PARTITION));
        let names: Vec<_> = cxt.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "price"]);

        let id = &cxt.columns[0];
        assert!(id.is_serial && id.is_not_null);
        assert_eq!(
            id.default_expr().and_then(Expr::nextval_target),
            Some(QualifiedName::qualified("public", "dst_id_seq"))
        );
        assert_eq!(cxt.columns[1].cooked_default, Some(Expr::from(Value::Int4(0))));
        assert_eq!(cxt.blist.len(), 1);
        assert_eq!(cxt.notices.as_slice().len(), 1);

        let ConstraintKind::Check { cooked, .. } = &cxt.ck_constraints[0].kind else {
            panic!("expected check constraint");
        };
        assert_eq!(
            cooked.as_ref(),
            Some(&Expr::binary(">", Expr::var(2), Value::Int4(0).into()))
        );

        assert_eq!(cxt.inh_indexes.len(), 1);
        assert!(cxt.inh_indexes[0].primary);
        assert!(cxt.alist.iter().any(|a| matches!(a, Action::Comment(_))));

        let reloptions: Vec<_> = cxt
            .reloptions
            .as_ref()
            .unwrap()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(reloptions, vec!["fillfactor"]);
        assert!(cxt.internal_data.is_none());
    }

    #[test]
    fn test_plain_like_copies_columns_only() {
        let catalog = catalog(source());
        let settings = ElaborateSettings::default();
        let mut cxt = cxt(&catalog, &settings);
        let mut clause = like(LikeOptions::empty());

        transform_table_like_clause(&mut cxt, &mut clause, true).unwrap();
        assert_eq!(cxt.columns.len(), 2);
        assert!(cxt.columns[1].cooked_default.is_none());
        assert!(cxt.ck_constraints.is_empty());
        assert!(cxt.inh_indexes.is_empty());
        assert!(cxt.alist.iter().all(|a| !matches!(a, Action::Comment(_))));
        // The serial column still gets its own sequence, quietly.
        assert_eq!(cxt.blist.len(), 1);
        assert!(cxt.notices.as_slice().is_empty());
    }

    #[test]
    fn test_like_errors() {
        let catalog = catalog(source()).with_relation(RelationInfo::new(
            "public",
            "v",
            RelationKind::View,
        ));
        let settings = ElaborateSettings::default();

        let mut clause = TableLikeClause {
            relation: RangeVar::new("nope"),
            options: LikeOptions::empty(),
        };
        let err = transform_table_like_clause(&mut cxt(&catalog, &settings), &mut clause, false)
            .unwrap_err();
        assert_eq!(err.message(), "relation \"nope\" does not exist");

        let mut clause = like(LikeOptions::PARTITION);
        let err = transform_table_like_clause(&mut cxt(&catalog, &settings), &mut clause, false)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "could not specify \"INCLUDING PARTITION\" for non-partitioned-table relation:\"src\""
        );

        let mut cxt_twice = cxt(&catalog, &settings);
        cxt_twice.reloptions = Some(Vec::new());
        let err = transform_table_like_clause(&mut cxt_twice, &mut like(LikeOptions::RELOPTIONS), false)
            .unwrap_err();
        assert!(err.message().contains("only one is allowed"));

        let mut clause = TableLikeClause {
            relation: RangeVar::new("v"),
            options: LikeOptions::empty(),
        };
        let err = transform_table_like_clause(&mut cxt(&catalog, &settings), &mut clause, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.message(), "VIEW in LIKE clauses is not supported");

        let whole_row = source().with_check("row_ok", Expr::var(0));
        let catalog = MemoryCatalog::new().with_relation(whole_row);
        let err = transform_table_like_clause(
            &mut cxt(&catalog, &settings),
            &mut like(LikeOptions::CONSTRAINTS),
            false,
        )
        .unwrap_err();
        assert_eq!(err.message(), "cannot convert whole-row table reference");
        assert_eq!(
            err.detail(),
            Some("Constraint \"row_ok\" contains a whole-row reference to table \"src\".")
        );
    }

    #[test]
    fn test_including_partition_skips_interval_partitions() {
        let mut interval = PartitionEntry::new("sys_p1", Value::Int4(300).into());
        interval.interval_created = true;
        let rel = source().with_partition(PartitionInfo::range(
            vec![1],
            vec![
                PartitionEntry::new("p1", Value::Int4(100).into()),
                PartitionEntry::new("p2", Value::Int4(200).into()),
                interval,
            ],
        ));
        let catalog = catalog(rel);
        let settings = ElaborateSettings::default();
        let mut cxt = cxt(&catalog, &settings);

        transform_table_like_clause(&mut cxt, &mut like(LikeOptions::ALL), false).unwrap();
        let spec = cxt.cloned_partition.as_ref().unwrap();
        assert_eq!(spec.keys, vec!["id".to_string()]);
        assert_eq!(spec.definitions.len(), 2);
        assert!(spec.interval.is_none());

        // A second INCLUDING PARTITION is refused.
        let err = transform_table_like_clause(&mut cxt, &mut like(LikeOptions::PARTITION), false)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "could not specify 2 or more \"INCLUDING PARTITION\" clauses, only one is allowed"
        );
    }

    #[test]
    fn test_including_partition_sorts_by_boundary() {
        let rel = source().with_partition(PartitionInfo::range(
            vec![1],
            vec![
                PartitionEntry::new("pmax", BoundaryValue::MaxValue),
                PartitionEntry::new("p2", Value::Int4(200).into()),
                PartitionEntry::new("p1", Value::Int4(100).into()),
            ],
        ));
        let catalog = catalog(rel);
        let settings = ElaborateSettings::default();
        let mut cxt = cxt(&catalog, &settings);

        transform_table_like_clause(&mut cxt, &mut like(LikeOptions::ALL), false).unwrap();
        let spec = cxt.cloned_partition.as_ref().unwrap();
        let names: Vec<&str> = spec.definitions.iter().map(PartitionDef::name).collect();
        assert_eq!(names, vec!["p1", "p2", "pmax"]);
    }

    #[test]
    fn test_cross_group_source_ships_metadata() {
        let mut rel = source();
        rel.group = Some("group_a".into());
        let catalog = catalog(rel);
        let settings = ElaborateSettings::default();
        let mut coordinator = cxt(&catalog, &settings);
        transform_table_like_clause(&mut coordinator, &mut like(LikeOptions::ALL), false).unwrap();

        let bytes = coordinator.internal_data.clone().unwrap();
        let shipped = TableLikeMeta::decode(&bytes).unwrap();
        assert_eq!(Some(&shipped), coordinator.like_meta.as_ref());
        assert!(shipped.columns[0].is_serial);
        assert!(shipped.columns[0].raw_default.is_none());
        assert!(shipped.columns[0].constraints.is_empty());
        assert_eq!(shipped.indexes.len(), 1);

        // A datanode outside the group cannot see "src" and replays the blob.
        let empty = MemoryCatalog::new();
        let datanode = ElaborateSettings {
            is_coordinator: false,
            ..Default::default()
        };
        let mut remote = cxt(&empty, &datanode);
        remote.internal_data = Some(bytes);
        transform_table_like_clause(&mut remote, &mut like(LikeOptions::ALL), false).unwrap();
        assert_eq!(remote.columns.len(), 2);
        assert_eq!(remote.inh_indexes.len(), 1);
        assert_eq!(remote.blist.len(), 1);

        let mut lost = cxt(&empty, &datanode);
        let err = transform_table_like_clause(&mut lost, &mut like(LikeOptions::ALL), false)
            .unwrap_err();
        assert_eq!(err.message(), "Table public.src does not exist in current datanode.");
    }
}
