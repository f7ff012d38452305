//! Table metadata gathered by a LIKE clause whose source lives in another
//! placement group. The coordinator encodes it into the statement; a datanode
//! that cannot see the source replays it instead.

use crate::{
    column::create_seq_owned_by_table,
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    unsupported,
};
use serde::{Deserialize, Serialize};
use statement::{
    action::Action,
    ast::{
        column::ColumnDef,
        comment::CommentStmt,
        common::{DefElem, Persistence},
        constraint::ConstraintSpec,
        create_table::{LikeOptions, TableLikeClause},
        expr::Expr,
        index::IndexSpec,
        partition::PartitionSpec,
    },
};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableLikeMeta {
    pub options: LikeOptions,
    pub has_oids: bool,
    /// Copied columns; serial ones carry no default or constraints.
    pub columns: Vec<ColumnDef>,
    pub comments: Vec<CommentStmt>,
    pub check_constraints: Vec<ConstraintSpec>,
    pub cluster_keys: Vec<ConstraintSpec>,
    pub reloptions: Vec<DefElem>,
    pub partition: Option<PartitionSpec>,
    pub indexes: Vec<IndexSpec>,
    pub temp_table: bool,
}

impl TableLikeMeta {
    pub fn encode(&self) -> Result<Vec<u8>, ElaborateError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ElaborateError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Rebuilds the LIKE results from a decoded blob.
pub fn replay(
    cxt: &mut WorkingContext<'_>,
    clause: &mut TableLikeClause,
    meta: TableLikeMeta,
) -> Result<(), ElaborateError> {
    debug!(
        "Replaying LIKE \"{}\" from shipped metadata ({} column(s), {} index(es))",
        clause.relation.name,
        meta.columns.len(),
        meta.indexes.len()
    );
    clause.options = meta.options;
    cxt.has_oids = meta.has_oids;
    cxt.cloned_partition = meta.partition;
    cxt.inh_indexes = meta.indexes;
    cxt.cluster_constraints = meta.cluster_keys;
    cxt.ck_constraints = meta.check_constraints;
    cxt.alist = meta.comments.into_iter().map(Action::Comment).collect();
    cxt.reloptions = Some(meta.reloptions);
    if meta.temp_table {
        clause.relation.persistence = Persistence::Temp;
    }

    let mut columns = meta.columns;
    for column in &mut columns {
        if column.is_serial {
            create_seq_owned_by_table(cxt, column, false)?;
        } else if let Some(default) = &column.cooked_default {
            check_like_sequence(cxt, default)?;
        }
    }
    cxt.columns = columns;
    Ok(())
}

/// A non-serial default may still call `nextval` on a sequence; it has to
/// exist on this node too.
fn check_like_sequence(cxt: &WorkingContext<'_>, default: &Expr) -> Result<(), ElaborateError> {
    match default.nextval_target() {
        Some(sequence) if !cxt.catalog.sequence_exists(&sequence) => Err(unsupported!(
            "CREATE TABLE LIKE with column sequence in different NodeGroup is not supported."
        )
        .with_detail("Recommend to LIKE table with sequence in installation NodeGroup.")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::MemoryCatalog, context::StmtType, error::ErrorKind, settings::ElaborateSettings,
    };
    use model::core::{identifiers::QualifiedName, value::Value};
    use statement::ast::{
        comment::CommentTarget,
        common::RangeVar,
        constraint::ConstraintKind,
        index::IndexElem,
        partition::{PartitionDef, RangePartitionDef},
        type_name::TypeName,
    };

    fn sample() -> TableLikeMeta {
        let target = RangeVar::qualified("public", "copy");
        let mut serial = ColumnDef::new("id", TypeName::new("int4"));
        serial.is_serial = true;
        let mut price = ColumnDef::new("price", TypeName::new("numeric").with_typmods(&[10, 2]));
        price.cooked_default = Some(Value::numeric("9.99").unwrap().into());
        let mut index = IndexSpec::new(target.clone(), "btree");
        index.params.push(IndexElem::column("id"));
        index.unique = true;

        TableLikeMeta {
            options: LikeOptions::DEFAULTS | LikeOptions::INDEXES | LikeOptions::COMMENTS,
            has_oids: false,
            columns: vec![serial, price],
            comments: vec![CommentStmt {
                target: CommentTarget::Column {
                    relation: target,
                    column: "price".into(),
                },
                comment: Some("unit price".into()),
            }],
            check_constraints: vec![ConstraintSpec::named(
                "positive",
                ConstraintKind::Check {
                    raw: None,
                    cooked: Some(Expr::binary(">", Expr::var(2), Value::Int4(0).into())),
                },
            )],
            cluster_keys: Vec::new(),
            reloptions: vec![DefElem::new("fillfactor", "70")],
            partition: Some(PartitionSpec::range(
                &["id"],
                vec![PartitionDef::LessThan(RangePartitionDef::new(
                    "p1",
                    vec![Value::Int4(100).into()],
                ))],
            )),
            indexes: vec![index],
            temp_table: false,
        }
    }

    #[test]
    fn test_blob_decodes_to_the_same_structure() {
        let meta = sample();
        let bytes = meta.encode().unwrap();
        assert_eq!(TableLikeMeta::decode(&bytes).unwrap(), meta);

        let err = TableLikeMeta::decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_replay_recreates_serial_sequences() {
        let catalog = MemoryCatalog::new();
        let settings = ElaborateSettings {
            is_coordinator: false,
            ..Default::default()
        };
        let mut cxt = WorkingContext::new(
            &catalog,
            &settings,
            StmtType::CreateTable,
            RangeVar::qualified("public", "copy"),
        );
        let mut clause = TableLikeClause {
            relation: RangeVar::new("remote"),
            options: LikeOptions::empty(),
        };

        replay(&mut cxt, &mut clause, sample()).unwrap();
        assert!(clause.options.contains(LikeOptions::INDEXES));
        assert_eq!(cxt.columns.len(), 2);
        assert_eq!(
            cxt.columns[0].default_expr().and_then(|e| e.nextval_target()),
            Some(QualifiedName::qualified("public", "copy_id_seq"))
        );
        assert_eq!(cxt.blist.len(), 1);
        // The comment comes first, then the OWNED BY for the new sequence.
        assert_eq!(cxt.alist.len(), 2);
        assert!(matches!(cxt.alist[0], Action::Comment(_)));
        assert_eq!(cxt.inh_indexes.len(), 1);
        assert_eq!(cxt.reloptions.as_ref().map(Vec::len), Some(1));
        assert_eq!(cxt.notices.as_slice().len(), 1);
    }

    #[test]
    fn test_replay_rejects_unknown_sequences() {
        let catalog = MemoryCatalog::new();
        let settings = ElaborateSettings::default();
        let mut cxt = WorkingContext::new(
            &catalog,
            &settings,
            StmtType::CreateTable,
            RangeVar::qualified("public", "copy"),
        );
        let mut meta = sample();
        meta.columns[1].cooked_default =
            Some(Expr::nextval(&QualifiedName::qualified("public", "shared_seq")));
        let mut clause = TableLikeClause {
            relation: RangeVar::new("remote"),
            options: LikeOptions::empty(),
        };
        let err = replay(&mut cxt, &mut clause, meta).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
