use crate::{
    catalog::{IndexInfo, RelationInfo},
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, unsupported,
};
use statement::ast::{
    expr::Expr,
    index::{IndexElem, IndexSpec, NullsOrder, SortOrder},
};

/// Builds a CREATE INDEX for the new table that recreates `source_index` of
/// `source`, renumbering attribute references through `attmap`.
pub fn generate_cloned_index(
    cxt: &WorkingContext<'_>,
    source: &RelationInfo,
    source_index: &IndexInfo,
    attmap: &[i32],
) -> Result<IndexSpec, ElaborateError> {
    let mut index = IndexSpec::new(cxt.relation.clone(), source_index.access_method.clone());
    index.table_space = source_index.tablespace.clone();
    index.unique = source_index.unique;
    index.primary = source_index.primary;
    index.is_partitioned = source_index.partitioned;

    // A table being resized keeps its index names; otherwise the executor
    // picks fresh ones.
    if source.in_resizing {
        index.name = Some(source_index.name.clone());
    }

    let maybe_constraint = index.primary || index.unique || !source_index.exclusion_ops.is_empty();
    if maybe_constraint && let Some(constraint) = &source_index.constraint {
        index.is_constraint = true;
        index.deferrable = constraint.deferrable;
        index.initially_deferred = constraint.initially_deferred;
        index.exclude_op_names = source_index.exclusion_ops.clone();
    }

    let mut exprs = source_index.exprs.iter();
    for key in &source_index.keys {
        let mut elem = if key.attnum > 0 {
            let attribute = source.attribute(key.attnum).ok_or_else(|| {
                ElaborateError::Internal(format!(
                    "index \"{}\" references missing attribute {} of \"{}\"",
                    source_index.name, key.attnum, source.name
                ))
            })?;
            IndexElem::column(attribute.name.clone())
        } else {
            let expr = exprs
                .next()
                .ok_or_else(|| invalid!("too few entries in indexprs list"))?;
            IndexElem::expression(remap(expr, attmap, &source_index.name)?)
        };

        elem.index_col_name = Some(key.column_name.clone());
        elem.collation = key.collation.clone();
        elem.opclass = key.opclass.clone();
        // Ordering is only carried when it differs from the default, so the
        // clone still matches an equivalent constraint index.
        if source_index.am_can_order {
            if key.desc {
                elem.ordering = SortOrder::Desc;
                if !key.nulls_first {
                    elem.nulls_ordering = NullsOrder::Last;
                }
            } else if key.nulls_first {
                elem.nulls_ordering = NullsOrder::First;
            }
        }
        index.params.push(elem);
    }

    index.options = source_index.options.clone();
    if let Some(predicate) = &source_index.predicate {
        index.where_clause = Some(remap(predicate, attmap, &source_index.name)?);
    }
    Ok(index)
}

fn remap(expr: &Expr, attmap: &[i32], index_name: &str) -> Result<Expr, ElaborateError> {
    let (mapped, found_whole_row) = expr.map_attnos(attmap);
    if found_whole_row {
        return Err(unsupported!("cannot convert whole-row table reference").with_detail(
            format!("Index \"{index_name}\" contains a whole-row table reference."),
        ));
    }
    Ok(mapped)
}
