use crate::{
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, undefined,
};
use statement::{
    action::Action,
    ast::{
        alter_table::{AlterTableCmd, AlterTableStmt},
        constraint::ConstraintKind,
        create_table::DistributionKind,
    },
};
use tracing::debug;

/// Post-processes the collected foreign keys.
///
/// With `skip_validation` the keys are marked valid without a scan, and on a
/// coordinator the referencing columns that line up with the referenced
/// table's distribution key become the fallback distribution column. Unless
/// called from `ADD CONSTRAINT`, the keys move into one trailing
/// `ALTER TABLE` action.
pub fn transform_fk_constraints(
    cxt: &mut WorkingContext<'_>,
    skip_validation: bool,
    is_add_constraint: bool,
) -> Result<(), ElaborateError> {
    if cxt.fk_constraints.is_empty() {
        return Ok(());
    }

    if skip_validation {
        for i in 0..cxt.fk_constraints.len() {
            let location = cxt.fk_constraints[i].location;
            let ConstraintKind::ForeignKey(fk) = &mut cxt.fk_constraints[i].kind else {
                continue;
            };
            fk.skip_validation = true;
            fk.initially_valid = true;

            if !cxt.settings.is_coordinator
                || !cxt.fallback_dist_col.is_empty()
                || fk.pk_attrs.is_empty()
            {
                continue;
            }
            if fk.pk_attrs.len() != fk.fk_attrs.len() {
                return Err(invalid!(
                    "number of referencing and referenced columns for foreign key disagree"
                )
                .at(location));
            }

            let referenced = cxt.catalog.relation_by_name(&fk.pk_table).ok_or_else(|| {
                undefined!("relation \"{}\" does not exist", fk.pk_table.name).on(&fk.pk_table.name)
            })?;
            let Some(dist) = referenced.distribution else {
                continue;
            };
            if dist.kind == DistributionKind::Replication {
                continue;
            }

            let mut fallback = Vec::with_capacity(dist.columns.len());
            for dist_col in &dist.columns {
                match fk.pk_attrs.iter().position(|a| a == dist_col) {
                    Some(pos) => fallback.push(fk.fk_attrs[pos].clone()),
                    None => {
                        fallback.clear();
                        break;
                    }
                }
            }
            cxt.fallback_dist_col = fallback;
        }
    }

    if !is_add_constraint {
        let cmds: Vec<_> = cxt
            .fk_constraints
            .drain(..)
            .map(AlterTableCmd::ProcessedConstraint)
            .collect();
        debug!(
            "Deferring {} foreign key(s) on \"{}\" to a trailing ALTER TABLE",
            cmds.len(),
            cxt.relation.name
        );
        cxt.alist
            .push(Action::AlterTable(AlterTableStmt::new(cxt.relation.clone(), cmds)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{MemoryCatalog, RelationInfo},
        context::StmtType,
        settings::ElaborateSettings,
    };
    use statement::ast::{
        common::RangeVar,
        constraint::{ConstraintSpec, ForeignKeySpec},
        create_table::DistributeBy,
    };

    fn fk(fk_attrs: &[&str], pk_attrs: &[&str]) -> ConstraintSpec {
        ConstraintSpec::new(ConstraintKind::ForeignKey(ForeignKeySpec::new(
            RangeVar::new("parent"),
            fk_attrs,
            pk_attrs,
        )))
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new().with_relation(
            RelationInfo::table("public", "parent")
                .with_column("a", "int4")
                .with_column("b", "int4")
                .with_distribution(DistributeBy::hash(&["b"])),
        )
    }

    fn coordinator() -> ElaborateSettings {
        ElaborateSettings {
            is_coordinator: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_fks_move_to_trailing_alter() {
        let catalog = catalog();
        let settings = coordinator();
        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::CreateTable, RangeVar::new("child"));
        cxt.fk_constraints.push(fk(&["x", "y"], &["a", "b"]));
        cxt.fk_constraints.push(fk(&["z"], &[]));

        transform_fk_constraints(&mut cxt, true, false).unwrap();
        assert!(cxt.fk_constraints.is_empty());
        assert_eq!(cxt.fallback_dist_col, vec!["y".to_string()]);

        let alter = cxt.alist[0].as_alter_table().unwrap();
        assert_eq!(alter.cmds.len(), 2);
        let AlterTableCmd::ProcessedConstraint(c) = &alter.cmds[0] else {
            panic!("expected processed constraint");
        };
        let ConstraintKind::ForeignKey(spec) = &c.kind else {
            panic!("expected foreign key");
        };
        assert!(spec.skip_validation && spec.initially_valid);
    }

    #[test]
    fn test_fallback_rules() {
        let catalog = catalog();
        let settings = coordinator();

        // The distribution column is not referenced.
        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::CreateTable, RangeVar::new("child"));
        cxt.fk_constraints.push(fk(&["x"], &["a"]));
        transform_fk_constraints(&mut cxt, true, false).unwrap();
        assert!(cxt.fallback_dist_col.is_empty());

        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::CreateTable, RangeVar::new("child"));
        cxt.fk_constraints.push(fk(&["x"], &["a", "b"]));
        let err = transform_fk_constraints(&mut cxt, true, false).unwrap_err();
        assert_eq!(
            err.message(),
            "number of referencing and referenced columns for foreign key disagree"
        );

        // Datanodes leave the fallback alone.
        let settings = ElaborateSettings {
            is_coordinator: false,
            ..Default::default()
        };
        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::CreateTable, RangeVar::new("child"));
        cxt.fk_constraints.push(fk(&["x"], &["b"]));
        transform_fk_constraints(&mut cxt, true, false).unwrap();
        assert!(cxt.fallback_dist_col.is_empty());
    }

    #[test]
    fn test_add_constraint_keeps_list() {
        let catalog = catalog();
        let settings = coordinator();
        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::AlterTable, RangeVar::new("child"));
        cxt.fk_constraints.push(fk(&["x"], &["b"]));
        transform_fk_constraints(&mut cxt, false, true).unwrap();
        assert_eq!(cxt.fk_constraints.len(), 1);
        assert!(cxt.alist.is_empty());

        let mut cxt = WorkingContext::new(&catalog, &settings, StmtType::CreateTable, RangeVar::new("child"));
        transform_fk_constraints(&mut cxt, true, false).unwrap();
        assert!(cxt.alist.is_empty());
    }
}
