//! Routes constraints into the context buckets and validates the attribute
//! clauses and informational constraints attached to them.

use crate::{
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, unsupported,
};
use statement::ast::{
    column::ColumnDef,
    constraint::{ConstraintAttr, ConstraintKind, ConstraintSpec},
};

/// Attaches DEFERRABLE / INITIALLY clauses to the constraint they follow.
///
/// Attribute entries stay in the list; the constraint before them picks up
/// their flags.
pub fn transform_constraint_attrs(constraints: &mut [ConstraintSpec]) -> Result<(), ElaborateError> {
    let mut last_primary: Option<usize> = None;
    let mut saw_deferrability = false;
    let mut saw_initially = false;

    for i in 0..constraints.len() {
        let ConstraintKind::Attribute(attr) = constraints[i].kind else {
            last_primary = Some(i);
            saw_deferrability = false;
            saw_initially = false;
            continue;
        };
        let location = constraints[i].location;
        let target = match last_primary {
            Some(p) if constraints[p].accepts_attributes() => p,
            _ => {
                return Err(invalid!("misplaced {} clause", constraints[i].kind).at(location));
            }
        };

        match attr {
            ConstraintAttr::Deferrable | ConstraintAttr::NotDeferrable => {
                if saw_deferrability {
                    return Err(
                        invalid!("multiple DEFERRABLE/NOT DEFERRABLE clauses not allowed").at(location)
                    );
                }
                saw_deferrability = true;
                let deferrable = attr == ConstraintAttr::Deferrable;
                constraints[target].deferrable = deferrable;
                if !deferrable && saw_initially && constraints[target].initially_deferred {
                    return Err(
                        invalid!("constraint declared INITIALLY DEFERRED must be DEFERRABLE").at(location)
                    );
                }
            }
            ConstraintAttr::InitiallyDeferred | ConstraintAttr::InitiallyImmediate => {
                if saw_initially {
                    return Err(invalid!(
                        "multiple INITIALLY IMMEDIATE/DEFERRED clauses not allowed"
                    )
                    .at(location));
                }
                saw_initially = true;
                let deferred = attr == ConstraintAttr::InitiallyDeferred;
                constraints[target].initially_deferred = deferred;
                if deferred {
                    // INITIALLY DEFERRED alone implies DEFERRABLE.
                    if !saw_deferrability {
                        constraints[target].deferrable = true;
                    } else if !constraints[target].deferrable {
                        return Err(invalid!(
                            "constraint declared INITIALLY DEFERRED must be DEFERRABLE"
                        )
                        .at(location));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Files a table-level constraint into its bucket.
pub fn transform_table_constraint(
    cxt: &mut WorkingContext<'_>,
    constraint: ConstraintSpec,
) -> Result<(), ElaborateError> {
    check_informational_constraint(&constraint, cxt.can_informational_constraint)?;
    match constraint.kind {
        ConstraintKind::PrimaryKey(_) | ConstraintKind::Unique(_) | ConstraintKind::Exclusion(_) => {
            cxt.ix_constraints.push(constraint)
        }
        ConstraintKind::Check { .. } => cxt.ck_constraints.push(constraint),
        ConstraintKind::ClusterKey { .. } => cxt.cluster_constraints.push(constraint),
        ConstraintKind::ForeignKey(_) => cxt.fk_constraints.push(constraint),
        ConstraintKind::Null
        | ConstraintKind::NotNull
        | ConstraintKind::Default(_)
        | ConstraintKind::Attribute(_) => {
            return Err(
                invalid!("invalid context for constraint type {}", constraint.kind).at(constraint.location)
            );
        }
    }
    Ok(())
}

/// Informational (`NOT ENFORCED`) constraints are only meaningful on foreign
/// tables whose wrapper accepts them, and there only on single columns.
pub fn check_informational_constraint(
    constraint: &ConstraintSpec,
    is_informational_table: bool,
) -> Result<(), ElaborateError> {
    if !is_informational_table {
        if constraint.not_enforced {
            return Err(unsupported!(
                "It is not allowed to support \"NOT ENFORCED\" informational constraint."
            ));
        }
        return Ok(());
    }

    let keys = match &constraint.kind {
        ConstraintKind::Null | ConstraintKind::NotNull => return Ok(()),
        ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => {
            if !constraint.not_enforced {
                return Err(unsupported!(
                    "The foreign table only support \"NOT ENFORCED\" informational constraint."
                ));
            }
            &k.keys
        }
        _ => {
            return Err(unsupported!(
                "Only the primary key, unique, not null and null be supported."
            ));
        }
    };
    if keys.len() > 1 {
        return Err(unsupported!(
            "Multi-column combined informational constraint is forbidden."
        ));
    }
    Ok(())
}

pub fn check_column_constraints(
    column: &ColumnDef,
    is_informational_table: bool,
) -> Result<(), ElaborateError> {
    column
        .constraints
        .iter()
        .try_for_each(|c| check_informational_constraint(c, is_informational_table))
}

/// A column may appear only once in a partial cluster key.
pub fn check_cluster_constraints(cxt: &WorkingContext<'_>) -> Result<(), ElaborateError> {
    for constraint in &cxt.cluster_constraints {
        let ConstraintKind::ClusterKey { keys } = &constraint.kind else {
            continue;
        };
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].iter().any(|k| k.eq_ignore_ascii_case(key)) {
                return Err(invalid!(
                    "column \"{}\" appears twice in partial cluster key constraint",
                    key
                )
                .on(key)
                .at(constraint.location));
            }
        }
    }
    Ok(())
}

pub fn check_reserved_columns(cxt: &WorkingContext<'_>) -> Result<(), ElaborateError> {
    match cxt
        .columns
        .iter()
        .find(|c| cxt.settings.is_reserved_column(&c.name))
    {
        Some(col) => Err(invalid!(
            "column name \"{}\" conflicts with a system column name",
            col.name
        )
        .on(&col.name)),
        None => Ok(()),
    }
}
