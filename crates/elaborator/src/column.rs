//! Per-column elaboration: serial expansion, type resolution and the inline
//! constraints of a column definition.

use crate::{
    catalog::choose_relation_name,
    constraint::{check_column_constraints, transform_constraint_attrs},
    context::WorkingContext,
    error::{DiagnosticExt, ElaborateError},
    invalid, unsupported,
};
use model::core::identifiers::QualifiedName;
use statement::{
    action::Action,
    ast::{
        alter_table::{AlterTableCmd, AlterTableStmt},
        column::ColumnDef,
        common::RangeVar,
        constraint::{ConstraintKind, ConstraintSpec},
        expr::Expr,
        sequence::{AlterSequenceStmt, CreateSequenceStmt},
        type_name::TypeName,
    },
};
use tracing::debug;

/// Integer type behind a serial pseudo-type name.
pub fn serial_base_type(type_name: &TypeName) -> Option<&'static str> {
    match type_name.simple_name()? {
        "smallserial" | "serial2" => Some("int2"),
        "serial" | "serial4" => Some("int4"),
        "bigserial" | "serial8" => Some("int8"),
        _ => None,
    }
}

/// Elaborates one column and appends it to the context.
///
/// `pre_check` marks a speculative pass on a non-authoritative node, which
/// keeps quiet about the implicit sequences it plans.
pub fn transform_column_definition(
    cxt: &mut WorkingContext<'_>,
    mut column: ColumnDef,
    pre_check: bool,
) -> Result<(), ElaborateError> {
    check_column_constraints(&column, cxt.can_informational_constraint)?;

    let serial = serial_base_type(&column.type_name);
    if let Some(base) = serial {
        if column.type_name.is_array() {
            return Err(unsupported!("array of serial is not implemented")
                .on(&column.name)
                .at(column.type_name.location));
        }
        if cxt.relation.is_temp() {
            return Err(unsupported!(
                "It's not supported to create serial column on temporary table"
            ));
        }
        if cxt.is_alter() {
            return Err(unsupported!("It's not supported to alter table add serial column"));
        }
        column.type_name.names = vec![base.to_string()];
    }

    transform_column_type(cxt, &mut column)?;

    column.is_serial = serial.is_some();
    if column.is_serial {
        create_seq_owned_by_table(cxt, &mut column, pre_check)?;
    }

    transform_constraint_attrs(&mut column.constraints)?;
    let constraints = std::mem::take(&mut column.constraints);
    let mut saw_nullable = false;
    let mut saw_default = false;

    for mut constraint in constraints {
        match &mut constraint.kind {
            ConstraintKind::Null => {
                set_nullability(cxt, &mut column, false, saw_nullable, constraint.location)?;
                saw_nullable = true;
            }
            ConstraintKind::NotNull => {
                set_nullability(cxt, &mut column, true, saw_nullable, constraint.location)?;
                saw_nullable = true;
            }
            ConstraintKind::Default(expr) => {
                if saw_default {
                    return Err(invalid!(
                        "multiple default values specified for column \"{}\" of table \"{}\"",
                        column.name,
                        cxt.relation.name
                    )
                    .on(&column.name)
                    .at(constraint.location));
                }
                column.raw_default = Some(expr.clone());
                saw_default = true;
            }
            ConstraintKind::PrimaryKey(key) | ConstraintKind::Unique(key) => {
                if key.keys.is_empty() {
                    key.keys.push(column.name.clone());
                }
            }
            ConstraintKind::ForeignKey(fk) => {
                fk.fk_attrs = vec![column.name.clone()];
            }
            ConstraintKind::Exclusion(_) => {
                return Err(unsupported!("column exclusion constraints are not supported"));
            }
            ConstraintKind::Check { .. }
            | ConstraintKind::ClusterKey { .. }
            | ConstraintKind::Attribute(_) => {}
        }

        match constraint.kind {
            ConstraintKind::Check { .. } => cxt.ck_constraints.push(constraint),
            ConstraintKind::PrimaryKey(_) | ConstraintKind::Unique(_) => {
                cxt.ix_constraints.push(constraint)
            }
            ConstraintKind::ForeignKey(_) => cxt.fk_constraints.push(constraint),
            _ => column.constraints.push(constraint),
        }
    }

    if !column.fdw_options.is_empty() {
        let mut stmt = AlterTableStmt::new(
            cxt.relation.clone(),
            vec![AlterTableCmd::AlterColumnGenericOptions {
                column: column.name.clone(),
                options: column.fdw_options.clone(),
            }],
        );
        stmt.is_foreign = true;
        cxt.alist.push(Action::AlterTable(stmt));
    }

    cxt.columns.push(column);
    Ok(())
}

fn set_nullability(
    cxt: &WorkingContext<'_>,
    column: &mut ColumnDef,
    not_null: bool,
    saw_nullable: bool,
    location: Option<usize>,
) -> Result<(), ElaborateError> {
    if saw_nullable && column.is_not_null != not_null {
        return Err(invalid!(
            "conflicting NULL/NOT NULL declarations for column \"{}\" of table \"{}\"",
            column.name,
            cxt.relation.name
        )
        .on(&column.name)
        .at(location));
    }
    column.is_not_null = not_null;
    Ok(())
}

/// Resolves the column's type and validates its COLLATE clause.
pub fn transform_column_type(
    cxt: &WorkingContext<'_>,
    column: &mut ColumnDef,
) -> Result<(), ElaborateError> {
    let data_type = cxt.catalog.resolve_type(&column.type_name)?;
    if column.collation.is_some() && !data_type.is_collatable() {
        return Err(invalid!(
            "collations are not supported by type {}",
            data_type.postgres_name()
        )
        .on(&column.name)
        .at(column.location));
    }
    column.data_type = Some(data_type);
    Ok(())
}

/// Plans the implicit sequence of a serial column: CREATE SEQUENCE before the
/// table, ALTER SEQUENCE .. OWNED BY after it, and a `nextval` DEFAULT plus
/// NOT NULL on the column.
pub fn create_seq_owned_by_table(
    cxt: &mut WorkingContext<'_>,
    column: &mut ColumnDef,
    pre_check: bool,
) -> Result<(), ElaborateError> {
    let namespace = cxt.namespace.clone();
    let sequence_name = choose_relation_name(
        cxt.catalog,
        &cxt.relation.name,
        Some(&column.name),
        "seq",
        &namespace,
        cxt.settings.name_max_len,
    );

    if !pre_check {
        cxt.notices.push(format!(
            "{} will create implicit sequence \"{}\" for serial column \"{}.{}\"",
            cxt.stmt_type, sequence_name, cxt.relation.name, column.name
        ));
    }
    debug!(sequence = %sequence_name, column = %column.name, "planned serial sequence");

    let sequence = RangeVar::qualified(&namespace, &sequence_name);
    let uuid = cxt.next_uuid();
    cxt.blist.push(Action::CreateSequence(CreateSequenceStmt {
        sequence: sequence.clone(),
        options: Vec::new(),
        is_serial: true,
        uuid,
    }));
    cxt.alist.push(Action::AlterSequence(AlterSequenceStmt {
        sequence,
        owned_by: vec![namespace.clone(), cxt.relation.name.clone(), column.name.clone()],
        is_serial: true,
    }));

    let nextval = Expr::nextval(&QualifiedName::qualified(&namespace, &sequence_name));
    column.raw_default = Some(nextval.clone());
    column
        .constraints
        .push(ConstraintSpec::new(ConstraintKind::Default(nextval)));
    column.constraints.push(ConstraintSpec::not_null());
    Ok(())
}
