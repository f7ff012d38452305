use crate::ast::{
    column::ColumnDef,
    constraint::{ConstraintKind, ConstraintSpec, ForeignKeySpec},
    common::RangeVar,
    expr::Expr,
    type_name::TypeName,
};

#[derive(Debug, Clone)]
pub struct ColumnDefBuilder {
    ast: ColumnDef,
}

impl ColumnDefBuilder {
    pub fn new(name: &str, type_name: TypeName) -> Self {
        Self {
            ast: ColumnDef::new(name, type_name),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.ast.constraints.push(ConstraintSpec::not_null());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.ast.constraints.push(ConstraintSpec::new(ConstraintKind::Null));
        self
    }

    pub fn default_value(mut self, expr: impl Into<Expr>) -> Self {
        self.ast
            .constraints
            .push(ConstraintSpec::new(ConstraintKind::Default(expr.into())));
        self
    }

    /// Inline PRIMARY KEY; the key list is filled in from the column name later.
    pub fn primary_key(mut self) -> Self {
        self.ast.constraints.push(ConstraintSpec::primary_key(&[]));
        self
    }

    pub fn unique(mut self) -> Self {
        self.ast.constraints.push(ConstraintSpec::unique(&[]));
        self
    }

    pub fn references(mut self, table: RangeVar, column: &str) -> Self {
        self.ast.constraints.push(ConstraintSpec::new(ConstraintKind::ForeignKey(
            ForeignKeySpec::new(table, &[], &[column]),
        )));
        self
    }

    pub fn constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.ast.constraints.push(constraint);
        self
    }

    pub fn collate(mut self, collation: &str) -> Self {
        self.ast.collation = Some(collation.to_string());
        self
    }

    pub fn build(self) -> ColumnDef {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use crate::{builder::column::ColumnDefBuilder, type_name};
    use model::core::value::Value;

    #[test]
    fn test_column_builder() {
        let col = ColumnDefBuilder::new("qty", type_name!("int4"))
            .not_null()
            .default_value(Value::Int4(0))
            .build();

        assert_eq!(col.name, "qty");
        assert_eq!(col.constraints.len(), 2);
        assert!(col.is_local);
    }
}
