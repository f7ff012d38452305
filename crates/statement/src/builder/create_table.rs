use crate::ast::{
    column::ColumnDef,
    common::{DefElem, Persistence, RangeVar},
    constraint::ConstraintSpec,
    create_table::{CreateTableStmt, DistributeBy, LikeOptions, TableElement, TableLikeClause},
    partition::PartitionSpec,
    type_name::TypeName,
};

#[derive(Debug, Clone)]
pub struct CreateTableStmtBuilder {
    ast: CreateTableStmt,
}

impl CreateTableStmtBuilder {
    pub fn new(relation: RangeVar) -> Self {
        Self {
            ast: CreateTableStmt::new(relation),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.ast.elements.push(TableElement::Column(column));
        self
    }

    pub fn constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.ast.elements.push(TableElement::Constraint(constraint));
        self
    }

    pub fn like(mut self, source: RangeVar, options: LikeOptions) -> Self {
        self.ast.elements.push(TableElement::Like(TableLikeClause {
            relation: source,
            options,
        }));
        self
    }

    pub fn inherits(mut self, parent: RangeVar) -> Self {
        self.ast.inherits.push(parent);
        self
    }

    pub fn of_type(mut self, type_name: TypeName) -> Self {
        self.ast.of_type = Some(type_name);
        self
    }

    pub fn option(mut self, name: &str, value: &str) -> Self {
        self.ast.options.push(DefElem::new(name, value));
        self
    }

    pub fn temp(mut self) -> Self {
        self.ast.relation.persistence = Persistence::Temp;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn partition_by(mut self, spec: PartitionSpec) -> Self {
        self.ast.partition = Some(spec);
        self
    }

    pub fn distribute_by(mut self, dist: DistributeBy) -> Self {
        self.ast.distribute_by = Some(dist);
        self
    }

    pub fn to_group(mut self, group: &str) -> Self {
        self.ast.subcluster = Some(group.to_string());
        self
    }

    pub fn build(self) -> CreateTableStmt {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{constraint::ConstraintSpec, create_table::LikeOptions},
        builder::{column::ColumnDefBuilder, create_table::CreateTableStmtBuilder},
        range_var, type_name,
    };

    #[test]
    fn test_create_table_builder() {
        let ast = CreateTableStmtBuilder::new(range_var!("orders"))
            .column(ColumnDefBuilder::new("id", type_name!("serial")).build())
            .column(ColumnDefBuilder::new("label", type_name!("text")).build())
            .constraint(ConstraintSpec::primary_key(&["id"]))
            .like(range_var!("template"), LikeOptions::DEFAULTS | LikeOptions::INDEXES)
            .if_not_exists()
            .build();

        assert!(ast.if_not_exists);
        assert_eq!(ast.columns().count(), 2);
        assert_eq!(ast.elements.len(), 4);
        assert_eq!(ast.relation.name, "orders");
    }
}
