//! Mutable state shared by the column, constraint, index and LIKE passes of
//! one elaboration call.

use crate::{
    catalog::{Catalog, RelationInfo},
    like::meta::TableLikeMeta,
    notice::Notices,
    settings::ElaborateSettings,
};
use statement::{
    action::Action,
    ast::{
        column::ColumnDef,
        common::{DefElem, RangeVar},
        constraint::ConstraintSpec,
        create_table::DistributeBy,
        index::IndexSpec,
        partition::PartitionSpec,
    },
};
use std::{collections::VecDeque, fmt};
use uuid::Uuid;

/// Columns every table carries implicitly. `oid` joins them for tables
/// created `WITH OIDS`.
const SYSTEM_COLUMNS: &[&str] = &[
    "ctid",
    "xmin",
    "cmin",
    "xmax",
    "cmax",
    "tableoid",
    "xc_node_id",
    "tablebucketid",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtType {
    CreateTable,
    CreateForeignTable,
    AlterTable,
    AlterForeignTable,
}

impl StmtType {
    pub fn is_foreign(self) -> bool {
        matches!(self, StmtType::CreateForeignTable | StmtType::AlterForeignTable)
    }

    pub fn is_alter(self) -> bool {
        matches!(self, StmtType::AlterTable | StmtType::AlterForeignTable)
    }
}

impl fmt::Display for StmtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StmtType::CreateTable => "CREATE TABLE",
            StmtType::CreateForeignTable => "CREATE FOREIGN TABLE",
            StmtType::AlterTable => "ALTER TABLE",
            StmtType::AlterForeignTable => "ALTER FOREIGN TABLE",
        })
    }
}

pub struct WorkingContext<'a> {
    pub catalog: &'a dyn Catalog,
    pub settings: &'a ElaborateSettings,
    pub stmt_type: StmtType,
    /// Target relation; schema-qualified once the namespace is resolved.
    pub relation: RangeVar,
    /// Schema implicit sequences are created in.
    pub namespace: String,
    /// The relation an ALTER works on.
    pub existing: Option<RelationInfo>,
    pub inh_relations: Vec<RangeVar>,
    pub has_oids: bool,

    pub columns: Vec<ColumnDef>,
    pub ck_constraints: Vec<ConstraintSpec>,
    pub fk_constraints: Vec<ConstraintSpec>,
    pub ix_constraints: Vec<ConstraintSpec>,
    pub cluster_constraints: Vec<ConstraintSpec>,
    /// Indexes copied by `LIKE .. INCLUDING INDEXES`.
    pub inh_indexes: Vec<IndexSpec>,

    /// Actions that must run before the main statement.
    pub blist: Vec<Action>,
    /// Actions that must run after it.
    pub alist: Vec<Action>,

    pub has_pkey: bool,
    pub fallback_dist_col: Vec<String>,
    pub distribute_by: Option<DistributeBy>,
    pub subcluster: Option<String>,

    pub is_partitioned: bool,
    pub partition_keys: Vec<String>,
    /// Foreign table stored by value partitions; exempt from the unique-key
    /// superset rule.
    pub value_partitioned_foreign: bool,
    /// Partition layout adopted from a LIKE source.
    pub cloned_partition: Option<PartitionSpec>,
    /// Storage options copied by `INCLUDING RELOPTIONS`.
    pub reloptions: Option<Vec<DefElem>>,

    /// Metadata gathered for a LIKE source in another placement group.
    pub like_meta: Option<TableLikeMeta>,
    pub internal_data: Option<Vec<u8>>,

    pub is_resizing: bool,
    pub can_informational_constraint: bool,

    pub uuids: VecDeque<Uuid>,
    pub notices: Notices,
}

impl<'a> WorkingContext<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        settings: &'a ElaborateSettings,
        stmt_type: StmtType,
        relation: RangeVar,
    ) -> Self {
        Self {
            catalog,
            settings,
            stmt_type,
            namespace: relation.schema.clone().unwrap_or_default(),
            relation,
            existing: None,
            inh_relations: Vec::new(),
            has_oids: false,
            columns: Vec::new(),
            ck_constraints: Vec::new(),
            fk_constraints: Vec::new(),
            ix_constraints: Vec::new(),
            cluster_constraints: Vec::new(),
            inh_indexes: Vec::new(),
            blist: Vec::new(),
            alist: Vec::new(),
            has_pkey: false,
            fallback_dist_col: Vec::new(),
            distribute_by: None,
            subcluster: None,
            is_partitioned: false,
            partition_keys: Vec::new(),
            value_partitioned_foreign: false,
            cloned_partition: None,
            reloptions: None,
            like_meta: None,
            internal_data: None,
            is_resizing: false,
            can_informational_constraint: false,
            uuids: VecDeque::new(),
            notices: Notices::new(),
        }
    }

    pub fn is_alter(&self) -> bool {
        self.stmt_type.is_alter()
    }

    pub fn is_foreign(&self) -> bool {
        self.stmt_type.is_foreign()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn is_system_column(&self, name: &str) -> bool {
        SYSTEM_COLUMNS.contains(&name) || (self.has_oids && name == "oid")
    }

    /// Next pre-generated sequence identity, if the caller supplied one.
    pub fn next_uuid(&mut self) -> Option<Uuid> {
        self.uuids.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use statement::ast::type_name::TypeName;

    #[test]
    fn test_system_columns_follow_oids() {
        let catalog = MemoryCatalog::new();
        let settings = ElaborateSettings::default();
        let mut cxt = WorkingContext::new(
            &catalog,
            &settings,
            StmtType::CreateTable,
            RangeVar::new("t"),
        );
        assert!(cxt.is_system_column("ctid"));
        assert!(!cxt.is_system_column("oid"));
        cxt.has_oids = true;
        assert!(cxt.is_system_column("oid"));

        cxt.columns.push(ColumnDef::new("a", TypeName::new("int4")));
        cxt.column_mut("a").unwrap().is_not_null = true;
        assert!(cxt.column("a").unwrap().is_not_null);
        assert_eq!(StmtType::AlterForeignTable.to_string(), "ALTER FOREIGN TABLE");
    }
}
