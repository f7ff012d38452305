use crate::ast::{
    column::ColumnDef,
    common::{DefElem, RangeVar},
    constraint::ConstraintSpec,
    index::IndexSpec,
    partition::PartitionDef,
};
use model::core::boundary::BoundaryValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableStmt {
    pub relation: RangeVar,
    pub cmds: Vec<AlterTableCmd>,
    /// `ALTER FOREIGN TABLE`
    #[serde(default)]
    pub is_foreign: bool,
}

/// Identifies an existing partition by name or by a value inside its range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionRef {
    Name(String),
    Value(Vec<BoundaryValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterTableCmd {
    AddColumn(ColumnDef),
    AddConstraint(ConstraintSpec),
    /// A constraint already elaborated by an earlier CREATE.
    ProcessedConstraint(ConstraintSpec),
    AddIndex(IndexSpec),
    /// A constraint bound to an existing index (`USING INDEX`).
    AddIndexConstraint(IndexSpec),
    AddPartition(Vec<PartitionDef>),
    DropPartition(PartitionRef),
    TruncatePartition(PartitionRef),
    ExchangePartition {
        target: PartitionRef,
        table: RangeVar,
    },
    SplitPartition {
        source: PartitionRef,
        #[serde(default)]
        split_point: Option<Vec<BoundaryValue>>,
        dest: Vec<PartitionDef>,
    },
    AlterColumnGenericOptions {
        column: String,
        options: Vec<DefElem>,
    },
    DropColumn {
        name: String,
        #[serde(default)]
        missing_ok: bool,
    },
    SetOptions(Vec<DefElem>),
}

impl AlterTableStmt {
    pub fn new(relation: RangeVar, cmds: Vec<AlterTableCmd>) -> Self {
        Self {
            relation,
            cmds,
            is_foreign: false,
        }
    }
}
