//! Defines the AST for a CREATE TABLE statement.

use crate::ast::{
    column::ColumnDef,
    common::{DefElem, RangeVar},
    constraint::ConstraintSpec,
    partition::PartitionSpec,
    type_name::TypeName,
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Represents a complete CREATE TABLE statement.
///
/// After elaboration `elements` holds only columns; check and cluster-key
/// constraints move to `constraints` and index constraints become separate
/// CREATE INDEX actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStmt {
    pub relation: RangeVar,
    #[serde(default)]
    pub elements: Vec<TableElement>,
    #[serde(default)]
    pub inherits: Vec<RangeVar>,
    #[serde(default)]
    pub of_type: Option<TypeName>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    #[serde(default)]
    pub options: Vec<DefElem>,
    #[serde(default)]
    pub on_commit: OnCommit,
    #[serde(default)]
    pub tablespace: Option<String>,
    #[serde(default)]
    pub if_not_exists: bool,
    #[serde(default)]
    pub partition: Option<PartitionSpec>,
    #[serde(default)]
    pub distribute_by: Option<DistributeBy>,
    /// Placement group the table is created in.
    #[serde(default)]
    pub subcluster: Option<String>,
    #[serde(default)]
    pub foreign: Option<ForeignTable>,
    /// Serialized LIKE metadata shipped from another placement group.
    #[serde(default)]
    pub internal_data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableElement {
    Column(ColumnDef),
    Constraint(ConstraintSpec),
    Like(TableLikeClause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnCommit {
    #[default]
    Noop,
    PreserveRows,
    DeleteRows,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignTable {
    pub server: String,
    #[serde(default)]
    pub options: Vec<DefElem>,
    /// The wrapper accepts NOT ENFORCED primary key and unique constraints.
    #[serde(default)]
    pub informational_constraints: bool,
    /// The wrapper stores data partitioned by value and may skip the
    /// partition-key superset rule for unique keys.
    #[serde(default)]
    pub value_partitioned: bool,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LikeOptions: u32 {
        const DEFAULTS     = 0b0000_0000_0001;
        const CONSTRAINTS  = 0b0000_0000_0010;
        const INDEXES      = 0b0000_0000_0100;
        const STORAGE      = 0b0000_0000_1000;
        const COMMENTS     = 0b0000_0001_0000;
        const PARTITION    = 0b0000_0010_0000;
        const RELOPTIONS   = 0b0000_0100_0000;
        const DISTRIBUTION = 0b0000_1000_0000;
        const OIDS         = 0b0001_0000_0000;
        /// Written as `INCLUDING ALL`, possibly followed by EXCLUDING parts.
        const EXPLICIT_ALL = 0b1000_0000_0000;
        const ALL          = 0b1001_1111_1111;
    }
}

impl Default for LikeOptions {
    fn default() -> Self {
        LikeOptions::empty()
    }
}

/// `LIKE source [INCLUDING ...]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLikeClause {
    pub relation: RangeVar,
    #[serde(default)]
    pub options: LikeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    Hash,
    Replication,
    RoundRobin,
    Modulo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributeBy {
    pub kind: DistributionKind,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl CreateTableStmt {
    pub fn new(relation: RangeVar) -> Self {
        Self {
            relation,
            elements: Vec::new(),
            inherits: Vec::new(),
            of_type: None,
            constraints: Vec::new(),
            options: Vec::new(),
            on_commit: OnCommit::Noop,
            tablespace: None,
            if_not_exists: false,
            partition: None,
            distribute_by: None,
            subcluster: None,
            foreign: None,
            internal_data: None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.elements.iter().filter_map(|e| match e {
            TableElement::Column(c) => Some(c),
            _ => None,
        })
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }
}

impl DistributeBy {
    pub fn hash(columns: &[&str]) -> Self {
        Self {
            kind: DistributionKind::Hash,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}
