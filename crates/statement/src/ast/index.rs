use crate::ast::{
    common::{DefElem, RangeVar},
    expr::Expr,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Default,
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullsOrder {
    #[default]
    Default,
    First,
    Last,
}

/// One key of an index: a plain column or an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexElem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expr: Option<Expr>,
    #[serde(default)]
    pub index_col_name: Option<String>,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub opclass: Option<String>,
    #[serde(default)]
    pub ordering: SortOrder,
    #[serde(default)]
    pub nulls_ordering: NullsOrder,
}

impl IndexElem {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            expr: None,
            index_col_name: None,
            collation: None,
            opclass: None,
            ordering: SortOrder::Default,
            nulls_ordering: NullsOrder::Default,
        }
    }

    pub fn expression(expr: Expr) -> Self {
        Self {
            name: None,
            expr: Some(expr),
            ..Self::column("")
        }
    }
}

/// A fully specified CREATE INDEX, whether synthesized from a constraint,
/// cloned from a LIKE source, or bound to an existing index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub relation: RangeVar,
    pub access_method: String,
    #[serde(default)]
    pub table_space: Option<String>,
    pub params: Vec<IndexElem>,
    #[serde(default)]
    pub options: Vec<DefElem>,
    #[serde(default)]
    pub where_clause: Option<Expr>,
    #[serde(default)]
    pub exclude_op_names: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Existing index this constraint adopts (`USING INDEX`).
    #[serde(default)]
    pub index_oid: Option<u32>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub is_constraint: bool,
    #[serde(default)]
    pub deferrable: bool,
    #[serde(default)]
    pub initially_deferred: bool,
    #[serde(default)]
    pub is_partitioned: bool,
    #[serde(default)]
    pub internal_flag: bool,
    #[serde(default)]
    pub skip_mem_check: bool,
}

impl IndexSpec {
    pub fn new(relation: RangeVar, access_method: impl Into<String>) -> Self {
        Self {
            name: None,
            relation,
            access_method: access_method.into(),
            table_space: None,
            params: Vec::new(),
            options: Vec::new(),
            where_clause: None,
            exclude_op_names: Vec::new(),
            comment: None,
            index_oid: None,
            unique: false,
            primary: false,
            is_constraint: false,
            deferrable: false,
            initially_deferred: false,
            is_partitioned: false,
            internal_flag: false,
            skip_mem_check: false,
        }
    }

    /// Names of the plain-column keys, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.params.iter().filter_map(|p| p.name.as_deref()).collect()
    }
}
