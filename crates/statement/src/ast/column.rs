use crate::ast::{
    common::DefElem, constraint::ConstraintSpec, expr::Expr, type_name::TypeName,
};
use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A column definition: as written by the user, and after elaboration with
/// its type resolved, constraints moved out and any default cooked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: TypeName,
    /// Filled in once the type name has been resolved against the catalog.
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub inh_count: u32,
    #[serde(default = "default_true")]
    pub is_local: bool,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default)]
    pub is_from_type: bool,
    /// Set on columns whose type was a serial pseudo-type.
    #[serde(default)]
    pub is_serial: bool,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub raw_default: Option<Expr>,
    #[serde(default)]
    pub cooked_default: Option<Expr>,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
    #[serde(default)]
    pub fdw_options: Vec<DefElem>,
    /// Placeholder standing in for a dropped source column (cluster resize).
    #[serde(default)]
    pub dropped: bool,
    #[serde(default)]
    pub location: Option<usize>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
            data_type: None,
            inh_count: 0,
            is_local: true,
            is_not_null: false,
            is_from_type: false,
            is_serial: false,
            storage: None,
            raw_default: None,
            cooked_default: None,
            collation: None,
            constraints: Vec::new(),
            fdw_options: Vec::new(),
            dropped: false,
            location: None,
        }
    }

    pub fn default_expr(&self) -> Option<&Expr> {
        self.raw_default.as_ref().or(self.cooked_default.as_ref())
    }
}
