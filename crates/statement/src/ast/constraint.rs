//! Column and table constraints.

use crate::ast::{
    common::{DefElem, RangeVar},
    expr::Expr,
    index::IndexElem,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constraint, either inline on a column or as a table element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ConstraintKind,
    #[serde(default)]
    pub deferrable: bool,
    #[serde(default)]
    pub initially_deferred: bool,
    /// Informational constraint: declared but never enforced.
    #[serde(default)]
    pub not_enforced: bool,
    #[serde(default)]
    pub location: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Null,
    NotNull,
    Default(Expr),
    Check {
        raw: Option<Expr>,
        cooked: Option<Expr>,
    },
    PrimaryKey(KeyConstraint),
    Unique(KeyConstraint),
    Exclusion(ExclusionConstraint),
    ForeignKey(ForeignKeySpec),
    ClusterKey { keys: Vec<String> },
    Attribute(ConstraintAttr),
}

/// Deferrability modifiers that attach to the constraint before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintAttr {
    Deferrable,
    NotDeferrable,
    InitiallyDeferred,
    InitiallyImmediate,
}

/// Column list of a PRIMARY KEY or UNIQUE constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyConstraint {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub options: Vec<DefElem>,
    /// `USING INDEX name`: bind the constraint to an existing index.
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub index_space: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConstraint {
    pub access_method: String,
    /// Each element paired with its exclusion operator.
    pub elements: Vec<(IndexElem, String)>,
    #[serde(default)]
    pub where_clause: Option<Expr>,
    #[serde(default)]
    pub options: Vec<DefElem>,
    #[serde(default)]
    pub index_space: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    pub pk_table: RangeVar,
    #[serde(default)]
    pub fk_attrs: Vec<String>,
    #[serde(default)]
    pub pk_attrs: Vec<String>,
    #[serde(default)]
    pub on_update: ForeignKeyAction,
    #[serde(default)]
    pub on_delete: ForeignKeyAction,
    #[serde(default)]
    pub skip_validation: bool,
    #[serde(default)]
    pub initially_valid: bool,
}

impl ConstraintSpec {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            name: None,
            kind,
            deferrable: false,
            initially_deferred: false,
            not_enforced: false,
            location: None,
        }
    }

    pub fn named(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(kind)
        }
    }

    pub fn not_null() -> Self {
        Self::new(ConstraintKind::NotNull)
    }

    pub fn primary_key(keys: &[&str]) -> Self {
        Self::new(ConstraintKind::PrimaryKey(KeyConstraint::on(keys)))
    }

    pub fn unique(keys: &[&str]) -> Self {
        Self::new(ConstraintKind::Unique(KeyConstraint::on(keys)))
    }

    pub fn check(expr: Expr) -> Self {
        Self::new(ConstraintKind::Check {
            raw: Some(expr),
            cooked: None,
        })
    }

    pub fn attribute(attr: ConstraintAttr) -> Self {
        Self::new(ConstraintKind::Attribute(attr))
    }

    /// Whether deferrability attributes may follow this constraint.
    pub fn accepts_attributes(&self) -> bool {
        matches!(
            self.kind,
            ConstraintKind::PrimaryKey(_)
                | ConstraintKind::Unique(_)
                | ConstraintKind::Exclusion(_)
                | ConstraintKind::ForeignKey(_)
        )
    }

    pub fn key_constraint(&self) -> Option<&KeyConstraint> {
        match &self.kind {
            ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey(_))
    }
}

impl KeyConstraint {
    pub fn on(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl ForeignKeySpec {
    pub fn new(pk_table: RangeVar, fk_attrs: &[&str], pk_attrs: &[&str]) -> Self {
        Self {
            pk_table,
            fk_attrs: fk_attrs.iter().map(|k| k.to_string()).collect(),
            pk_attrs: pk_attrs.iter().map(|k| k.to_string()).collect(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::NoAction,
            skip_validation: false,
            initially_valid: false,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Null => "NULL",
            ConstraintKind::NotNull => "NOT NULL",
            ConstraintKind::Default(_) => "DEFAULT",
            ConstraintKind::Check { .. } => "CHECK",
            ConstraintKind::PrimaryKey(_) => "PRIMARY KEY",
            ConstraintKind::Unique(_) => "UNIQUE",
            ConstraintKind::Exclusion(_) => "EXCLUDE",
            ConstraintKind::ForeignKey(_) => "FOREIGN KEY",
            ConstraintKind::ClusterKey { .. } => "PARTIAL CLUSTER KEY",
            ConstraintKind::Attribute(ConstraintAttr::Deferrable) => "DEFERRABLE",
            ConstraintKind::Attribute(ConstraintAttr::NotDeferrable) => "NOT DEFERRABLE",
            ConstraintKind::Attribute(ConstraintAttr::InitiallyDeferred) => "INITIALLY DEFERRED",
            ConstraintKind::Attribute(ConstraintAttr::InitiallyImmediate) => "INITIALLY IMMEDIATE",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        })
    }
}
