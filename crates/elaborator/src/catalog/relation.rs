//! Catalog rows the elaborator reads: relations, their attributes, checks,
//! partitions and indexes.

use super::Oid;
use model::core::{boundary::BoundaryValue, identifiers::QualifiedName};
use serde::{Deserialize, Serialize};
use statement::ast::{
    common::{DefElem, Persistence, RangeVar},
    create_table::DistributeBy,
    expr::Expr,
    partition::PartitionStrategy,
    type_name::TypeName,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    Table,
    View,
    CompositeType,
    ForeignTable,
    Index,
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub dropped: bool,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub default: Option<Expr>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInfo {
    pub name: String,
    /// Cooked expression over the relation's attribute numbers.
    pub expr: Expr,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub name: String,
    pub boundary: Vec<BoundaryValue>,
    #[serde(default)]
    pub tablespace: Option<String>,
    /// Created on demand by an INTERVAL table, not declared.
    #[serde(default)]
    pub interval_created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub strategy: PartitionStrategy,
    /// 1-based attribute numbers of the key columns.
    pub key_attnums: Vec<i32>,
    /// Partitions in storage order, which is arbitrary. Use
    /// [`PartitionInfo::ordered`] for boundary order.
    #[serde(default)]
    pub partitions: Vec<PartitionEntry>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub row_movement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationInfo {
    #[serde(default)]
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub kind: RelationKind,
    #[serde(default)]
    pub persistence: Persistence,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub checks: Vec<CheckInfo>,
    /// Attribute numbers of the partial cluster key.
    #[serde(default)]
    pub cluster_keys: Vec<i32>,
    #[serde(default)]
    pub indexes: Vec<Oid>,
    #[serde(default)]
    pub partition: Option<PartitionInfo>,
    #[serde(default)]
    pub reloptions: Vec<DefElem>,
    #[serde(default)]
    pub has_oids: bool,
    #[serde(default)]
    pub distribution: Option<DistributeBy>,
    /// Placement group; `None` is the installation group.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub in_resizing: bool,
    /// Foreign tables whose wrapper accepts informational constraints.
    #[serde(default)]
    pub informational_constraints: bool,
    /// Sequences owned by one of this relation's columns.
    #[serde(default)]
    pub owned_sequences: Vec<QualifiedName>,
}

/// The constraint an index backs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConstraintInfo {
    pub name: String,
    #[serde(default)]
    pub deferrable: bool,
    #[serde(default)]
    pub initially_deferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKeyInfo {
    /// Attribute number of a plain key; `0` for an expression key.
    pub attnum: i32,
    /// Name of the index's own column for this key.
    pub column_name: String,
    /// Set only when the collation differs from the column's default.
    #[serde(default)]
    pub collation: Option<String>,
    /// Set only when the operator class is not the type's default.
    #[serde(default)]
    pub opclass: Option<String>,
    #[serde(default)]
    pub desc: bool,
    #[serde(default)]
    pub nulls_first: bool,
    #[serde(default)]
    pub options: Vec<DefElem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub oid: Oid,
    /// Oid of the indexed relation.
    pub relation: Oid,
    pub name: String,
    pub access_method: String,
    #[serde(default = "default_true")]
    pub am_can_order: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
    /// One operator per key for an exclusion constraint index.
    #[serde(default)]
    pub exclusion_ops: Vec<String>,
    pub keys: Vec<IndexKeyInfo>,
    /// Expressions of the `attnum == 0` keys, in key order.
    #[serde(default)]
    pub exprs: Vec<Expr>,
    #[serde(default)]
    pub predicate: Option<Expr>,
    #[serde(default)]
    pub options: Vec<DefElem>,
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default = "default_true")]
    pub immediate: bool,
    #[serde(default)]
    pub constraint: Option<IndexConstraintInfo>,
    #[serde(default)]
    pub partitioned: bool,
    #[serde(default)]
    pub tablespace: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AttributeInfo {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
            not_null: false,
            dropped: false,
            collation: None,
            default: None,
            storage: None,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }
}

impl RelationInfo {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            oid: 0,
            schema: schema.into(),
            name: name.into(),
            kind,
            persistence: Persistence::Permanent,
            attributes: Vec::new(),
            checks: Vec::new(),
            cluster_keys: Vec::new(),
            indexes: Vec::new(),
            partition: None,
            reloptions: Vec::new(),
            has_oids: false,
            distribution: None,
            group: None,
            in_resizing: false,
            informational_constraints: false,
            owned_sequences: Vec::new(),
        }
    }

    pub fn table(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(schema, name, RelationKind::Table)
    }

    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_column(self, name: &str, type_name: &str) -> Self {
        self.with_attribute(AttributeInfo::new(name, TypeName::new(type_name)))
    }

    pub fn with_check(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.checks.push(CheckInfo {
            name: name.into(),
            expr,
            comment: None,
        });
        self
    }

    pub fn with_partition(mut self, partition: PartitionInfo) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn with_distribution(mut self, distribution: DistributeBy) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition.is_some()
    }

    pub fn is_temp(&self) -> bool {
        self.persistence == Persistence::Temp
    }

    pub fn range_var(&self) -> RangeVar {
        RangeVar {
            schema: Some(self.schema.clone()),
            name: self.name.clone(),
            persistence: self.persistence,
            location: None,
        }
    }

    /// Attribute by 1-based number, dropped columns included.
    pub fn attribute(&self, attnum: i32) -> Option<&AttributeInfo> {
        usize::try_from(attnum - 1)
            .ok()
            .and_then(|i| self.attributes.get(i))
    }

    /// Live attribute by name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes
            .iter()
            .find(|a| !a.dropped && a.name == name)
    }

    pub fn partition_count(&self) -> usize {
        self.partition.as_ref().map_or(0, |p| p.partitions.len())
    }

    pub fn owns_sequence(&self, sequence: &QualifiedName) -> bool {
        self.owned_sequences.iter().any(|s| {
            s.name == sequence.name
                && (sequence.schema.is_none() || s.schema.is_none() || s.schema == sequence.schema)
        })
    }
}

impl PartitionInfo {
    pub fn range(key_attnums: Vec<i32>, partitions: Vec<PartitionEntry>) -> Self {
        Self {
            strategy: PartitionStrategy::Range,
            key_attnums,
            partitions,
            interval: None,
            row_movement: false,
        }
    }

    /// Partitions in catalog sequence order: ascending boundary, MAXVALUE last.
    pub fn ordered(&self) -> Vec<&PartitionEntry> {
        let mut ordered: Vec<&PartitionEntry> = self.partitions.iter().collect();
        ordered.sort_by(|a, b| compare_boundaries(&a.boundary, &b.boundary));
        ordered
    }

    /// Position of the named partition in [`PartitionInfo::ordered`].
    pub fn position(&self, name: &str) -> Option<usize> {
        self.ordered().iter().position(|p| p.name == name)
    }

    /// Position in [`PartitionInfo::ordered`] of the partition whose range
    /// holds `value`: the first with a boundary above it.
    pub fn position_for_value(&self, value: &[BoundaryValue]) -> Option<usize> {
        self.ordered()
            .iter()
            .position(|p| compare_boundaries(value, &p.boundary) == Ordering::Less)
    }
}

/// Element-wise comparison of two boundary lists. Incomparable elements
/// count as equal.
fn compare_boundaries(left: &[BoundaryValue], right: &[BoundaryValue]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(l, r)| l.compare(r).unwrap_or(Ordering::Equal))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

impl PartitionEntry {
    pub fn new(name: impl Into<String>, boundary: BoundaryValue) -> Self {
        Self {
            name: name.into(),
            boundary: vec![boundary],
            tablespace: None,
            interval_created: false,
        }
    }
}

impl IndexInfo {
    pub fn on_columns(relation: &RelationInfo, name: impl Into<String>, columns: &[&str]) -> Self {
        let keys = columns
            .iter()
            .map(|col| IndexKeyInfo {
                attnum: relation
                    .attributes
                    .iter()
                    .position(|a| a.name == *col)
                    .map_or(0, |p| p as i32 + 1),
                column_name: col.to_string(),
                collation: None,
                opclass: None,
                desc: false,
                nulls_first: false,
                options: Vec::new(),
            })
            .collect();
        Self {
            oid: 0,
            relation: relation.oid,
            name: name.into(),
            access_method: "btree".to_string(),
            am_can_order: true,
            unique: false,
            primary: false,
            exclusion_ops: Vec::new(),
            keys,
            exprs: Vec::new(),
            predicate: None,
            options: Vec::new(),
            valid: true,
            immediate: true,
            constraint: None,
            partitioned: false,
            tablespace: None,
            comment: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.unique = true;
        self.primary = true;
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(IndexConstraintInfo {
            name: name.into(),
            deferrable: false,
            initially_deferred: false,
        });
        self
    }
}
