//! Partition definitions: syntax checks and the START/END/EVERY boundary
//! resolver.

use model::core::{boundary::BoundaryValue, data_type::DataType};
use serde::{Deserialize, Serialize};
use statement::ast::partition::{PartitionDef, RangePartitionDef};

pub mod check;
pub mod divide;
pub mod naming;
pub mod resolver;

pub use divide::{RangeSplitRequest, divide_start_end_every};
pub use resolver::{StartEndRequest, resolve_start_end};

/// A partition key column with its resolved type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionKey {
    pub name: String,
    pub data_type: DataType,
}

impl PartitionKey {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Named partitions in boundary order, each holding the exclusive upper
/// boundary of its range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionBoundarySpec {
    pub partitions: Vec<RangePartitionDef>,
}

impl PartitionBoundarySpec {
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub(crate) fn push(
        &mut self,
        name: impl Into<String>,
        boundary: BoundaryValue,
        tablespace: Option<&String>,
    ) {
        self.partitions.push(RangePartitionDef {
            name: name.into(),
            boundary: vec![boundary],
            tablespace: tablespace.cloned(),
        });
    }

    pub fn names(&self) -> Vec<&str> {
        self.partitions.iter().map(|p| p.name.as_str()).collect()
    }

    /// First boundary element of every partition.
    pub fn boundaries(&self) -> Vec<&BoundaryValue> {
        self.partitions
            .iter()
            .filter_map(|p| p.boundary.first())
            .collect()
    }

    pub fn into_definitions(self) -> Vec<PartitionDef> {
        self.partitions
            .into_iter()
            .map(PartitionDef::LessThan)
            .collect()
    }
}
