//! PARTITION BY clauses and the partition definitions they carry.

use model::core::boundary::BoundaryValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionStrategy {
    Range,
    Interval,
    List,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub strategy: PartitionStrategy,
    pub keys: Vec<String>,
    #[serde(default)]
    pub definitions: Vec<PartitionDef>,
    /// Interval literal of an INTERVAL-partitioned table, e.g. `'1 month'`.
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub row_movement: bool,
    #[serde(default)]
    pub location: Option<usize>,
}

/// One partition entry. A statement must use a single shape throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionDef {
    /// `PARTITION p VALUES LESS THAN (...)`
    LessThan(RangePartitionDef),
    /// `PARTITION p START (...) END (...) EVERY (...)`, any part optional.
    StartEnd(StartEndDef),
    List(ListPartitionDef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePartitionDef {
    pub name: String,
    pub boundary: Vec<BoundaryValue>,
    #[serde(default)]
    pub tablespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartEndDef {
    pub name: String,
    #[serde(default)]
    pub start: Option<Vec<BoundaryValue>>,
    #[serde(default)]
    pub end: Option<Vec<BoundaryValue>>,
    #[serde(default)]
    pub every: Option<Vec<BoundaryValue>>,
    #[serde(default)]
    pub tablespace: Option<String>,
    #[serde(default)]
    pub location: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPartitionDef {
    pub name: String,
    pub values: Vec<BoundaryValue>,
    #[serde(default)]
    pub tablespace: Option<String>,
}

impl PartitionDef {
    pub fn name(&self) -> &str {
        match self {
            PartitionDef::LessThan(d) => &d.name,
            PartitionDef::StartEnd(d) => &d.name,
            PartitionDef::List(d) => &d.name,
        }
    }
}

impl RangePartitionDef {
    pub fn new(name: impl Into<String>, boundary: Vec<BoundaryValue>) -> Self {
        Self {
            name: name.into(),
            boundary,
            tablespace: None,
        }
    }
}

impl StartEndDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn start(mut self, value: impl Into<BoundaryValue>) -> Self {
        self.start = Some(vec![value.into()]);
        self
    }

    pub fn end(mut self, value: impl Into<BoundaryValue>) -> Self {
        self.end = Some(vec![value.into()]);
        self
    }

    pub fn every(mut self, value: impl Into<BoundaryValue>) -> Self {
        self.every = Some(vec![value.into()]);
        self
    }
}

impl PartitionSpec {
    pub fn range(keys: &[&str], definitions: Vec<PartitionDef>) -> Self {
        Self {
            strategy: PartitionStrategy::Range,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            definitions,
            interval: None,
            row_movement: false,
            location: None,
        }
    }

    pub fn has_start_end(&self) -> bool {
        self.definitions
            .iter()
            .any(|d| matches!(d, PartitionDef::StartEnd(_)))
    }

    pub fn has_less_than(&self) -> bool {
        self.definitions
            .iter()
            .any(|d| matches!(d, PartitionDef::LessThan(_)))
    }
}
