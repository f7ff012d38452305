use crate::ast::common::{DefElem, RangeVar};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The implicit sequence behind a serial column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSequenceStmt {
    pub sequence: RangeVar,
    #[serde(default)]
    pub options: Vec<DefElem>,
    #[serde(default)]
    pub is_serial: bool,
    /// Cluster-wide identity handed down by the coordinator.
    #[serde(default)]
    pub uuid: Option<Uuid>,
}

/// `ALTER SEQUENCE .. OWNED BY table.column`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterSequenceStmt {
    pub sequence: RangeVar,
    pub owned_by: Vec<String>,
    #[serde(default)]
    pub is_serial: bool,
}
