use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Session and node state the elaborator consults. Passed by reference into
/// every call instead of being read from process globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElaborateSettings {
    /// Speculative validation ahead of the authoritative execution.
    pub pre_check: bool,
    /// This node runs the statement for real.
    pub is_first_node: bool,
    pub is_coordinator: bool,
    /// Cluster resize keeps dropped-column placeholders and cloned index names.
    pub cluster_resize: bool,
    pub max_partitions: usize,
    pub max_partition_keys: usize,
    /// Byte budget of a generated partition-name prefix.
    pub partition_prefix_len: usize,
    pub name_max_len: usize,
    pub default_access_method: String,
    pub reserved_columns: Vec<String>,
}

impl Default for ElaborateSettings {
    fn default() -> Self {
        Self {
            pre_check: false,
            is_first_node: true,
            is_coordinator: true,
            cluster_resize: false,
            max_partitions: 32767,
            max_partition_keys: 4,
            partition_prefix_len: 57,
            name_max_len: 63,
            default_access_method: "btree".to_string(),
            reserved_columns: vec!["tid".to_string()],
        }
    }
}

impl ElaborateSettings {
    /// Serial notices are not repeated by a non-authoritative pre-check.
    pub fn emit_serial_notices(&self) -> bool {
        !(self.pre_check && !self.is_first_node)
    }

    pub fn is_reserved_column(&self, name: &str) -> bool {
        self.reserved_columns.iter().any(|r| r == name)
    }
}

/// Inputs that vary per statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElaborateRequest {
    /// Source text, kept for diagnostics.
    pub query: String,
    /// Pre-generated identities for implicit sequences, consumed in order.
    pub sequence_uuids: Vec<Uuid>,
}

impl ElaborateRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sequence_uuids: Vec::new(),
        }
    }

    pub fn with_sequence_uuids(mut self, uuids: Vec<Uuid>) -> Self {
        self.sequence_uuids = uuids;
        self
    }

    pub(crate) fn uuid_queue(&self) -> VecDeque<Uuid> {
        self.sequence_uuids.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ElaborateSettings::default();
        assert_eq!(settings.max_partitions, 32767);
        assert_eq!(settings.partition_prefix_len, 57);
        assert!(settings.is_reserved_column("tid"));
        assert!(settings.emit_serial_notices());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: ElaborateSettings =
            serde_json::from_str(r#"{"pre_check": true, "is_first_node": false}"#).unwrap();
        assert!(!settings.emit_serial_notices());
        assert_eq!(settings.default_access_method, "btree");
    }
}
