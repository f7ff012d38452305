use crate::error::ElaborateError;
use model::core::{data_type::DataType, identifiers::QualifiedName};
use statement::ast::{common::RangeVar, type_name::TypeName};

pub mod memory;
pub mod relation;

pub use memory::MemoryCatalog;
pub use relation::{
    AttributeInfo, CheckInfo, IndexConstraintInfo, IndexInfo, IndexKeyInfo, PartitionEntry,
    PartitionInfo, RelationInfo, RelationKind,
};

pub type Oid = u32;

/// Read-only view of the system catalog. Callers hold whatever locks the
/// lookups need; every method is a plain blocking call.
pub trait Catalog: Send + Sync {
    // Namespaces & types

    /// Schema a new relation lands in, plus the oid of a relation that
    /// already carries the requested name there.
    fn resolve_creation_namespace(
        &self,
        relation: &RangeVar,
    ) -> Result<(String, Option<Oid>), ElaborateError>;

    fn resolve_type(&self, type_name: &TypeName) -> Result<DataType, ElaborateError>;

    // Relations

    fn relation_by_name(&self, relation: &RangeVar) -> Option<RelationInfo>;
    fn relation(&self, oid: Oid) -> Option<RelationInfo>;
    fn relation_name_taken(&self, schema: &str, name: &str) -> bool;

    // Indexes

    fn index(&self, oid: Oid) -> Option<IndexInfo>;
    fn index_by_name(&self, schema: &str, name: &str) -> Option<IndexInfo>;

    // Sequences & placement

    fn sequence_exists(&self, name: &QualifiedName) -> bool;

    /// Whether a table created in `target_group` (the installation group
    /// when `None`) lives in a different placement group than `source`.
    fn is_multi_nodegroup(&self, target_group: Option<&str>, source: Oid) -> bool;
}

/// Picks `<name1>_<name2>_<label>` in `schema`, appending a counter until the
/// name is free.
pub fn choose_relation_name(
    catalog: &dyn Catalog,
    name1: &str,
    name2: Option<&str>,
    label: &str,
    schema: &str,
    max_len: usize,
) -> String {
    let mut pass = 0;
    let mut modlabel = label.to_string();
    loop {
        let candidate = model::core::identifiers::make_object_name(
            name1,
            name2,
            Some(&modlabel),
            max_len,
        );
        if !catalog.relation_name_taken(schema, &candidate) {
            return candidate;
        }
        pass += 1;
        modlabel = format!("{label}{pass}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_relation_name_skips_taken_names() {
        let catalog = MemoryCatalog::new()
            .with_relation(RelationInfo::new("public", "orders_id_seq", RelationKind::Sequence))
            .with_relation(RelationInfo::new("public", "orders_id_seq1", RelationKind::Sequence));
        let name = choose_relation_name(&catalog, "orders", Some("id"), "seq", "public", 63);
        assert_eq!(name, "orders_id_seq2");
        let other = choose_relation_name(&catalog, "orders", Some("id"), "seq", "sales", 63);
        assert_eq!(other, "orders_id_seq");
    }
}
