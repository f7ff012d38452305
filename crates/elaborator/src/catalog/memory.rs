use super::{Catalog, Oid, relation::{IndexInfo, RelationInfo, RelationKind}};
use crate::{
    error::{DiagnosticExt, ElaborateError},
    undefined,
};
use model::core::{data_type::DataType, identifiers::QualifiedName};
use serde::{Deserialize, Serialize};
use statement::ast::{common::RangeVar, type_name::TypeName};

pub const TEMP_SCHEMA: &str = "pg_temp";

/// A catalog held in memory, loadable from JSON. Backs the test suites and
/// the command-line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCatalog {
    pub default_schema: String,
    pub schemas: Vec<String>,
    pub installation_group: String,
    pub relations: Vec<RelationInfo>,
    pub indexes: Vec<IndexInfo>,
    /// User-defined type names accepted by `resolve_type`.
    pub types: Vec<String>,
    pub sequences: Vec<QualifiedName>,
    next_oid: Oid,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self {
            default_schema: "public".to_string(),
            schemas: vec!["public".to_string()],
            installation_group: "installation".to_string(),
            relations: Vec::new(),
            indexes: Vec::new(),
            types: Vec::new(),
            sequences: Vec::new(),
            next_oid: 16384,
        }
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog: MemoryCatalog = serde_json::from_str(json)?;
        catalog.assign_oids();
        Ok(catalog)
    }

    fn allocate_oid(&mut self) -> Oid {
        self.next_oid += 1;
        self.next_oid
    }

    /// Gives every oid-less row an oid and links indexes to their tables.
    fn assign_oids(&mut self) {
        let taken = self
            .relations
            .iter()
            .map(|r| r.oid)
            .chain(self.indexes.iter().map(|i| i.oid))
            .max()
            .unwrap_or_default();
        self.next_oid = self.next_oid.max(taken);
        for i in 0..self.relations.len() {
            if self.relations[i].oid == 0 {
                let oid = self.allocate_oid();
                self.relations[i].oid = oid;
            }
        }
        for i in 0..self.indexes.len() {
            if self.indexes[i].oid == 0 {
                let oid = self.allocate_oid();
                self.indexes[i].oid = oid;
            }
            let (oid, relation) = (self.indexes[i].oid, self.indexes[i].relation);
            if let Some(rel) = self.relations.iter_mut().find(|r| r.oid == relation)
                && !rel.indexes.contains(&oid)
            {
                rel.indexes.push(oid);
            }
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schemas.push(schema.into());
        self
    }

    pub fn with_relation(mut self, mut relation: RelationInfo) -> Self {
        if relation.oid == 0 {
            relation.oid = self.allocate_oid();
        }
        if relation.kind == RelationKind::Sequence {
            self.sequences
                .push(QualifiedName::qualified(&relation.schema, &relation.name));
        }
        self.relations.push(relation);
        self
    }

    /// Adds an index on the relation named `table`, resolving key attribute
    /// numbers by column name.
    pub fn with_index(mut self, table: &str, mut index: IndexInfo) -> Self {
        let Some(pos) = self.relations.iter().position(|r| r.name == table) else {
            return self;
        };
        if index.oid == 0 {
            index.oid = self.allocate_oid();
        }
        index.relation = self.relations[pos].oid;
        for key in index.keys.iter_mut().filter(|k| k.attnum == 0) {
            if let Some(p) = self.relations[pos]
                .attributes
                .iter()
                .position(|a| a.name == key.column_name)
            {
                key.attnum = p as i32 + 1;
            }
        }
        self.relations[pos].indexes.push(index.oid);
        self.indexes.push(index);
        self
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.types.push(name.into());
        self
    }

    pub fn oid_of(&self, name: &str) -> Option<Oid> {
        self.relations.iter().find(|r| r.name == name).map(|r| r.oid)
    }

    fn schema_for(&self, relation: &RangeVar) -> String {
        match &relation.schema {
            Some(schema) => schema.clone(),
            None if relation.is_temp() => TEMP_SCHEMA.to_string(),
            None => self.default_schema.clone(),
        }
    }
}

impl Catalog for MemoryCatalog {
    fn resolve_creation_namespace(
        &self,
        relation: &RangeVar,
    ) -> Result<(String, Option<Oid>), ElaborateError> {
        let schema = self.schema_for(relation);
        if schema != TEMP_SCHEMA && !self.schemas.contains(&schema) {
            return Err(undefined!("schema \"{}\" does not exist", schema).on(schema));
        }
        let existing = self
            .relations
            .iter()
            .find(|r| r.schema == schema && r.name == relation.name)
            .map(|r| r.oid);
        Ok((schema, existing))
    }

    fn resolve_type(&self, type_name: &TypeName) -> Result<DataType, ElaborateError> {
        let name = type_name.last_name();
        if DataType::is_builtin_name(name) {
            return Ok(DataType::from_name(name).with_typmods(&type_name.typmods));
        }
        let composite = self
            .relations
            .iter()
            .any(|r| r.name == name && r.kind == RelationKind::CompositeType);
        if composite || self.types.iter().any(|t| t == name) {
            return Ok(DataType::Custom(name.to_string()));
        }
        Err(undefined!("type \"{}\" does not exist", type_name)
            .on(type_name.to_string())
            .at(type_name.location))
    }

    fn relation_by_name(&self, relation: &RangeVar) -> Option<RelationInfo> {
        let found = match &relation.schema {
            Some(schema) => self
                .relations
                .iter()
                .find(|r| &r.schema == schema && r.name == relation.name),
            // Temp relations shadow the search path.
            None => self
                .relations
                .iter()
                .find(|r| r.schema == TEMP_SCHEMA && r.name == relation.name)
                .or_else(|| {
                    self.relations
                        .iter()
                        .find(|r| r.schema == self.default_schema && r.name == relation.name)
                }),
        };
        found.cloned()
    }

    fn relation(&self, oid: Oid) -> Option<RelationInfo> {
        self.relations.iter().find(|r| r.oid == oid).cloned()
    }

    fn relation_name_taken(&self, schema: &str, name: &str) -> bool {
        self.relations
            .iter()
            .any(|r| r.schema == schema && r.name == name)
            || self
                .indexes
                .iter()
                .any(|i| i.name == name && self.index_schema(i) == Some(schema))
    }

    fn index(&self, oid: Oid) -> Option<IndexInfo> {
        self.indexes.iter().find(|i| i.oid == oid).cloned()
    }

    fn index_by_name(&self, schema: &str, name: &str) -> Option<IndexInfo> {
        self.indexes
            .iter()
            .find(|i| i.name == name && self.index_schema(i) == Some(schema))
            .cloned()
    }

    fn sequence_exists(&self, name: &QualifiedName) -> bool {
        let schema = name.schema.as_deref().unwrap_or(&self.default_schema);
        self.sequences
            .iter()
            .any(|s| s.name == name.name && s.schema.as_deref().unwrap_or(&self.default_schema) == schema)
    }

    fn is_multi_nodegroup(&self, target_group: Option<&str>, source: Oid) -> bool {
        let target = target_group.unwrap_or(&self.installation_group);
        self.relations
            .iter()
            .find(|r| r.oid == source)
            .is_some_and(|r| r.group.as_deref().unwrap_or(&self.installation_group) != target)
    }
}

impl MemoryCatalog {
    fn index_schema(&self, index: &IndexInfo) -> Option<&str> {
        self.relations
            .iter()
            .find(|r| r.oid == index.relation)
            .map(|r| r.schema.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_relation(RelationInfo::table("public", "orders").with_column("id", "int4"))
            .with_relation(RelationInfo::new("public", "addr", RelationKind::CompositeType))
            .with_index(
                "orders",
                IndexInfo::on_columns(&RelationInfo::table("public", "orders"), "orders_id_idx", &["id"]),
            )
    }

    #[test]
    fn test_namespace_resolution() {
        let catalog = catalog();
        let (schema, existing) = catalog
            .resolve_creation_namespace(&RangeVar::new("orders"))
            .unwrap();
        assert_eq!(schema, "public");
        assert_eq!(existing, catalog.oid_of("orders"));

        let err = catalog
            .resolve_creation_namespace(&RangeVar::qualified("nope", "t"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Undefined);
    }

    #[test]
    fn test_type_resolution() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve_type(&TypeName::new("int8")).unwrap(),
            DataType::Int8
        );
        assert_eq!(
            catalog.resolve_type(&TypeName::new("addr")).unwrap(),
            DataType::Custom("addr".to_string())
        );
        let err = catalog.resolve_type(&TypeName::new("widget")).unwrap_err();
        assert_eq!(err.message(), "type \"widget\" does not exist");
    }

    #[test]
    fn test_index_links_to_relation() {
        let catalog = catalog();
        let orders = catalog.relation_by_name(&RangeVar::new("orders")).unwrap();
        assert_eq!(orders.indexes.len(), 1);
        let index = catalog.index(orders.indexes[0]).unwrap();
        assert_eq!(index.keys[0].attnum, 1);
        assert!(catalog.index_by_name("public", "orders_id_idx").is_some());
        assert!(catalog.relation_name_taken("public", "orders_id_idx"));
    }

    #[test]
    fn test_json_catalog_gets_oids() {
        let json = r#"{
            "relations": [{"schema": "public", "name": "t", "kind": "Table",
                           "attributes": [{"name": "a", "type_name": {"names": ["int4"]}}]}]
        }"#;
        let catalog = MemoryCatalog::from_json(json).unwrap();
        assert!(catalog.oid_of("t").unwrap() > 0);
        assert!(!catalog.is_multi_nodegroup(None, catalog.oid_of("t").unwrap()));
        assert!(catalog.is_multi_nodegroup(Some("group_b"), catalog.oid_of("t").unwrap()));
    }
}
