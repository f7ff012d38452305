use elaborator::{
    Elaboration,
    catalog::{
        AttributeInfo, IndexInfo, MemoryCatalog, PartitionEntry, PartitionInfo, RelationInfo,
        RelationKind,
    },
};
use model::core::{boundary::BoundaryValue, identifiers::QualifiedName, value::Value};
use statement::{
    action::Action,
    ast::{
        alter_table::AlterTableCmd,
        comment::CommentTarget,
        constraint::ConstraintKind,
        create_table::{CreateTableStmt, TableElement},
        expr::Expr,
        index::IndexSpec,
        partition::PartitionDef,
        type_name::TypeName,
    },
};

/// Two plain tables: `customers` is hash-distributed on `id`, `orders`
/// exists so IF NOT EXISTS has something to skip.
pub const SHOP_CATALOG_JSON: &str = r#"{
    "relations": [
        {
            "schema": "public",
            "name": "customers",
            "kind": "Table",
            "attributes": [
                {"name": "id", "type_name": {"names": ["int4"]}, "not_null": true},
                {"name": "name", "type_name": {"names": ["text"]}}
            ],
            "distribution": {"kind": "Hash", "columns": ["id"]}
        },
        {
            "schema": "public",
            "name": "orders",
            "kind": "Table",
            "attributes": [
                {"name": "id", "type_name": {"names": ["int4"]}},
                {"name": "amount", "type_name": {"names": ["numeric"]}}
            ]
        }
    ]
}"#;

/// `CREATE TABLE events (id bigserial, payload text)` as the parser hands it over.
pub const EVENTS_STMT_JSON: &str = r#"{
    "CreateTable": {
        "relation": {"schema": null, "name": "events"},
        "elements": [
            {"Column": {"name": "id", "type_name": {"names": ["bigserial"]}}},
            {"Column": {"name": "payload", "type_name": {"names": ["text"]}}}
        ]
    }
}"#;

pub fn json_catalog() -> MemoryCatalog {
    MemoryCatalog::from_json(SHOP_CATALOG_JSON).expect("shop catalog fixture")
}

/// The JSON catalog plus builder-made relations:
/// - `items`: a LIKE source with a serial id, a commented price, a check and a primary key
/// - `sales`: range partitioned on `id` with `p1 < 100`, `p2 < 200`, `p3 < 300`
/// - `ledger`: a plain table with a unique index `ledger_a_idx` on `a`
pub fn shop_catalog() -> MemoryCatalog {
    let mut items = RelationInfo::table("public", "items")
        .with_attribute(
            AttributeInfo::new("id", TypeName::new("int4"))
                .not_null()
                .with_default(Expr::nextval(&QualifiedName::qualified("public", "items_id_seq"))),
        )
        .with_attribute(
            AttributeInfo::new("price", TypeName::new("numeric"))
                .with_default(Value::Int4(0).into())
                .with_comment("unit price"),
        )
        .with_check(
            "items_price_check",
            Expr::binary(">=", Expr::var(2), Value::Int4(0).into()),
        );
    items
        .owned_sequences
        .push(QualifiedName::qualified("public", "items_id_seq"));
    let items_pkey = IndexInfo::on_columns(&items, "items_pkey", &["id"])
        .primary()
        .constraint("items_pkey");

    let sales = RelationInfo::table("public", "sales")
        .with_column("id", "int4")
        .with_column("sold_on", "date")
        .with_partition(PartitionInfo::range(
            vec![1],
            vec![
                PartitionEntry::new("p1", Value::Int4(100).into()),
                PartitionEntry::new("p2", Value::Int4(200).into()),
                PartitionEntry::new("p3", Value::Int4(300).into()),
            ],
        ));

    let ledger = RelationInfo::table("public", "ledger")
        .with_column("a", "int4")
        .with_column("b", "int4");
    let ledger_idx = IndexInfo::on_columns(&ledger, "ledger_a_idx", &["a"]).unique();

    json_catalog()
        .with_relation(items)
        .with_index("items", items_pkey)
        .with_relation(sales)
        .with_relation(ledger)
        .with_index("ledger", ledger_idx)
}

/// The JSON catalog plus `src`: a serial id, a checked and commented price,
/// a primary key, a unique key on `(id, price)`, and range partitions on `id`
/// stored out of boundary order.
pub fn partitioned_source_catalog() -> MemoryCatalog {
    let mut src = RelationInfo::table("public", "src")
        .with_attribute(
            AttributeInfo::new("id", TypeName::new("int4"))
                .not_null()
                .with_default(Expr::nextval(&QualifiedName::qualified("public", "src_id_seq"))),
        )
        .with_attribute(
            AttributeInfo::new("price", TypeName::new("numeric"))
                .with_default(Value::Int4(0).into())
                .with_comment("unit price"),
        )
        .with_check(
            "src_price_check",
            Expr::binary(">=", Expr::var(2), Value::Int4(0).into()),
        )
        .with_partition(PartitionInfo::range(
            vec![1],
            vec![
                PartitionEntry::new("p2", Value::Int4(200).into()),
                PartitionEntry::new("pmax", BoundaryValue::MaxValue),
                PartitionEntry::new("p1", Value::Int4(100).into()),
            ],
        ));
    src.owned_sequences
        .push(QualifiedName::qualified("public", "src_id_seq"));
    let src_pkey = IndexInfo::on_columns(&src, "src_pkey", &["id"])
        .primary()
        .constraint("src_pkey");
    let src_key = IndexInfo::on_columns(&src, "src_id_price_key", &["id", "price"])
        .unique()
        .constraint("src_id_price_key");

    json_catalog()
        .with_relation(src)
        .with_index("src", src_pkey)
        .with_index("src", src_key)
}

/// Adds the table an elaboration creates to `catalog`, as executing its
/// actions would: the relation with its column defaults, comments, checks
/// and partitions, its serial sequences, and its indexes.
pub fn register_created(catalog: MemoryCatalog, elaboration: &Elaboration) -> MemoryCatalog {
    let table = created_table(elaboration);
    let schema = table.relation.schema.clone().unwrap_or_else(|| "public".to_string());
    let mut rel = RelationInfo::table(&schema, &table.relation.name);

    for element in &table.elements {
        let TableElement::Column(column) = element else {
            continue;
        };
        let mut attribute = AttributeInfo::new(&column.name, column.type_name.clone());
        attribute.not_null = column.is_not_null
            || column
                .constraints
                .iter()
                .any(|c| matches!(c.kind, ConstraintKind::NotNull));
        attribute.default = column.default_expr().cloned();
        attribute.comment = column_comment(elaboration, &column.name);
        rel = rel.with_attribute(attribute);
    }

    for constraint in &table.constraints {
        if let ConstraintKind::Check {
            cooked: Some(expr), ..
        } = &constraint.kind
        {
            rel = rel.with_check(constraint.name.clone().unwrap_or_default(), expr.clone());
        }
    }

    if let Some(spec) = &table.partition {
        let key_attnums = spec
            .keys
            .iter()
            .filter_map(|key| rel.attributes.iter().position(|a| &a.name == key))
            .map(|p| p as i32 + 1)
            .collect();
        let entries = spec
            .definitions
            .iter()
            .filter_map(|d| match d {
                PartitionDef::LessThan(d) => Some(PartitionEntry {
                    name: d.name.clone(),
                    boundary: d.boundary.clone(),
                    tablespace: d.tablespace.clone(),
                    interval_created: false,
                }),
                _ => None,
            })
            .collect();
        let mut info = PartitionInfo::range(key_attnums, entries);
        info.strategy = spec.strategy;
        rel = rel.with_partition(info);
    }

    let mut catalog = catalog;
    for action in &elaboration.actions {
        if let Action::AlterSequence(seq) = action {
            let schema = seq.sequence.schema.clone().unwrap_or_else(|| schema.clone());
            rel.owned_sequences
                .push(QualifiedName::qualified(&schema, &seq.sequence.name));
            catalog = catalog.with_relation(RelationInfo::new(
                schema,
                &seq.sequence.name,
                RelationKind::Sequence,
            ));
        }
    }

    let table_name = table.relation.name.clone();
    let indexes: Vec<IndexInfo> = elaboration
        .actions
        .iter()
        .filter_map(Action::as_create_index)
        .map(|index| index_info(&rel, &table_name, index))
        .collect();

    catalog = catalog.with_relation(rel);
    for index in indexes {
        catalog = catalog.with_index(&table_name, index);
    }
    catalog
}

fn column_comment(elaboration: &Elaboration, column: &str) -> Option<String> {
    elaboration.actions.iter().find_map(|action| match action {
        Action::Comment(stmt) => match &stmt.target {
            CommentTarget::Column { column: c, .. } if c == column => stmt.comment.clone(),
            _ => None,
        },
        _ => None,
    })
}

fn index_info(rel: &RelationInfo, table: &str, index: &IndexSpec) -> IndexInfo {
    let columns = index.column_names();
    let name = index.name.clone().unwrap_or_else(|| {
        if index.primary {
            format!("{table}_pkey")
        } else {
            format!("{table}_{}_key", columns.join("_"))
        }
    });
    let mut info = IndexInfo::on_columns(rel, &name, &columns);
    info.access_method = index.access_method.clone();
    info.unique = index.unique;
    info.primary = index.primary;
    info.comment = index.comment.clone();
    if index.is_constraint {
        info = info.constraint(&name);
    }
    info
}

/// What a LIKE copy of a table is expected to reproduce, with generated
/// names left out.
#[derive(Debug, PartialEq)]
pub struct TableShape {
    pub columns: Vec<(String, TypeName, bool, bool)>,
    pub checks: Vec<(Option<String>, ConstraintKind)>,
    /// `(primary, unique, columns)` per created index.
    pub indexes: Vec<(bool, bool, Vec<String>)>,
    pub partitions: Vec<(String, Vec<String>)>,
    pub comments: Vec<String>,
}

pub fn table_shape(elaboration: &Elaboration) -> TableShape {
    let table = created_table(elaboration);
    let columns = table
        .elements
        .iter()
        .filter_map(|e| match e {
            TableElement::Column(c) => Some((
                c.name.clone(),
                c.type_name.clone(),
                c.is_not_null,
                c.is_serial,
            )),
            _ => None,
        })
        .collect();
    let checks = table
        .constraints
        .iter()
        .filter(|c| matches!(c.kind, ConstraintKind::Check { .. }))
        .map(|c| (c.name.clone(), c.kind.clone()))
        .collect();
    let indexes = elaboration
        .actions
        .iter()
        .filter_map(Action::as_create_index)
        .map(|i| {
            (
                i.primary,
                i.unique,
                i.column_names().into_iter().map(str::to_string).collect(),
            )
        })
        .collect();
    let partitions = table
        .partition
        .iter()
        .flat_map(|p| p.definitions.iter())
        .filter_map(|d| match d {
            PartitionDef::LessThan(d) => Some((
                d.name.clone(),
                d.boundary.iter().map(ToString::to_string).collect(),
            )),
            _ => None,
        })
        .collect();
    let comments = elaboration
        .actions
        .iter()
        .filter_map(|a| match a {
            Action::Comment(stmt) => stmt.comment.clone(),
            _ => None,
        })
        .collect();
    TableShape {
        columns,
        checks,
        indexes,
        partitions,
        comments,
    }
}

pub fn action_tags(elaboration: &Elaboration) -> Vec<&'static str> {
    elaboration.actions.iter().map(Action::tag).collect()
}

pub fn created_table(elaboration: &Elaboration) -> &CreateTableStmt {
    elaboration
        .create_table()
        .expect("elaboration carries a CREATE TABLE")
}

pub fn column_names(stmt: &CreateTableStmt) -> Vec<&str> {
    stmt.elements
        .iter()
        .filter_map(|e| match e {
            TableElement::Column(c) => Some(c.name.as_str()),
            _ => None,
        })
        .collect()
}

/// Commands of the first ALTER TABLE action.
pub fn alter_cmds(elaboration: &Elaboration) -> &[AlterTableCmd] {
    elaboration
        .actions
        .iter()
        .find_map(Action::as_alter_table)
        .map(|a| a.cmds.as_slice())
        .expect("elaboration carries an ALTER TABLE")
}

pub fn partition_names(defs: &[PartitionDef]) -> Vec<&str> {
    defs.iter().map(PartitionDef::name).collect()
}

/// Upper boundaries of resolved `LESS THAN` partitions, rendered.
pub fn partition_bounds(defs: &[PartitionDef]) -> Vec<String> {
    defs.iter()
        .filter_map(|d| match d {
            PartitionDef::LessThan(d) => d.boundary.first().map(ToString::to_string),
            _ => None,
        })
        .collect()
}
