#[cfg(test)]
mod tests {
    use crate::{
        elaborate, elaborate_with,
        utils::{
            EVENTS_STMT_JSON, action_tags, alter_cmds, column_names, created_table, json_catalog,
            partition_bounds, partition_names, partitioned_source_catalog, register_created,
            shop_catalog, table_shape,
        },
    };
    use elaborator::{
        error::ElaborateError,
        settings::{ElaborateRequest, ElaborateSettings},
    };
    use model::core::{data_type::DataType, value::Value};
    use statement::{
        action::Action,
        ast::{
            Statement,
            alter_table::{AlterTableCmd, AlterTableStmt, PartitionRef},
            constraint::{ConstraintKind, ConstraintSpec, ForeignKeySpec, KeyConstraint},
            create_table::{DistributeBy, DistributionKind, LikeOptions, TableElement},
            partition::{PartitionDef, PartitionSpec, StartEndDef},
        },
        builder::{column::ColumnDefBuilder, create_table::CreateTableStmtBuilder},
        range_var, type_name,
    };
    use tracing_test::traced_test;
    use uuid::Uuid;

    fn start_end(defs: Vec<StartEndDef>) -> Vec<PartitionDef> {
        defs.into_iter().map(PartitionDef::StartEnd).collect()
    }

    // Test Settings: Default (coordinator, first node).
    // Scenario: A statement decoded from JSON declares a bigserial column, with one
    // pre-generated sequence identity.
    // Expected Outcome:
    // - CREATE SEQUENCE before the table, ALTER SEQUENCE .. OWNED BY after it.
    // - The sequence carries the supplied identity.
    // - The implicit-sequence notice is returned and logged.
    #[traced_test]
    #[test]
    fn tc01() {
        let catalog = json_catalog();
        let stmt: Statement = serde_json::from_str(EVENTS_STMT_JSON).unwrap();
        let uuid = Uuid::new_v4();
        let request = ElaborateRequest::new("CREATE TABLE events (id bigserial, payload text)")
            .with_sequence_uuids(vec![uuid]);

        let result = elaborate_with(&catalog, ElaborateSettings::default(), stmt, &request).unwrap();

        assert_eq!(
            action_tags(&result),
            vec!["CREATE SEQUENCE", "CREATE TABLE", "ALTER SEQUENCE"]
        );
        let Action::CreateSequence(seq) = &result.actions[0] else {
            panic!("expected CREATE SEQUENCE first");
        };
        assert_eq!(seq.sequence.name, "events_id_seq");
        assert_eq!(seq.uuid, Some(uuid));

        let table = created_table(&result);
        assert_eq!(table.relation.schema.as_deref(), Some("public"));
        assert_eq!(column_names(table), vec!["id", "payload"]);
        let TableElement::Column(id) = &table.elements[0] else {
            panic!("expected a column");
        };
        assert!(id.is_serial && id.is_not_null);
        assert_eq!(id.data_type, Some(DataType::Int8));

        assert_eq!(
            result.notices,
            vec!["CREATE TABLE will create implicit sequence \"events_id_seq\" for serial column \"events.id\""]
        );
        assert!(logs_contain("will create implicit sequence \"events_id_seq\""));
        assert!(logs_contain("elaborated into 3 action(s)"));
    }

    // Test Settings: pre_check = TRUE, is_first_node = FALSE.
    // Scenario: The same serial table is elaborated during a speculative pass on a
    // non-authoritative node.
    // Expected Outcome: The sequence is still planned but no notice is raised.
    #[traced_test]
    #[test]
    fn tc02() {
        let catalog = json_catalog();
        let stmt: Statement = serde_json::from_str(EVENTS_STMT_JSON).unwrap();
        let settings = ElaborateSettings {
            pre_check: true,
            is_first_node: false,
            ..Default::default()
        };

        let result = elaborate_with(&catalog, settings, stmt, &ElaborateRequest::default()).unwrap();

        assert_eq!(action_tags(&result)[0], "CREATE SEQUENCE");
        assert!(result.notices.is_empty());
        assert!(!logs_contain("will create implicit sequence"));
    }

    // Test Settings: Default.
    // Scenario: A column PRIMARY KEY, a column UNIQUE and a table-level UNIQUE repeating
    // the primary key column.
    // Expected Outcome:
    // - Two CREATE INDEX actions, the primary key first; the duplicate UNIQUE is merged away.
    // - The key column becomes NOT NULL.
    // - The table is hash-distributed on the primary key column.
    #[traced_test]
    #[test]
    fn tc03() {
        let catalog = json_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("accounts"))
            .column(
                ColumnDefBuilder::new("id", type_name!("int4"))
                    .primary_key()
                    .build(),
            )
            .column(ColumnDefBuilder::new("email", type_name!("text")).unique().build())
            .constraint(ConstraintSpec::unique(&["id"]))
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        assert_eq!(
            action_tags(&result),
            vec!["CREATE TABLE", "CREATE INDEX", "CREATE INDEX"]
        );
        let indexes: Vec<_> = result
            .actions
            .iter()
            .filter_map(Action::as_create_index)
            .collect();
        assert!(indexes[0].primary);
        assert!(indexes[0].skip_mem_check);
        assert_eq!(indexes[0].column_names(), vec!["id"]);
        assert_eq!(indexes[1].column_names(), vec!["email"]);

        let table = created_table(&result);
        let TableElement::Column(id) = &table.elements[0] else {
            panic!("expected a column");
        };
        assert!(id.is_not_null);
        assert_eq!(
            table.distribute_by,
            Some(DistributeBy {
                kind: DistributionKind::Hash,
                columns: vec!["id".to_string()],
            })
        );
    }

    // Test Settings: Default.
    // Scenario: A serial primary key plus a column REFERENCES customers(id).
    // Expected Outcome:
    // - Order: CREATE SEQUENCE, CREATE TABLE, CREATE INDEX, the foreign key ALTER TABLE,
    //   then ALTER SEQUENCE .. OWNED BY.
    // - The foreign key is marked valid without a scan.
    // - The primary key column wins the fallback distribution.
    #[traced_test]
    #[test]
    fn tc04() {
        let catalog = json_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("invoices"))
            .column(
                ColumnDefBuilder::new("id", type_name!("serial"))
                    .primary_key()
                    .build(),
            )
            .column(
                ColumnDefBuilder::new("customer_id", type_name!("int4"))
                    .references(range_var!("customers"), "id")
                    .build(),
            )
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        assert_eq!(
            action_tags(&result),
            vec![
                "CREATE SEQUENCE",
                "CREATE TABLE",
                "CREATE INDEX",
                "ALTER TABLE",
                "ALTER SEQUENCE"
            ]
        );
        match alter_cmds(&result) {
            [AlterTableCmd::ProcessedConstraint(spec)] => {
                let ConstraintKind::ForeignKey(fk) = &spec.kind else {
                    panic!("expected a foreign key");
                };
                assert_eq!(fk.fk_attrs, vec!["customer_id".to_string()]);
                assert!(fk.skip_validation && fk.initially_valid);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
        let table = created_table(&result);
        assert_eq!(
            table.distribute_by.as_ref().map(|d| d.columns.clone()),
            Some(vec!["id".to_string()])
        );
    }

    // Test Settings: Default.
    // Scenario: No key at all, only a foreign key into the hash-distributed customers table.
    // Expected Outcome: The referencing column lines up with the referenced distribution
    // key and becomes the table's hash distribution column.
    #[traced_test]
    #[test]
    fn tc05() {
        let catalog = json_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("visits"))
            .column(
                ColumnDefBuilder::new("customer_id", type_name!("int4"))
                    .references(range_var!("customers"), "id")
                    .build(),
            )
            .column(ColumnDefBuilder::new("visited_on", type_name!("date")).build())
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        assert_eq!(action_tags(&result), vec!["CREATE TABLE", "ALTER TABLE"]);
        assert_eq!(
            created_table(&result).distribute_by,
            Some(DistributeBy {
                kind: DistributionKind::Hash,
                columns: vec!["customer_id".to_string()],
            })
        );
    }

    // Test Settings: IF NOT EXISTS.
    // Scenario: The target relation `orders` already exists.
    // Expected Outcome: No actions; the skip notice is returned and logged.
    #[traced_test]
    #[test]
    fn tc06() {
        let catalog = json_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("orders"))
            .column(ColumnDefBuilder::new("id", type_name!("serial")).build())
            .if_not_exists()
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        assert!(result.is_empty());
        assert_eq!(
            result.notices,
            vec!["relation \"orders\" already exists, skipping"]
        );
        assert!(logs_contain("already exists, skipping"));
    }

    // Test Settings: Default.
    // Scenario: Statements that are malformed or ask for something never supported.
    // Expected Outcome: Each is refused with the matching error category.
    #[traced_test]
    #[test]
    fn tc07() {
        let catalog = json_catalog();

        let temp_with_schema = CreateTableStmtBuilder::new(range_var!("public", "scratch"))
            .temp()
            .column(ColumnDefBuilder::new("a", type_name!("int4")).build())
            .build();
        let err = elaborate(&catalog, temp_with_schema).unwrap_err();
        assert!(matches!(err, ElaborateError::InvalidDefinition(_)));
        assert_eq!(err.message(), "temporary tables cannot specify a schema name");

        let temp_serial = CreateTableStmtBuilder::new(range_var!("scratch"))
            .temp()
            .column(ColumnDefBuilder::new("id", type_name!("serial")).build())
            .build();
        let err = elaborate(&catalog, temp_serial).unwrap_err();
        assert!(matches!(err, ElaborateError::Unsupported(_)));

        let round_robin = CreateTableStmtBuilder::new(range_var!("rr"))
            .column(ColumnDefBuilder::new("a", type_name!("int4")).build())
            .distribute_by(DistributeBy {
                kind: DistributionKind::RoundRobin,
                columns: Vec::new(),
            })
            .build();
        let err = elaborate(&catalog, round_robin).unwrap_err();
        assert!(matches!(err, ElaborateError::Unsupported(_)));
        assert_eq!(err.message(), "Unsupport ROUNDROBIN distribute type");

        let missing_schema = CreateTableStmtBuilder::new(range_var!("nowhere", "t"))
            .column(ColumnDefBuilder::new("a", type_name!("int4")).build())
            .build();
        let err = elaborate(&catalog, missing_schema).unwrap_err();
        assert!(matches!(err, ElaborateError::Undefined(_)));

        let reserved = CreateTableStmtBuilder::new(range_var!("r"))
            .column(ColumnDefBuilder::new("tid", type_name!("int4")).build())
            .build();
        let err = elaborate(&catalog, reserved).unwrap_err();
        assert!(matches!(err, ElaborateError::InvalidDefinition(_)));
        assert_eq!(
            err.message(),
            "column name \"tid\" conflicts with a system column name"
        );
    }

    // Test Settings: Default.
    // Scenario: CREATE TABLE items_copy (LIKE items INCLUDING ALL) where items owns the
    // sequence behind its id default.
    // Expected Outcome:
    // - The copy gets its own sequence, its columns, the check constraint and a clone of
    //   the primary key index.
    // - The column comment becomes a trailing COMMENT action.
    #[traced_test]
    #[test]
    fn tc08() {
        let catalog = shop_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("items_copy"))
            .like(range_var!("items"), LikeOptions::ALL)
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        assert_eq!(
            action_tags(&result),
            vec![
                "CREATE SEQUENCE",
                "CREATE TABLE",
                "CREATE INDEX",
                "ALTER SEQUENCE",
                "COMMENT"
            ]
        );
        let Action::CreateSequence(seq) = &result.actions[0] else {
            panic!("expected CREATE SEQUENCE first");
        };
        assert_eq!(seq.sequence.name, "items_copy_id_seq");

        let table = created_table(&result);
        assert_eq!(column_names(table), vec!["id", "price"]);
        assert_eq!(table.constraints.len(), 1);
        assert!(matches!(table.constraints[0].kind, ConstraintKind::Check { .. }));
        assert!(table.internal_data.is_none());

        let index = result
            .actions
            .iter()
            .find_map(Action::as_create_index)
            .unwrap();
        assert!(index.primary);
        assert_eq!(index.relation.name, "items_copy");
        assert_eq!(result.notices.len(), 1);
    }

    // Test Settings: Default.
    // Scenario: LIKE clauses that contradict other clauses, or name a missing source.
    // Expected Outcome: InvalidDefinition for the conflicts, Undefined for the missing source.
    #[traced_test]
    #[test]
    fn tc09() {
        let catalog = shop_catalog();

        let with_options = CreateTableStmtBuilder::new(range_var!("c1"))
            .like(range_var!("items"), LikeOptions::RELOPTIONS)
            .option("fillfactor", "70")
            .build();
        let err = elaborate(&catalog, with_options).unwrap_err();
        assert!(matches!(err, ElaborateError::InvalidDefinition(_)));
        assert_eq!(
            err.detail(),
            Some("use either \"like clause including reloptions\" or \"with\" clause")
        );

        let with_partition = CreateTableStmtBuilder::new(range_var!("c2"))
            .like(range_var!("sales"), LikeOptions::PARTITION)
            .partition_by(PartitionSpec::range(&["id"], Vec::new()))
            .build();
        let err = elaborate(&catalog, with_partition).unwrap_err();
        assert_eq!(
            err.message(),
            "unsupport \"like clause including partition\" for partitioned table"
        );

        let missing = CreateTableStmtBuilder::new(range_var!("c3"))
            .like(range_var!("nope"), LikeOptions::empty())
            .build();
        let err = elaborate(&catalog, missing).unwrap_err();
        assert!(matches!(err, ElaborateError::Undefined(_)));
    }

    // Test Settings: Coordinator first, then a datanode (is_coordinator = FALSE).
    // Scenario: The copy is created in another placement group than items. The
    // coordinator ships the LIKE metadata; a datanode that cannot see items replays it.
    // Expected Outcome:
    // - The coordinator's CREATE TABLE carries the encoded metadata.
    // - The datanode rebuilds the same columns, a fresh sequence and the cloned index.
    #[traced_test]
    #[test]
    fn tc10() {
        let stmt = CreateTableStmtBuilder::new(range_var!("items_copy"))
            .like(range_var!("items"), LikeOptions::ALL)
            .to_group("group_b")
            .build();

        let coordinator = elaborate(&shop_catalog(), stmt.clone()).unwrap();
        let shipped = created_table(&coordinator)
            .internal_data
            .clone()
            .expect("metadata shipped for a cross-group source");

        let mut replayed_stmt = stmt;
        replayed_stmt.internal_data = Some(shipped);
        let datanode = ElaborateSettings {
            is_coordinator: false,
            ..Default::default()
        };
        let result = elaborate_with(
            &json_catalog(),
            datanode,
            replayed_stmt,
            &ElaborateRequest::default(),
        )
        .unwrap();

        let table = created_table(&result);
        assert_eq!(column_names(table), vec!["id", "price"]);
        let tags = action_tags(&result);
        assert_eq!(tags[0], "CREATE SEQUENCE");
        assert!(tags.contains(&"ALTER SEQUENCE"));
        assert_eq!(tags.iter().filter(|t| **t == "CREATE INDEX").count(), 1);
    }

    // Test Settings: Default.
    // Scenario: PARTITION BY RANGE (id) (PARTITION p START (1) END (100) EVERY (30)).
    // Expected Outcome: Five LESS THAN partitions p_0 .. p_4 with upper boundaries
    // 1, 31, 61, 91 and 100.
    #[traced_test]
    #[test]
    fn tc11() {
        let catalog = json_catalog();
        let stmt = CreateTableStmtBuilder::new(range_var!("metrics"))
            .column(ColumnDefBuilder::new("id", type_name!("int4")).build())
            .column(ColumnDefBuilder::new("reading", type_name!("float8")).build())
            .partition_by(PartitionSpec::range(
                &["id"],
                start_end(vec![
                    StartEndDef::new("p")
                        .start(Value::Int4(1))
                        .end(Value::Int4(100))
                        .every(Value::Int4(30)),
                ]),
            ))
            .build();

        let result = elaborate(&catalog, stmt).unwrap();

        let partition = created_table(&result).partition.as_ref().unwrap();
        assert_eq!(
            partition_names(&partition.definitions),
            vec!["p_0", "p_1", "p_2", "p_3", "p_4"]
        );
        assert_eq!(
            partition_bounds(&partition.definitions),
            vec!["1", "31", "61", "91", "100"]
        );
        assert!(logs_contain("resolved to 5 partition(s)"));
    }

    // Test Settings: Default.
    // Scenario: A START/END list with a gap between two entries, and a primary key that
    // leaves out the partition key.
    // Expected Outcome: Both are refused.
    #[traced_test]
    #[test]
    fn tc12() {
        let catalog = json_catalog();
        let gap = CreateTableStmtBuilder::new(range_var!("gappy"))
            .column(ColumnDefBuilder::new("id", type_name!("int4")).build())
            .partition_by(PartitionSpec::range(
                &["id"],
                start_end(vec![
                    StartEndDef::new("a").start(Value::Int4(0)).end(Value::Int4(10)),
                    StartEndDef::new("b").start(Value::Int4(20)).end(Value::Int4(30)),
                ]),
            ))
            .build();
        let err = elaborate(&catalog, gap).unwrap_err();
        assert!(matches!(err, ElaborateError::InvalidDefinition(_)));
        assert_eq!(err.message(), "start value of partition \"b\" is too high.");

        let bad_key = CreateTableStmtBuilder::new(range_var!("keyed"))
            .column(ColumnDefBuilder::new("id", type_name!("int4")).build())
            .column(
                ColumnDefBuilder::new("code", type_name!("int4"))
                    .primary_key()
                    .build(),
            )
            .partition_by(PartitionSpec::range(
                &["id"],
                start_end(vec![StartEndDef::new("p").start(Value::Int4(0))]),
            ))
            .build();
        let err = elaborate(&catalog, bad_key).unwrap_err();
        assert!(matches!(err, ElaborateError::Unsupported(_)));
        assert_eq!(
            err.message(),
            "Invalid PRIMARY KEY/UNIQUE constraint for partitioned table"
        );
    }

    // Test Settings: Default.
    // Scenario: ALTER TABLE ledger ADD COLUMN c int4 DEFAULT 0 UNIQUE.
    // Expected Outcome: One ALTER TABLE carrying the bare column and an ADD INDEX for the
    // inline unique constraint.
    #[traced_test]
    #[test]
    fn tc13() {
        let catalog = shop_catalog();
        let stmt = AlterTableStmt::new(
            range_var!("ledger"),
            vec![AlterTableCmd::AddColumn(
                ColumnDefBuilder::new("c", type_name!("int4"))
                    .default_value(Value::Int4(0))
                    .unique()
                    .build(),
            )],
        );

        let result = elaborate(&catalog, stmt).unwrap();

        assert_eq!(action_tags(&result), vec!["ALTER TABLE"]);
        match alter_cmds(&result) {
            [AlterTableCmd::AddColumn(column), AlterTableCmd::AddIndex(index)] => {
                assert_eq!(column.name, "c");
                assert!(column.constraints.is_empty());
                assert!(column.raw_default.is_some());
                assert!(index.unique);
                assert_eq!(index.column_names(), vec!["c"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    // Test Settings: Default.
    // Scenario: ALTER TABLE on a missing relation, and ADD COLUMN of a serial column.
    // Expected Outcome: Undefined, then Unsupported.
    #[traced_test]
    #[test]
    fn tc14() {
        let catalog = shop_catalog();

        let missing = AlterTableStmt::new(range_var!("ghost"), Vec::new());
        let err = elaborate(&catalog, missing).unwrap_err();
        assert!(matches!(err, ElaborateError::Undefined(_)));
        assert_eq!(err.message(), "relation \"ghost\" does not exist");

        let serial = AlterTableStmt::new(
            range_var!("ledger"),
            vec![AlterTableCmd::AddColumn(
                ColumnDefBuilder::new("n", type_name!("serial")).build(),
            )],
        );
        let err = elaborate(&catalog, serial).unwrap_err();
        assert!(matches!(err, ElaborateError::Unsupported(_)));
        assert_eq!(err.message(), "It's not supported to alter table add serial column");
    }

    // Test Settings: Default.
    // Scenario: ADD CONSTRAINT UNIQUE USING INDEX ledger_a_idx, then ADD FOREIGN KEY.
    // Expected Outcome:
    // - The unique constraint adopts the existing index (AddIndexConstraint with its oid).
    // - The foreign key stays inside the ALTER and is validated normally.
    #[traced_test]
    #[test]
    fn tc15() {
        let catalog = shop_catalog();
        let using_index = ConstraintSpec::new(ConstraintKind::Unique(KeyConstraint {
            index_name: Some("ledger_a_idx".to_string()),
            ..Default::default()
        }));
        let stmt = AlterTableStmt::new(
            range_var!("ledger"),
            vec![AlterTableCmd::AddConstraint(using_index)],
        );

        let result = elaborate(&catalog, stmt).unwrap();
        match alter_cmds(&result) {
            [AlterTableCmd::AddIndexConstraint(index)] => {
                assert!(index.index_oid.is_some());
                assert_eq!(index.column_names(), vec!["a"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        let fk = ConstraintSpec::new(ConstraintKind::ForeignKey(ForeignKeySpec::new(
            range_var!("customers"),
            &["b"],
            &["id"],
        )));
        let stmt = AlterTableStmt::new(range_var!("ledger"), vec![AlterTableCmd::AddConstraint(fk)]);

        let result = elaborate(&catalog, stmt).unwrap();
        assert_eq!(action_tags(&result), vec!["ALTER TABLE"]);
        match alter_cmds(&result) {
            [AlterTableCmd::AddConstraint(spec)] => {
                let ConstraintKind::ForeignKey(fk) = &spec.kind else {
                    panic!("expected a foreign key");
                };
                assert!(!fk.skip_validation);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    // Test Settings: Default.
    // Scenario: ALTER TABLE sales ADD PARTITION p4 START (300) END (500) EVERY (100), where
    // the last existing partition ends at 300.
    // Expected Outcome: p4_1 < 400 and p4_2 < 500. The same command on an unpartitioned
    // table is refused.
    #[traced_test]
    #[test]
    fn tc16() {
        let catalog = shop_catalog();
        let add = |table: &str| {
            AlterTableStmt::new(
                range_var!(table),
                vec![AlterTableCmd::AddPartition(start_end(vec![
                    StartEndDef::new("p4")
                        .start(Value::Int4(300))
                        .end(Value::Int4(500))
                        .every(Value::Int4(100)),
                ]))],
            )
        };

        let result = elaborate(&catalog, add("sales")).unwrap();
        match alter_cmds(&result) {
            [AlterTableCmd::AddPartition(defs)] => {
                assert_eq!(partition_names(defs), vec!["p4_1", "p4_2"]);
                assert_eq!(partition_bounds(defs), vec!["400", "500"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        let err = elaborate(&catalog, add("ledger")).unwrap_err();
        assert_eq!(
            err.message(),
            "can not add partition against NON-PARTITIONED table"
        );
    }

    // Test Settings: Default.
    // Scenario: SPLIT PARTITION p2 (100 .. 200) INTO (s1 START (100) END (150), s2 START (150)),
    // then a split located by a value inside p3, then a split of a missing partition.
    // Expected Outcome:
    // - s1 < 150, s2 < 200.
    // - The value 250 selects p3, so s1 ends at its boundary 300.
    // - The missing partition is Undefined.
    #[traced_test]
    #[test]
    fn tc17() {
        let catalog = shop_catalog();
        let split = |source: PartitionRef, dest: Vec<StartEndDef>| {
            AlterTableStmt::new(
                range_var!("sales"),
                vec![AlterTableCmd::SplitPartition {
                    source,
                    split_point: None,
                    dest: start_end(dest),
                }],
            )
        };

        let result = elaborate(
            &catalog,
            split(
                PartitionRef::Name("p2".into()),
                vec![
                    StartEndDef::new("s1").start(Value::Int4(100)).end(Value::Int4(150)),
                    StartEndDef::new("s2").start(Value::Int4(150)),
                ],
            ),
        )
        .unwrap();
        match alter_cmds(&result) {
            [AlterTableCmd::SplitPartition { dest, .. }] => {
                assert_eq!(partition_names(dest), vec!["s1", "s2"]);
                assert_eq!(partition_bounds(dest), vec!["150", "200"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        let result = elaborate(
            &catalog,
            split(
                PartitionRef::Value(vec![Value::Int4(250).into()]),
                vec![StartEndDef::new("s1").start(Value::Int4(200)).end(Value::Int4(300))],
            ),
        )
        .unwrap();
        match alter_cmds(&result) {
            [AlterTableCmd::SplitPartition { dest, .. }] => {
                assert_eq!(partition_bounds(dest), vec!["300"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        let err = elaborate(
            &catalog,
            split(
                PartitionRef::Name("p9".into()),
                vec![StartEndDef::new("s1").start(Value::Int4(0)).end(Value::Int4(1))],
            ),
        )
        .unwrap_err();
        assert!(matches!(err, ElaborateError::Undefined(_)));
        assert_eq!(err.message(), "split partition \"p9\" does not exist.");
    }

    // Test Settings: Default.
    // Scenario: The elaboration result of a serial table is serialized for the caller.
    // Expected Outcome: The JSON carries the planned sequence and the notice.
    #[traced_test]
    #[test]
    fn tc18() {
        let catalog = json_catalog();
        let stmt: Statement = serde_json::from_str(EVENTS_STMT_JSON).unwrap();
        let result = elaborate(&catalog, stmt).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("events_id_seq"));
        assert!(json.contains("will create implicit sequence"));
    }

    // Test Settings: Default.
    // Scenario:
    // - CREATE TABLE a (LIKE src INCLUDING ALL), with src partitions stored out of order.
    // - a is added to the catalog the way running its actions would add it.
    // - CREATE TABLE b (LIKE a INCLUDING ALL).
    // Expected Outcome:
    // - a lists its partitions in boundary order.
    // - b matches a in columns, checks, indexes, partitions and comments.
    #[traced_test]
    #[test]
    fn tc19() {
        let catalog = partitioned_source_catalog();
        let like = |name: &str, source: &str| {
            CreateTableStmtBuilder::new(range_var!(name))
                .like(range_var!(source), LikeOptions::ALL)
                .build()
        };

        let first = elaborate(&catalog, like("a", "src")).unwrap();
        let partition = created_table(&first).partition.as_ref().unwrap();
        assert_eq!(
            partition_names(&partition.definitions),
            vec!["p1", "p2", "pmax"]
        );
        assert_eq!(
            partition_bounds(&partition.definitions),
            vec!["100", "200", "MAXVALUE"]
        );

        let catalog = register_created(catalog, &first);
        let second = elaborate(&catalog, like("b", "a")).unwrap();

        let shape = table_shape(&first);
        assert_eq!(shape.columns.len(), 2);
        assert_eq!(shape.checks.len(), 1);
        assert_eq!(shape.indexes.len(), 2);
        assert_eq!(shape, table_shape(&second));
        assert_eq!(action_tags(&first), action_tags(&second));

        let Action::CreateSequence(seq) = &second.actions[0] else {
            panic!("expected CREATE SEQUENCE first");
        };
        assert_eq!(seq.sequence.name, "b_id_seq");
    }

    // Test Settings: Default.
    // Scenario: SPLIT PARTITION p2 of src, whose partitions are stored as p2, pmax, p1.
    // Expected Outcome: The split range runs from p1's boundary 100 up to p2's 200.
    #[traced_test]
    #[test]
    fn tc20() {
        let catalog = partitioned_source_catalog();
        let stmt = AlterTableStmt::new(
            range_var!("src"),
            vec![AlterTableCmd::SplitPartition {
                source: PartitionRef::Name("p2".into()),
                split_point: None,
                dest: start_end(vec![
                    StartEndDef::new("s")
                        .start(Value::Int4(100))
                        .end(Value::Int4(200))
                        .every(Value::Int4(50)),
                ]),
            }],
        );

        let result = elaborate(&catalog, stmt).unwrap();
        match alter_cmds(&result) {
            [AlterTableCmd::SplitPartition { dest, .. }] => {
                assert_eq!(partition_names(dest), vec!["s_1", "s_2"]);
                assert_eq!(partition_bounds(dest), vec!["150", "200"]);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }
}
