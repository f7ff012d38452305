use serde::{Deserialize, Serialize};

pub mod alter_table;
pub mod column;
pub mod comment;
pub mod common;
pub mod constraint;
pub mod create_table;
pub mod expr;
pub mod index;
pub mod partition;
pub mod sequence;
pub mod type_name;

/// A table-definition statement as handed over by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    CreateTable(create_table::CreateTableStmt),
    AlterTable(alter_table::AlterTableStmt),
}

impl From<create_table::CreateTableStmt> for Statement {
    fn from(stmt: create_table::CreateTableStmt) -> Self {
        Statement::CreateTable(stmt)
    }
}

impl From<alter_table::AlterTableStmt> for Statement {
    fn from(stmt: alter_table::AlterTableStmt) -> Self {
        Statement::AlterTable(stmt)
    }
}
