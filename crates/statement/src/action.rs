//! The ordered statement list an elaboration hands back for execution.

use crate::ast::{
    alter_table::AlterTableStmt,
    comment::CommentStmt,
    create_table::CreateTableStmt,
    index::IndexSpec,
    sequence::{AlterSequenceStmt, CreateSequenceStmt},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    CreateSequence(CreateSequenceStmt),
    AlterSequence(AlterSequenceStmt),
    CreateTable(CreateTableStmt),
    AlterTable(AlterTableStmt),
    CreateIndex(IndexSpec),
    Comment(CommentStmt),
}

impl Action {
    /// Short tag used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::CreateSequence(_) => "CREATE SEQUENCE",
            Action::AlterSequence(_) => "ALTER SEQUENCE",
            Action::CreateTable(_) => "CREATE TABLE",
            Action::AlterTable(_) => "ALTER TABLE",
            Action::CreateIndex(_) => "CREATE INDEX",
            Action::Comment(_) => "COMMENT",
        }
    }

    pub fn as_create_table(&self) -> Option<&CreateTableStmt> {
        match self {
            Action::CreateTable(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_alter_table(&self) -> Option<&AlterTableStmt> {
        match self {
            Action::AlterTable(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_create_index(&self) -> Option<&IndexSpec> {
        match self {
            Action::CreateIndex(stmt) => Some(stmt),
            _ => None,
        }
    }
}
