use crate::ast::common::RangeVar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentTarget {
    Column { relation: RangeVar, column: String },
    Constraint { relation: RangeVar, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStmt {
    pub target: CommentTarget,
    pub comment: Option<String>,
}
