//! Scalar expressions carried by defaults, checks, index keys and predicates.

use crate::ast::type_name::TypeName;
use model::core::{identifiers::QualifiedName, value::Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(Value),
    /// A column reference by name, as the parser produced it.
    ColumnRef(Vec<String>),
    /// A resolved reference to an attribute number of the owning relation.
    /// `0` references the whole row; negative numbers are system columns.
    Var { attno: i32 },
    FuncCall { name: Vec<String>, args: Vec<Expr> },
    BinaryOp {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    BoolExpr { op: BoolOp, args: Vec<Expr> },
    NullTest { arg: Box<Expr>, is_null: bool },
    TypeCast { arg: Box<Expr>, type_name: TypeName },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::ColumnRef(vec![name.into()])
    }

    pub fn var(attno: i32) -> Self {
        Expr::Var { attno }
    }

    pub fn binary(op: impl Into<String>, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `nextval('schema.seq'::regclass)`.
    pub fn nextval(sequence: &QualifiedName) -> Self {
        let literal = match &sequence.schema {
            Some(schema) => format!("{schema}.{}", sequence.name),
            None => sequence.name.clone(),
        };
        Expr::FuncCall {
            name: vec!["nextval".to_string()],
            args: vec![Expr::TypeCast {
                arg: Box::new(Expr::Const(Value::Text(literal))),
                type_name: TypeName::new("regclass"),
            }],
        }
    }

    /// The sequence a `nextval(...)` call advances, if this is one.
    pub fn nextval_target(&self) -> Option<QualifiedName> {
        let Expr::FuncCall { name, args } = self else {
            return None;
        };
        if name.last().map(String::as_str) != Some("nextval") {
            return None;
        }
        let literal = match args.as_slice() {
            [Expr::TypeCast { arg, .. }] => match arg.as_ref() {
                Expr::Const(Value::Text(s)) => s,
                _ => return None,
            },
            [Expr::Const(Value::Text(s))] => s,
            _ => return None,
        };
        Some(QualifiedName::parse(literal))
    }

    /// Rewrites attribute numbers through `attmap` (`attmap[old - 1] = new`).
    /// The returned flag is set when a whole-row reference was seen.
    pub fn map_attnos(&self, attmap: &[i32]) -> (Expr, bool) {
        let mut found_whole_row = false;
        let mapped = self.map_attnos_inner(attmap, &mut found_whole_row);
        (mapped, found_whole_row)
    }

    fn map_attnos_inner(&self, attmap: &[i32], found_whole_row: &mut bool) -> Expr {
        match self {
            Expr::Var { attno } if *attno > 0 => Expr::Var {
                attno: attmap
                    .get((*attno - 1) as usize)
                    .copied()
                    .unwrap_or(*attno),
            },
            Expr::Var { attno: 0 } => {
                *found_whole_row = true;
                self.clone()
            }
            Expr::Var { .. } | Expr::Const(_) | Expr::ColumnRef(_) => self.clone(),
            Expr::FuncCall { name, args } => Expr::FuncCall {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|a| a.map_attnos_inner(attmap, found_whole_row))
                    .collect(),
            },
            Expr::BinaryOp { op, left, right } => Expr::BinaryOp {
                op: op.clone(),
                left: Box::new(left.map_attnos_inner(attmap, found_whole_row)),
                right: Box::new(right.map_attnos_inner(attmap, found_whole_row)),
            },
            Expr::BoolExpr { op, args } => Expr::BoolExpr {
                op: *op,
                args: args
                    .iter()
                    .map(|a| a.map_attnos_inner(attmap, found_whole_row))
                    .collect(),
            },
            Expr::NullTest { arg, is_null } => Expr::NullTest {
                arg: Box::new(arg.map_attnos_inner(attmap, found_whole_row)),
                is_null: *is_null,
            },
            Expr::TypeCast { arg, type_name } => Expr::TypeCast {
                arg: Box::new(arg.map_attnos_inner(attmap, found_whole_row)),
                type_name: type_name.clone(),
            },
        }
    }

    /// Attribute numbers referenced anywhere in the expression.
    pub fn referenced_attnos(&self) -> Vec<i32> {
        let mut out = Vec::new();
        self.collect_attnos(&mut out);
        out
    }

    fn collect_attnos(&self, out: &mut Vec<i32>) {
        match self {
            Expr::Var { attno } => out.push(*attno),
            Expr::Const(_) | Expr::ColumnRef(_) => {}
            Expr::FuncCall { args, .. } | Expr::BoolExpr { args, .. } => {
                args.iter().for_each(|a| a.collect_attnos(out))
            }
            Expr::BinaryOp { left, right, .. } => {
                left.collect_attnos(out);
                right.collect_attnos(out);
            }
            Expr::NullTest { arg, .. } | Expr::TypeCast { arg, .. } => arg.collect_attnos(out),
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Const(value)
    }
}
