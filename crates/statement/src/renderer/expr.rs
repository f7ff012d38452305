use crate::{
    ast::expr::{BoolOp, Expr},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Const(value) => r.push(&value.to_string()),
            Expr::ColumnRef(names) => {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        r.sql.push('.');
                    }
                    r.render_ident(name);
                }
            }
            Expr::Var { attno } => {
                let name = usize::try_from(*attno - 1)
                    .ok()
                    .and_then(|idx| r.columns.get(idx).cloned());
                match name {
                    Some(name) => r.render_ident(&name),
                    None if *attno == 0 => r.push("ROW(*)"),
                    None => r.push(&format!("#{attno}")),
                }
            }
            Expr::FuncCall { name, args } => {
                r.push(&name.join("."));
                r.sql.push('(');
                r.render_list(args, ", ");
                r.sql.push(')');
            }
            Expr::BinaryOp { op, left, right } => {
                r.sql.push('(');
                left.render(r);
                r.push(&format!(" {op} "));
                right.render(r);
                r.sql.push(')');
            }
            Expr::BoolExpr { op: BoolOp::Not, args } => {
                r.push("NOT ");
                r.render_list(args, " ");
            }
            Expr::BoolExpr { op, args } => {
                let sep = if *op == BoolOp::And { " AND " } else { " OR " };
                r.sql.push('(');
                r.render_list(args, sep);
                r.sql.push(')');
            }
            Expr::NullTest { arg, is_null } => {
                r.sql.push('(');
                arg.render(r);
                r.push(if *is_null { " IS NULL)" } else { " IS NOT NULL)" });
            }
            Expr::TypeCast { arg, type_name } => {
                arg.render(r);
                r.push("::");
                r.push(&type_name.to_string());
            }
        }
    }
}
