//! Defines the core rendering trait and context for converting statement
//! trees back to SQL text, used for logs and diagnostics.

use crate::{ast::common::RangeVar, dialect::Dialect};
use model::core::boundary::BoundaryValue;

pub mod action;
pub mod alter_table;
pub mod create_table;
pub mod expr;
pub mod index;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// Column names of the relation being rendered are kept so that resolved
/// attribute references inside expressions can be printed by name.
pub struct Renderer<'a> {
    pub sql: String,
    pub columns: Vec<String>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            columns: Vec::new(),
            dialect,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Consumes the renderer and returns the final SQL string.
    pub fn finish(self) -> String {
        self.sql
    }

    pub fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn render_ident(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    pub fn render_range_var(&mut self, rv: &RangeVar) {
        if let Some(schema) = &rv.schema {
            self.render_ident(schema);
            self.sql.push('.');
        }
        self.render_ident(&rv.name);
    }

    /// Renders `("a", "b")`.
    pub fn render_ident_list(&mut self, idents: &[String]) {
        let quoted: Vec<String> = idents
            .iter()
            .map(|i| self.dialect.quote_identifier(i))
            .collect();
        self.sql.push('(');
        self.sql.push_str(&quoted.join(", "));
        self.sql.push(')');
    }

    pub fn render_boundary(&mut self, values: &[BoundaryValue]) {
        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        self.sql.push('(');
        self.sql.push_str(&rendered.join(", "));
        self.sql.push(')');
    }

    /// Renders each item separated by `sep`.
    pub fn render_list<T: Render>(&mut self, items: &[T], sep: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            item.render(self);
        }
    }
}

/// Renders a single node with the Postgres dialect.
pub fn to_sql<T: Render>(node: &T) -> String {
    let dialect = crate::dialect::Postgres;
    let mut renderer = Renderer::new(&dialect);
    node.render(&mut renderer);
    renderer.finish()
}
