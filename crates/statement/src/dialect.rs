//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::ast::type_name::TypeName;
use model::core::data_type::DataType;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a resolved `DataType` into a database-specific SQL type string.
    fn render_data_type(&self, data_type: &DataType) -> String;

    /// Renders a type as written, for columns whose type is not resolved yet.
    fn render_type_name(&self, type_name: &TypeName) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn render_data_type(&self, data_type: &DataType) -> String {
        data_type.postgres_name().into_owned()
    }

    fn render_type_name(&self, type_name: &TypeName) -> String {
        match type_name.simple_name() {
            Some(name) if DataType::is_builtin_name(name) => {
                let resolved = DataType::from_name(name).with_typmods(&type_name.typmods);
                let mut out = self.render_data_type(&resolved);
                if resolved.supports_length()
                    && let Some(len) = type_name.typmods.first()
                {
                    out = format!("{out}({len})");
                }
                for _ in &type_name.array_bounds {
                    out.push_str("[]");
                }
                out
            }
            _ => type_name.to_string(),
        }
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }
}
