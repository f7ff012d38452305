use serde::{Deserialize, Serialize};
use std::fmt;

/// A type reference as written: `int4`, `numeric(10,2)`, `text[]`, `pg_catalog.int8`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeName {
    pub names: Vec<String>,
    #[serde(default)]
    pub typmods: Vec<i64>,
    #[serde(default)]
    pub array_bounds: Vec<i32>,
    /// `%TYPE` reference to another column's type.
    #[serde(default)]
    pub pct_type: bool,
    #[serde(default)]
    pub location: Option<usize>,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            names: vec![schema.into(), name.into()],
            ..Default::default()
        }
    }

    pub fn with_typmods(mut self, typmods: &[i64]) -> Self {
        self.typmods = typmods.to_vec();
        self
    }

    pub fn array(mut self) -> Self {
        self.array_bounds.push(-1);
        self
    }

    pub fn is_array(&self) -> bool {
        !self.array_bounds.is_empty()
    }

    /// The single unqualified name, if the reference is that simple.
    pub fn simple_name(&self) -> Option<&str> {
        match self.names.as_slice() {
            [name] if !self.pct_type => Some(name),
            _ => None,
        }
    }

    pub fn last_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join("."))?;
        if !self.typmods.is_empty() {
            let mods: Vec<String> = self.typmods.iter().map(i64::to_string).collect();
            write!(f, "({})", mods.join(","))?;
        }
        if self.pct_type {
            write!(f, "%TYPE")?;
        }
        for _ in &self.array_bounds {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
