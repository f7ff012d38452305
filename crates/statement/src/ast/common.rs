//! Names, persistence and generic `name = value` options shared by all statements.

use model::core::identifiers::QualifiedName;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Persistence {
    #[default]
    Permanent,
    Unlogged,
    Temp,
}

/// A reference to a relation as written in the statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RangeVar {
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub persistence: Persistence,
    #[serde(default)]
    pub location: Option<usize>,
}

impl RangeVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_temp(&self) -> bool {
        self.persistence == Persistence::Temp
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for RangeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// A generic option such as a storage parameter (`fillfactor = 70`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefElem {
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arg: Option<String>,
}

impl DefElem {
    pub fn new(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            arg: Some(arg.into()),
        }
    }

    /// Reads the argument as a boolean; a bare option counts as `true`.
    pub fn as_bool(&self) -> Option<bool> {
        match self.arg.as_deref().map(str::to_lowercase).as_deref() {
            None => Some(true),
            Some("true" | "on" | "yes" | "1") => Some(true),
            Some("false" | "off" | "no" | "0") => Some(false),
            Some(_) => None,
        }
    }
}

impl fmt::Display for DefElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}.")?;
        }
        match &self.arg {
            Some(arg) => write!(f, "{} = {}", self.name, arg),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Finds an option by name, ignoring case.
pub fn find_option<'a>(options: &'a [DefElem], name: &str) -> Option<&'a DefElem> {
    options.iter().find(|o| o.name.eq_ignore_ascii_case(name))
}
