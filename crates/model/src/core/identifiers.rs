use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest identifier the catalog stores, in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// A possibly schema-qualified object name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Parses `schema.name` or `name`. Double quotes around either part are removed.
    pub fn parse(text: &str) -> Self {
        match split_qualified(text) {
            (Some(schema), name) => Self::qualified(schema, name),
            (None, name) => Self::new(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", quote_identifier(schema), quote_identifier(&self.name)),
            None => write!(f, "{}", quote_identifier(&self.name)),
        }
    }
}

fn split_qualified(text: &str) -> (Option<String>, String) {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in text.chars() {
        match ch {
            '"' => quoted = !quoted,
            '.' if !quoted => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    if parts.len() >= 2 {
        let name = parts.pop().unwrap_or_default();
        (parts.pop(), name)
    } else {
        (None, parts.pop().unwrap_or_default())
    }
}

/// Quotes an identifier only when it would not survive case folding unquoted.
pub fn quote_identifier(ident: &str) -> String {
    let plain = ident
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Clips `name` to at most `max_bytes`, never splitting a multi-byte character.
pub fn truncate_identifier(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Builds `name1_name2_label`, shortening the longer of the two name parts
/// first until the whole fits into `max_bytes`.
pub fn make_object_name(name1: &str, name2: Option<&str>, label: Option<&str>, max_bytes: usize) -> String {
    let mut len1 = name1.len();
    let mut len2 = name2.map_or(0, str::len);
    let overhead = name2.map_or(0, |_| 1) + label.map_or(0, |l| l.len() + 1);

    while len1 + len2 + overhead > max_bytes {
        if len1 > len2 {
            len1 -= 1;
        } else if len2 > 0 {
            len2 -= 1;
        } else {
            break;
        }
    }

    let mut out = truncate_identifier(name1, len1).to_string();
    if let Some(n2) = name2 {
        out.push('_');
        out.push_str(truncate_identifier(n2, len2));
    }
    if let Some(l) = label {
        out.push('_');
        out.push_str(l);
    }
    out
}
