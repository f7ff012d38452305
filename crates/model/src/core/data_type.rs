use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

/// Precision and scale of a `numeric(p, s)` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NumericTypmod {
    pub precision: u32,
    pub scale: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Int2,
    Int4,
    Int8,
    Numeric(Option<NumericTypmod>),
    Float4,
    Float8,
    Date,
    Timestamp,
    TimestampTz,
    Interval,
    Bool,
    Text,
    VarChar,
    Char,
    Name,
    RegClass,
    Custom(String),
}

lazy_static! {
    static ref TYPE_NAME_MAP: HashMap<&'static str, DataType> = build_type_name_map();
}

impl DataType {
    /// Resolves a (possibly aliased) SQL type name. Unknown names become `Custom`.
    pub fn from_name(type_name: &str) -> Self {
        let normalized = Self::normalize_type_name(type_name);
        TYPE_NAME_MAP
            .get(normalized.as_str())
            .cloned()
            .unwrap_or_else(|| DataType::Custom(type_name.trim().to_string()))
    }

    /// Returns `true` when the name maps onto one of the built-in types.
    pub fn is_builtin_name(type_name: &str) -> bool {
        TYPE_NAME_MAP.contains_key(Self::normalize_type_name(type_name).as_str())
    }

    /// Applies `(precision, scale)` type modifiers. Only `numeric` takes them.
    pub fn with_typmods(self, typmods: &[i64]) -> Self {
        match (self, typmods) {
            (DataType::Numeric(_), [precision]) => DataType::Numeric(Some(NumericTypmod {
                precision: *precision as u32,
                scale: 0,
            })),
            (DataType::Numeric(_), [precision, scale, ..]) => DataType::Numeric(Some(NumericTypmod {
                precision: *precision as u32,
                scale: *scale as u32,
            })),
            (other, _) => other,
        }
    }

    /// Canonical catalog name of the type.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            DataType::Int2 => Cow::Borrowed("int2"),
            DataType::Int4 => Cow::Borrowed("int4"),
            DataType::Int8 => Cow::Borrowed("int8"),
            DataType::Numeric(None) => Cow::Borrowed("numeric"),
            DataType::Numeric(Some(m)) => Cow::Owned(format!("numeric({},{})", m.precision, m.scale)),
            DataType::Float4 => Cow::Borrowed("float4"),
            DataType::Float8 => Cow::Borrowed("float8"),
            DataType::Date => Cow::Borrowed("date"),
            DataType::Timestamp => Cow::Borrowed("timestamp"),
            DataType::TimestampTz => Cow::Borrowed("timestamptz"),
            DataType::Interval => Cow::Borrowed("interval"),
            DataType::Bool => Cow::Borrowed("bool"),
            DataType::Text => Cow::Borrowed("text"),
            DataType::VarChar => Cow::Borrowed("varchar"),
            DataType::Char => Cow::Borrowed("bpchar"),
            DataType::Name => Cow::Borrowed("name"),
            DataType::RegClass => Cow::Borrowed("regclass"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    /// The SQL spelling used when rendering DDL.
    pub fn postgres_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Int2 => Cow::Borrowed("SMALLINT"),
            DataType::Int4 => Cow::Borrowed("INTEGER"),
            DataType::Int8 => Cow::Borrowed("BIGINT"),
            DataType::Numeric(None) => Cow::Borrowed("NUMERIC"),
            DataType::Numeric(Some(m)) => Cow::Owned(format!("NUMERIC({},{})", m.precision, m.scale)),
            DataType::Float4 => Cow::Borrowed("REAL"),
            DataType::Float8 => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::TimestampTz => Cow::Borrowed("TIMESTAMP WITH TIME ZONE"),
            DataType::Interval => Cow::Borrowed("INTERVAL"),
            DataType::Bool => Cow::Borrowed("BOOLEAN"),
            DataType::Text => Cow::Borrowed("TEXT"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::Name => Cow::Borrowed("NAME"),
            DataType::RegClass => Cow::Borrowed("REGCLASS"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int2 | DataType::Int4 | DataType::Int8)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float4 | DataType::Float8)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Numeric(_))
    }

    /// Date and timestamp types; their ranges are stepped with an interval.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::Timestamp | DataType::TimestampTz
        )
    }

    /// Only character types accept a COLLATE clause.
    pub fn is_collatable(&self) -> bool {
        matches!(
            self,
            DataType::Text | DataType::VarChar | DataType::Char | DataType::Name
        )
    }

    pub fn supports_length(&self) -> bool {
        matches!(self, DataType::VarChar | DataType::Char)
    }

    fn normalize_type_name(type_name: &str) -> String {
        type_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn build_type_name_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("int2", Int2),
        ("smallint", Int2),
        ("int4", Int4),
        ("int", Int4),
        ("integer", Int4),
        ("int8", Int8),
        ("bigint", Int8),
        ("numeric", Numeric(None)),
        ("decimal", Numeric(None)),
        ("float4", Float4),
        ("real", Float4),
        ("float8", Float8),
        ("double precision", Float8),
        ("date", Date),
        ("timestamp", Timestamp),
        ("timestamp without time zone", Timestamp),
        ("timestamptz", TimestampTz),
        ("timestamp with time zone", TimestampTz),
        ("interval", Interval),
        ("bool", Bool),
        ("boolean", Bool),
        ("text", Text),
        ("varchar", VarChar),
        ("character varying", VarChar),
        ("bpchar", Char),
        ("char", Char),
        ("character", Char),
        ("name", Name),
        ("regclass", RegClass),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_canonical_types() {
        assert_eq!(DataType::from_name("INTEGER"), DataType::Int4);
        assert_eq!(DataType::from_name("double   precision"), DataType::Float8);
        assert_eq!(
            DataType::from_name("timestamp with time zone"),
            DataType::TimestampTz
        );
        assert_eq!(
            DataType::from_name("geometry"),
            DataType::Custom("geometry".to_string())
        );
    }

    #[test]
    fn test_numeric_typmods() {
        let ty = DataType::from_name("numeric").with_typmods(&[10, 2]);
        assert_eq!(ty.name(), "numeric(10,2)");
        assert_eq!(DataType::Int4.with_typmods(&[10]), DataType::Int4);
    }
}
