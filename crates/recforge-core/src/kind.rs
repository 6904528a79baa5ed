//! # Attribute Kinds and Primitives
//!
//! [`Kind`] is the declared kind of a field as it appears in schema
//! metadata (`attrs_type`). [`Primitive`] is the concrete scalar or
//! container type a non-reference kind resolves to.
//!
//! Kinds are an open set: any string parses, and strings outside the fixed
//! vocabulary land in [`Kind::Other`]. The type resolver maps those to
//! [`Primitive::String`], while the default resolver rejects them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared kind of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    /// `str`
    Str,
    /// `int`
    Int,
    /// `dict`
    Dict,
    /// `list`
    List,
    /// `bool`
    Bool,
    /// `ref`: a single reference to another record type.
    Ref,
    /// `ref_list`: an ordered list of references.
    RefList,
    /// `enum`: a value of an attached enumeration type.
    Enum,
    /// Any kind name outside the fixed vocabulary.
    Other(String),
}

impl Kind {
    /// The metadata spelling of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Dict => "dict",
            Self::List => "list",
            Self::Bool => "bool",
            Self::Ref => "ref",
            Self::RefList => "ref_list",
            Self::Enum => "enum",
            Self::Other(name) => name,
        }
    }

    /// Whether this kind resolves through the reference cache.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Ref | Self::RefList)
    }

    /// The primitive this kind maps to, if it is one of the five table kinds.
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Str => Some(Primitive::String),
            Self::Int => Some(Primitive::Integer),
            Self::Dict => Some(Primitive::Mapping),
            Self::List => Some(Primitive::Sequence),
            Self::Bool => Some(Primitive::Boolean),
            _ => None,
        }
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        match s {
            "str" => Self::Str,
            "int" => Self::Int,
            "dict" => Self::Dict,
            "list" => Self::List,
            "bool" => Self::Bool,
            "ref" => Self::Ref,
            "ref_list" => Self::RefList,
            "enum" => Self::Enum,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Kind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete primitive value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// Text.
    #[serde(alias = "str")]
    String,
    /// Whole number.
    #[serde(alias = "int")]
    Integer,
    /// String-keyed object.
    #[serde(alias = "dict")]
    Mapping,
    /// Ordered list.
    #[serde(alias = "list")]
    Sequence,
    /// `true` or `false`.
    #[serde(alias = "bool")]
    Boolean,
}

impl Primitive {
    /// The zero value of this primitive: `""`, `0`, `{}`, `[]`, `false`.
    pub fn zero_value(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Integer => Value::from(0),
            Self::Mapping => Value::Object(Map::new()),
            Self::Sequence => Value::Array(Vec::new()),
            Self::Boolean => Value::Bool(false),
        }
    }

    /// The kind a field of this primitive type is declared with.
    pub fn kind(self) -> Kind {
        match self {
            Self::String => Kind::Str,
            Self::Integer => Kind::Int,
            Self::Mapping => Kind::Dict,
            Self::Sequence => Kind::List,
            Self::Boolean => Kind::Bool,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}
