//! # Type Descriptors
//!
//! A [`TypeDescriptor`] is the resolved type of one record field: a
//! concrete [`ValueType`] plus an `optional` flag. The compiler only ever
//! produces optional descriptors; required ones exist for combine fields,
//! whose types are concrete from the start.
//!
//! Reference and enumeration types are held behind `Arc` so that every
//! field referring to the same logical type points at one shared object.
//! Equality on [`ValueType::Reference`] is pointer identity, not structure.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::kind::{Kind, Primitive};
use crate::record::ReferenceType;

/// A named enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Type name, shown wherever the field's type is printed.
    pub name: String,
    /// Allowed values, in declaration order.
    #[serde(default)]
    pub variants: Vec<String>,
}

impl EnumType {
    /// An enumeration named `name` with the given variants.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// A concrete field type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// One of the five primitive types.
    Primitive(Primitive),
    /// A single instance of a cached reference type.
    #[serde(serialize_with = "serialize_reference")]
    Reference(Arc<ReferenceType>),
    /// An ordered sequence of the inner type.
    List(Box<ValueType>),
    /// A value of a shared enumeration type.
    Enum(Arc<EnumType>),
}

fn serialize_reference<S: Serializer>(
    reference: &Arc<ReferenceType>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(reference.object_type())
}

impl ValueType {
    /// The kind a field of this type reports when its schema is exported.
    ///
    /// Reference and enum types report their own type name; the inheritor
    /// overrides those using the field's linkage or enum metadata.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Primitive(p) => p.kind(),
            Self::List(_) => Kind::List,
            Self::Reference(r) => Kind::Other(r.name().to_string()),
            Self::Enum(e) => Kind::Other(e.name.clone()),
        }
    }

    /// Whether values of this type are ordered sequences.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Primitive(Primitive::Sequence))
    }

    /// The zero value used when no explicit default is declared.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Primitive(p) => p.zero_value(),
            Self::Reference(_) => Value::Object(Map::new()),
            Self::List(_) => Value::Array(Vec::new()),
            Self::Enum(e) => e
                .variants
                .first()
                .map_or(Value::Null, |v| Value::String(v.clone())),
        }
    }

    /// The reference type this value refers to, directly or as list items.
    pub fn reference(&self) -> Option<&Arc<ReferenceType>> {
        match self {
            Self::Reference(r) => Some(r),
            Self::List(inner) => inner.reference(),
            _ => None,
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::Reference(a), Self::Reference(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Reference(r) => f.write_str(r.name()),
            Self::List(inner) => write!(f, "List[{inner}]"),
            Self::Enum(e) => f.write_str(&e.name),
        }
    }
}

/// Resolved type of a record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    value: ValueType,
    optional: bool,
}

impl TypeDescriptor {
    /// A nullable field of the given type.
    pub fn optional(value: ValueType) -> Self {
        Self {
            value,
            optional: true,
        }
    }

    /// A non-nullable field of the given type.
    pub fn required(value: ValueType) -> Self {
        Self {
            value,
            optional: false,
        }
    }

    /// The underlying value type.
    pub fn value(&self) -> &ValueType {
        &self.value
    }

    /// Whether the field may be absent (`null`).
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Optional[{}]", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}
