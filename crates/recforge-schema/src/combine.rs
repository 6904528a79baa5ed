//! # Combine Resolver
//!
//! A combine definition is a flat set of `name → primitive` bindings whose
//! types are already concrete, so they skip kind-based resolution. The
//! resolver materializes them as a transient record type and reads back its
//! default instance.

use serde::Deserialize;
use serde_json::{Map, Value};

use recforge_core::{
    FieldDescriptor, Primitive, RecordType, ResolvedField, TypeDescriptor, ValueType,
};

use crate::definition::OrderedMap;

/// One combine binding: `extra: integer` or `extra: {type: integer, default: 5}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CombineField {
    Bare(Primitive),
    Typed {
        #[serde(rename = "type")]
        ty: Primitive,
        #[serde(default)]
        default: Option<Value>,
    },
}

impl CombineField {
    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Bare(p) | Self::Typed { ty: p, .. } => *p,
        }
    }

    /// The explicit default, or the primitive's zero value.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Typed {
                default: Some(value),
                ..
            } => value.clone(),
            other => other.primitive().zero_value(),
        }
    }
}

impl From<Primitive> for CombineField {
    fn from(p: Primitive) -> Self {
        Self::Bare(p)
    }
}

pub type CombineDefinition = OrderedMap<CombineField>;

/// Build the transient record type for a combine definition.
pub fn transient_type(meta_name: &str, definition: &CombineDefinition) -> RecordType {
    let fields = definition.iter().map(|(name, field)| {
        let primitive = field.primitive();
        ResolvedField::new(
            TypeDescriptor::required(ValueType::Primitive(primitive)),
            FieldDescriptor::new(name, primitive.kind()).with_default(field.default_value()),
        )
    });
    RecordType::builder(meta_name).fields(fields).build()
}

/// Default values of the combine fields; empty when there is no definition.
pub fn combine(meta_name: &str, definition: Option<&CombineDefinition>) -> Map<String, Value> {
    match definition {
        Some(definition) => transient_type(meta_name, definition).default_instance(),
        None => Map::new(),
    }
}
