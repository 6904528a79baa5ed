//! # Schema Definitions
//!
//! The compilation input. A [`SchemaDefinition`] names the record to build
//! and lists its fields as raw metadata ([`RawFieldMeta`]), in declaration
//! order. Definitions deserialize from JSON or YAML text, or are built in
//! code.
//!
//! ## Field metadata keys
//!
//! | key | meaning |
//! |---|---|
//! | `description` | human-readable text |
//! | `attrs_type` | `str`, `int`, `dict`, `list`, `bool`, `ref`, `ref_list`, `enum` |
//! | `default` | explicit default (used for `enum` fields) |
//! | `show_flag` | `false` removes the field (default `true`) |
//! | `type_object` | reference-type name |
//! | `attrs`, `links` | opaque linkage payload |
//! | `type_service`, `service_version` | service URL parts |
//! | `enum_cls` | `{name, variants}` enumeration type |
//!
//! For reference fields `attrs`, `links`, `type_service` and
//! `service_version` must be present, though any of them may be `null`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use recforge_core::{CompileError, EnumType, Kind, Linkage};

use crate::combine::CombineDefinition;

/// A name-keyed list that keeps declaration order, duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), value));
    }

    /// The last entry declared under `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
            type Value = OrderedMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by field name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    entries.push(entry);
                }
                Ok(OrderedMap { entries })
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

// Distinguishes an absent key (`None`) from an explicit `null` (`Some(..)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

const fn visible() -> bool {
    true
}

/// Raw metadata of one declared field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFieldMeta {
    #[serde(default)]
    pub description: String,
    pub attrs_type: Kind,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default = "visible")]
    pub show_flag: bool,
    #[serde(default)]
    pub type_object: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub attrs: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub links: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub type_service: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub service_version: Option<Option<String>>,
    #[serde(default)]
    pub enum_cls: Option<Arc<EnumType>>,
}

impl RawFieldMeta {
    pub fn new(kind: impl Into<Kind>) -> Self {
        Self {
            description: String::new(),
            attrs_type: kind.into(),
            default: None,
            show_flag: true,
            type_object: None,
            attrs: None,
            links: None,
            type_service: None,
            service_version: None,
            enum_cls: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.show_flag = false;
        self
    }

    /// Point the field at `type_object`, declaring every linkage key
    /// (service parts start out `null`).
    #[must_use]
    pub fn with_reference(
        mut self,
        type_object: impl Into<String>,
        attrs: Value,
        links: Value,
    ) -> Self {
        self.type_object = Some(type_object.into());
        self.attrs = Some(attrs);
        self.links = Some(links);
        self.type_service.get_or_insert(None);
        self.service_version.get_or_insert(None);
        self
    }

    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.type_service = Some(Some(name.into()));
        self.service_version = Some(Some(version.into()));
        self
    }

    #[must_use]
    pub fn with_enum(mut self, enum_type: Arc<EnumType>) -> Self {
        self.enum_cls = Some(enum_type);
        self
    }

    /// The declared `type_object`, or `""`.
    pub fn type_object(&self) -> &str {
        self.type_object.as_deref().unwrap_or("")
    }

    /// Collect the linkage of a reference field named `field`.
    pub fn linkage(&self, field: &str) -> Result<Linkage, CompileError> {
        let missing = |key| CompileError::MissingLinkage {
            field: field.to_string(),
            key,
        };
        let link_attributes = self.attrs.clone().ok_or_else(|| missing("attrs"))?;
        let links = self.links.clone().ok_or_else(|| missing("links"))?;
        let service_name = self
            .type_service
            .clone()
            .ok_or_else(|| missing("type_service"))?;
        let service_version = self
            .service_version
            .clone()
            .ok_or_else(|| missing("service_version"))?;

        Ok(Linkage {
            reference_type_name: self.type_object().to_string(),
            link_attributes,
            links,
            service_name,
            service_version,
        })
    }
}

/// Input to a schema compilation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaDefinition {
    pub meta_name: String,
    /// Type-object tag carried onto the synthesized record.
    #[serde(default)]
    pub type_object: String,
    #[serde(default)]
    pub fields: OrderedMap<RawFieldMeta>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub combine: Option<CombineDefinition>,
}

impl SchemaDefinition {
    pub fn new(meta_name: impl Into<String>) -> Self {
        Self {
            meta_name: meta_name.into(),
            type_object: String::new(),
            fields: OrderedMap::new(),
            params: Map::new(),
            combine: None,
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, meta: RawFieldMeta) -> Self {
        self.fields.push(name, meta);
        self
    }

    #[must_use]
    pub fn with_type_object(mut self, type_object: impl Into<String>) -> Self {
        self.type_object = type_object.into();
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_combine(mut self, combine: CombineDefinition) -> Self {
        self.combine = Some(combine);
        self
    }

    pub fn from_value(value: Value) -> Result<Self, CompileError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CompileError> {
        serde_yaml::from_str(text).map_err(|e| CompileError::Parse {
            format: "yaml",
            reason: e.to_string(),
        })
    }
}
