//! # Field Descriptors and Attribute Sets
//!
//! A [`FieldDescriptor`] is the compilation metadata of one field. Paired
//! with its resolved [`TypeDescriptor`] it becomes a [`ResolvedField`], and
//! an ordered collection of those is an [`AttributeSet`], the shape every
//! record type is built from.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::kind::Kind;
use crate::types::{EnumType, TypeDescriptor};

/// Reference linkage carried by `ref` and `ref_list` fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Linkage {
    /// Name of the referenced record type (e.g. `Device`).
    pub reference_type_name: String,
    /// Opaque link attribute payload, passed through unchanged.
    pub link_attributes: Value,
    /// Opaque link payload, passed through unchanged.
    pub links: Value,
    /// Service part of the reference's URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Version part of the reference's URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
}

impl Linkage {
    /// Linkage to `reference_type_name` with null payloads and no service.
    pub fn new(reference_type_name: impl Into<String>) -> Self {
        Self {
            reference_type_name: reference_type_name.into(),
            ..Self::default()
        }
    }

    /// Set the service name and version.
    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self.service_version = Some(version.into());
        self
    }

    /// `/{service_version}/{service_name}`, when both parts are present and
    /// non-empty.
    pub fn service_url(&self) -> Option<String> {
        match (self.service_name.as_deref(), self.service_version.as_deref()) {
            (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
                Some(format!("/{version}/{name}"))
            }
            _ => None,
        }
    }
}

/// Compilation metadata for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared kind.
    pub kind: Kind,
    /// Human-readable text.
    pub description: String,
    /// Value a fresh instance starts with.
    pub default: Value,
    /// Hidden fields (`false`) never reach a synthesized record.
    pub show: bool,
    /// Reference linkage; present on `ref` and `ref_list` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage: Option<Linkage>,
    /// Enumeration type of an `enum` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<Arc<EnumType>>,
}

impl FieldDescriptor {
    /// A visible field with an empty description and a `null` default.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            default: Value::Null,
            show: true,
            linkage: None,
            enum_type: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Attach reference linkage.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = Some(linkage);
        self
    }

    /// Attach the enumeration type.
    #[must_use]
    pub fn with_enum(mut self, enum_type: Arc<EnumType>) -> Self {
        self.enum_type = Some(enum_type);
        self
    }

    /// Mark the field hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }
}

/// A field descriptor paired with its resolved type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    /// The resolved type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// The metadata the type was resolved from.
    #[serde(flatten)]
    pub descriptor: FieldDescriptor,
}

impl ResolvedField {
    /// Pair a type with its descriptor.
    pub fn new(ty: TypeDescriptor, descriptor: FieldDescriptor) -> Self {
        Self { ty, descriptor }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Insertion-ordered set of resolved fields, keyed by field name.
///
/// Upserting an existing name replaces the pair in place, so an override
/// keeps the position of the field it replaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    fields: Vec<ResolvedField>,
}

impl AttributeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The field named `name`.
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether a field named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert or replace, returning the replaced field.
    pub fn upsert(&mut self, field: ResolvedField) -> Option<ResolvedField> {
        match self.position(field.name()) {
            Some(idx) => Some(std::mem::replace(&mut self.fields[idx], field)),
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    /// Remove by name, keeping the order of the remaining fields.
    pub fn remove(&mut self, name: &str) -> Option<ResolvedField> {
        self.position(name).map(|idx| self.fields.remove(idx))
    }

    /// Keep only the fields matching `f`, in order.
    pub fn retain(&mut self, f: impl FnMut(&ResolvedField) -> bool) {
        self.fields.retain(f);
    }

    /// Fields in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedField> {
        self.fields.iter()
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(ResolvedField::name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}

impl FromIterator<ResolvedField> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = ResolvedField>>(iter: I) -> Self {
        let mut set = Self::new();
        for field in iter {
            set.upsert(field);
        }
        set
    }
}

impl Extend<ResolvedField> for AttributeSet {
    fn extend<I: IntoIterator<Item = ResolvedField>>(&mut self, iter: I) {
        for field in iter {
            self.upsert(field);
        }
    }
}

impl IntoIterator for AttributeSet {
    type Item = ResolvedField;
    type IntoIter = std::vec::IntoIter<ResolvedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a ResolvedField;
    type IntoIter = std::slice::Iter<'a, ResolvedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Primitive;
    use crate::types::ValueType;

    fn field(name: &str, p: Primitive) -> ResolvedField {
        ResolvedField::new(
            TypeDescriptor::optional(ValueType::Primitive(p)),
            FieldDescriptor::new(name, p.kind()).with_default(p.zero_value()),
        )
    }

    #[test]
    fn service_url_needs_both_parts() {
        let linkage = Linkage::new("Device").with_service("devices", "v1");
        assert_eq!(linkage.service_url().as_deref(), Some("/v1/devices"));

        let mut partial = Linkage::new("Device");
        partial.service_name = Some("devices".to_string());
        assert_eq!(partial.service_url(), None);

        let empty = Linkage::new("Device").with_service("", "v1");
        assert_eq!(empty.service_url(), None);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut set = AttributeSet::new();
        set.upsert(field("a", Primitive::String));
        set.upsert(field("b", Primitive::Integer));
        set.upsert(field("c", Primitive::Boolean));

        let replaced = set.upsert(field("b", Primitive::Mapping));
        assert_eq!(replaced.unwrap().descriptor.kind, Kind::Int);
        assert_eq!(set.names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(set.get("b").unwrap().descriptor.kind, Kind::Dict);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut set: AttributeSet = ["a", "b", "c", "d"]
            .into_iter()
            .map(|n| field(n, Primitive::String))
            .collect();
        assert!(set.remove("b").is_some());
        assert!(set.remove("missing").is_none());
        assert_eq!(set.names().collect::<Vec<_>>(), ["a", "c", "d"]);
    }
}
