//! # Record Types
//!
//! A [`RecordType`] is an explicit descriptor table: a name, an
//! `object_type` tag, and an ordered [`AttributeSet`]. It replaces runtime
//! class fabrication; anything that needs to know the shape of a record
//! reads it through [`RecordType::export_schema`].
//!
//! ## The base record contract
//!
//! Every synthesized record extends [`CONTRACT_NAME`], which declares
//! exactly the fields `id`, `type` and `name`. Records built on the contract
//! may also carry the extension points `ref_metadata` and `subsystemData`;
//! those, like the contract fields, are never re-derived by the compiler.
//!
//! A [`ReferenceType`] is the record a `ref` / `ref_list` field points at:
//! the bare contract under the name `Ref{object_type}`, plus the service
//! URL derived from the linkage that first created it.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::field::{AttributeSet, FieldDescriptor, ResolvedField};
use crate::kind::{Kind, Primitive};
use crate::types::{TypeDescriptor, ValueType};

/// Name of the base record contract.
pub const CONTRACT_NAME: &str = "ObjectModel";

/// Name of the contract every reference type extends.
pub const REFERENCE_CONTRACT_NAME: &str = "ReferenceObjectModel";

/// Fields declared by the base record contract.
pub const CONTRACT_FIELDS: [&str; 3] = ["id", "type", "name"];

/// Inheritable extension points excluded from re-resolution.
pub const EXTENSION_FIELDS: [&str; 2] = ["ref_metadata", "subsystemData"];

/// Prefix of every reference type's record name.
pub const REFERENCE_CLASS_PREFIX: &str = "Ref";

/// The contract fields `id`, `type`, `name`: optional strings defaulting to `""`.
pub fn contract_fields() -> AttributeSet {
    [("id", "ID object"), ("type", "Type object"), ("name", "Name")]
        .into_iter()
        .map(|(name, description)| {
            ResolvedField::new(
                TypeDescriptor::optional(ValueType::Primitive(Primitive::String)),
                FieldDescriptor::new(name, Kind::Str)
                    .with_description(description)
                    .with_default(Primitive::String.zero_value()),
            )
        })
        .collect()
}

/// A record type described by its field table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordType {
    name: String,
    object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    type_object: String,
    fields: AttributeSet,
    #[serde(skip_serializing_if = "Map::is_empty")]
    params: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    combine: Map<String, Value>,
}

impl RecordType {
    /// Start a record with no base contract and no fields.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            record: Self {
                name: name.into(),
                object_type: String::new(),
                base: None,
                type_object: String::new(),
                fields: AttributeSet::new(),
                params: Map::new(),
                combine: Map::new(),
            },
        }
    }

    /// Start a record that extends the base contract.
    pub fn extending_contract(name: impl Into<String>) -> RecordTypeBuilder {
        let mut builder = Self::builder(name);
        builder.record.base = Some(CONTRACT_NAME.to_string());
        builder.record.fields = contract_fields();
        builder
    }

    /// The bare base contract itself.
    pub fn contract() -> Self {
        let mut record = Self::extending_contract(CONTRACT_NAME).build();
        record.base = None;
        record
    }

    /// Record name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `object_type` tag; empty on the bare contract.
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Name of the contract this record extends, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Type-object tag from the schema definition.
    pub fn type_object(&self) -> &str {
        &self.type_object
    }

    /// All fields, contract fields first.
    pub fn fields(&self) -> &AttributeSet {
        &self.fields
    }

    /// The field named `name`.
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.get(name)
    }

    /// Free-form parameters carried from the definition.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Default values of the combine fields.
    pub fn combine(&self) -> &Map<String, Value> {
        &self.combine
    }

    /// Every declared field with its type and metadata, in declaration order.
    pub fn export_schema(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter()
    }

    /// Reopen this record for further declarations.
    pub fn into_builder(self) -> RecordTypeBuilder {
        RecordTypeBuilder { record: self }
    }

    /// A JSON object holding each field's default value.
    pub fn default_instance(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name().to_string(), f.descriptor.default.clone()))
            .collect()
    }
}

/// Builder for [`RecordType`].
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    record: RecordType,
}

impl RecordTypeBuilder {
    /// Set the `object_type` tag.
    #[must_use]
    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.record.object_type = object_type.into();
        self
    }

    /// Set the base contract name.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.record.base = Some(base.into());
        self
    }

    /// Set the type-object tag.
    #[must_use]
    pub fn type_object(mut self, type_object: impl Into<String>) -> Self {
        self.record.type_object = type_object.into();
        self
    }

    /// Declare a field, replacing any earlier field of the same name.
    #[must_use]
    pub fn field(mut self, field: ResolvedField) -> Self {
        self.record.fields.upsert(field);
        self
    }

    /// Declare several fields in order; same-name fields replace in place.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = ResolvedField>) -> Self {
        self.record.fields.extend(fields);
        self
    }

    /// Set the parameters.
    #[must_use]
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.record.params = params;
        self
    }

    /// Set the combine defaults.
    #[must_use]
    pub fn combine(mut self, combine: Map<String, Value>) -> Self {
        self.record.combine = combine;
        self
    }

    /// Finish the record.
    pub fn build(self) -> RecordType {
        self.record
    }
}

/// A cached record type referenced by `ref` and `ref_list` fields.
#[derive(Debug, PartialEq, Serialize)]
pub struct ReferenceType {
    #[serde(flatten)]
    record: RecordType,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_url: Option<String>,
}

impl ReferenceType {
    /// Build the reference record for `object_type` (named `Ref{object_type}`).
    pub fn new(object_type: &str, service_url: Option<String>) -> Self {
        let record = RecordType::builder(format!("{REFERENCE_CLASS_PREFIX}{object_type}"))
            .base(REFERENCE_CONTRACT_NAME)
            .object_type(object_type)
            .fields(contract_fields())
            .build();
        Self {
            record,
            service_url,
        }
    }

    /// Record name, e.g. `RefDevice`.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    /// The referenced type name, e.g. `Device`.
    pub fn object_type(&self) -> &str {
        self.record.object_type()
    }

    /// `/{version}/{service}`, if the first linkage named a service.
    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    /// The underlying record type.
    pub fn record(&self) -> &RecordType {
        &self.record
    }
}
