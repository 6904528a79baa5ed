//! # Schema Compiler
//!
//! Orchestrates one compilation:
//!
//! 1. inherit the standard attributes of the base record type;
//! 2. walk the declared fields in order: a hidden field that shadows an
//!    inherited one removes it; every other field is described, resolved
//!    and upserted (an explicit field replaces an inherited one of the same
//!    name), hidden or not;
//! 3. drop any attribute marked hidden;
//! 4. synthesize the record and attach params, type-object tag and combine
//!    defaults.
//!
//! A compiler owns its [`ReferenceUrlTable`]; the reference cache it uses is
//! shared (the process-wide one unless another is supplied).

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use recforge_core::{CompileError, FieldDescriptor, Kind, RecordType, ResolvedField};

use crate::cache::ReferenceCache;
use crate::combine::combine;
use crate::config::CompilerConfig;
use crate::defaults::default_for;
use crate::definition::{RawFieldMeta, SchemaDefinition};
use crate::inherit::inherit_from;
use crate::resolve::{AttributeResolver, ReferenceUrlTable};
use crate::synth::synthesize;

/// Result of [`compile`]: the synthesized record and its reference URLs.
#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub record: RecordType,
    pub reference_urls: ReferenceUrlTable,
}

/// Compile `definition` against `base` using the process-wide cache and the
/// default configuration.
pub fn compile(
    definition: SchemaDefinition,
    base: &RecordType,
) -> Result<Compilation, CompileError> {
    let mut compiler = SchemaCompiler::new(definition);
    let record = compiler.compile(base)?;
    Ok(Compilation {
        record,
        reference_urls: compiler.reference_urls().clone(),
    })
}

/// Compiles one schema definition into a record type.
#[derive(Debug)]
pub struct SchemaCompiler {
    definition: SchemaDefinition,
    config: CompilerConfig,
    resolver: AttributeResolver,
}

impl SchemaCompiler {
    /// A compiler backed by [`ReferenceCache::global`].
    pub fn new(definition: SchemaDefinition) -> Self {
        Self::with_cache(definition, ReferenceCache::global())
    }

    pub fn with_cache(definition: SchemaDefinition, cache: ReferenceCache) -> Self {
        let config = CompilerConfig::default();
        let resolver = AttributeResolver::new(cache, config.collision_policy);
        Self {
            definition,
            config,
            resolver,
        }
    }

    #[must_use]
    pub fn with_config(self, config: CompilerConfig) -> Self {
        let cache = self.resolver.cache().clone();
        let resolver = AttributeResolver::new(cache, config.collision_policy);
        Self {
            definition: self.definition,
            config,
            resolver,
        }
    }

    /// Service URLs of every reference type resolved so far.
    pub fn reference_urls(&self) -> &ReferenceUrlTable {
        self.resolver.reference_urls()
    }

    /// Default values of the definition's combine schema.
    pub fn combine(&self) -> Map<String, Value> {
        combine(&self.definition.meta_name, self.definition.combine.as_ref())
    }

    /// Build the record type for this definition on top of `base`.
    pub fn compile(&mut self, base: &RecordType) -> Result<RecordType, CompileError> {
        let meta_name = self.definition.meta_name.as_str();
        tracing::debug!(
            meta_name,
            base = base.name(),
            fields = self.definition.fields.len(),
            "compiling schema"
        );

        let mut attrs = inherit_from(base, &self.config, &mut self.resolver)?;

        for (name, raw) in self.definition.fields.iter() {
            if self.config.is_reserved(name) {
                tracing::debug!(field = name, "skipping reserved field");
                continue;
            }
            if !raw.show_flag && attrs.remove(name).is_some() {
                tracing::debug!(field = name, "removed hidden inherited field");
                continue;
            }

            let mut descriptor = describe_field(name, raw, &self.config)?;
            descriptor.show = raw.show_flag;
            let ty = self.resolver.resolve_type(&descriptor)?;
            if let Some(replaced) = attrs.upsert(ResolvedField::new(ty, descriptor)) {
                tracing::trace!(field = name, inherited = %replaced.ty, "overrode inherited field");
            }
        }

        attrs.retain(|field| {
            if !field.descriptor.show {
                tracing::debug!(field = field.name(), "dropped hidden field");
            }
            field.descriptor.show
        });

        let record = synthesize(meta_name, attrs, self.resolver.cache())?
            .into_builder()
            .type_object(self.definition.type_object.clone())
            .params(self.definition.params.clone())
            .combine(self.combine())
            .build();

        tracing::debug!(
            meta_name,
            fields = record.fields().len(),
            references = self.resolver.reference_urls().len(),
            "compiled schema"
        );
        Ok(record)
    }
}

// Build the descriptor of an explicitly declared field.
fn describe_field(
    name: &str,
    raw: &RawFieldMeta,
    config: &CompilerConfig,
) -> Result<FieldDescriptor, CompileError> {
    // Enums have no table default; the declared default (or null) stands in.
    let default = match &raw.attrs_type {
        Kind::Enum => raw.default.clone().unwrap_or(Value::Null),
        kind => default_for(kind)?,
    };

    let mut descriptor = FieldDescriptor::new(name, raw.attrs_type.clone())
        .with_description(raw.description.clone())
        .with_default(default);

    if config.has_reference_prefix(name) || !raw.type_object().is_empty() {
        descriptor.linkage = Some(raw.linkage(name)?);
    }
    if let Some(enum_type) = &raw.enum_cls {
        descriptor.enum_type = Some(Arc::clone(enum_type));
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recforge_core::{EnumType, Linkage, Primitive, TypeDescriptor, ValueType};
    use serde_json::json;

    fn compiler(definition: SchemaDefinition) -> SchemaCompiler {
        SchemaCompiler::with_cache(definition, ReferenceCache::new())
    }

    fn base_with(fields: impl IntoIterator<Item = ResolvedField>) -> RecordType {
        RecordType::extending_contract("Base").fields(fields).build()
    }

    fn primitive(name: &str, p: Primitive) -> ResolvedField {
        ResolvedField::new(
            TypeDescriptor::optional(ValueType::Primitive(p)),
            FieldDescriptor::new(name, p.kind()).with_default(p.zero_value()),
        )
    }

    #[test]
    fn describe_field_uses_table_defaults() {
        let raw = RawFieldMeta::new(Kind::Int).with_description("reading");
        let d = describe_field("value", &raw, &CompilerConfig::default()).unwrap();
        assert_eq!(d.default, json!(0));
        assert_eq!(d.description, "reading");
        assert!(d.linkage.is_none());
    }

    #[test]
    fn describe_field_ignores_explicit_default_for_table_kinds() {
        let raw = RawFieldMeta::new(Kind::Str).with_default(json!("preset"));
        let d = describe_field("label", &raw, &CompilerConfig::default()).unwrap();
        assert_eq!(d.default, json!(""));
    }

    #[test]
    fn reference_prefix_requires_linkage_keys() {
        let raw = RawFieldMeta::new(Kind::Str);
        let err = describe_field("ref_parent", &raw, &CompilerConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingLinkage {
                field: "ref_parent".to_string(),
                key: "attrs"
            }
        );
    }

    #[test]
    fn unknown_kind_fails_compilation() {
        let def = SchemaDefinition::new("Sensor").field("x", RawFieldMeta::new("decimal"));
        let err = compiler(def).compile(&RecordType::contract()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownKind {
                kind: "decimal".to_string()
            }
        );
    }

    #[test]
    fn explicit_field_overrides_inherited_pair() {
        let base = base_with([primitive("value", Primitive::String)]);
        let def = SchemaDefinition::new("Sensor").field(
            "value",
            RawFieldMeta::new(Kind::Ref).with_reference("Device", json!([]), json!([])),
        );
        let record = compiler(def).compile(&base).unwrap();
        let value = record.field("value").unwrap();
        assert_eq!(value.descriptor.kind, Kind::Ref);
        assert_eq!(value.descriptor.default, json!({}));
        assert_eq!(value.ty.to_string(), "Optional[RefDevice]");
        assert_eq!(
            value.descriptor.linkage.as_ref().map(|l| l.reference_type_name.as_str()),
            Some("Device")
        );
    }

    #[test]
    fn hidden_explicit_field_removes_inherited_one() {
        let base = base_with([
            primitive("label", Primitive::String),
            primitive("notes", Primitive::String),
        ]);
        let def = SchemaDefinition::new("Sensor")
            .field("label", RawFieldMeta::new(Kind::Str).hidden())
            .field("secret", RawFieldMeta::new(Kind::Str).hidden());
        let record = compiler(def).compile(&base).unwrap();
        assert_eq!(
            record.fields().names().collect::<Vec<_>>(),
            ["id", "type", "name", "notes"]
        );
    }

    #[test]
    fn hidden_new_fields_are_still_validated() {
        let def = SchemaDefinition::new("Sensor").field("x", RawFieldMeta::new("decimal").hidden());
        let err = compiler(def).compile(&RecordType::contract()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownKind {
                kind: "decimal".to_string()
            }
        );

        let def = SchemaDefinition::new("Sensor").field(
            "ref_owner",
            RawFieldMeta::new(Kind::Ref).hidden(),
        );
        let err = compiler(def).compile(&RecordType::contract()).unwrap_err();
        assert!(matches!(err, CompileError::MissingLinkage { key: "attrs", .. }));
    }

    #[test]
    fn hidden_reference_field_still_registers_its_url() {
        let cache = ReferenceCache::new();
        let def = SchemaDefinition::new("Sensor").field(
            "owner",
            RawFieldMeta::new(Kind::Ref)
                .with_reference("Device", json!([]), json!([]))
                .with_service("devices", "v1")
                .hidden(),
        );
        let mut compiler = SchemaCompiler::with_cache(def, cache.clone());
        let record = compiler.compile(&RecordType::contract()).unwrap();

        assert!(record.field("owner").is_none());
        assert_eq!(compiler.reference_urls().get("Device"), Some("/v1/devices"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn hidden_base_fields_are_dropped() {
        let mut archived = primitive("archived", Primitive::Boolean);
        archived.descriptor.show = false;
        let base = base_with([archived, primitive("label", Primitive::String)]);
        let record = compiler(SchemaDefinition::new("Sensor")).compile(&base).unwrap();
        assert!(record.field("archived").is_none());
        assert!(record.field("label").is_some());
    }

    #[test]
    fn reserved_names_are_never_redeclared() {
        let def = SchemaDefinition::new("Sensor")
            .field("id", RawFieldMeta::new(Kind::Int))
            .field("subsystemData", RawFieldMeta::new(Kind::Dict));
        let record = compiler(def).compile(&RecordType::contract()).unwrap();
        assert_eq!(record.field("id").unwrap().descriptor.kind, Kind::Str);
        assert!(record.field("subsystemData").is_none());
    }

    #[test]
    fn enum_fields_take_declared_default() {
        let status = Arc::new(EnumType::new("Status", ["open", "closed"]));
        let def = SchemaDefinition::new("Ticket")
            .field(
                "status",
                RawFieldMeta::new(Kind::Enum)
                    .with_enum(Arc::clone(&status))
                    .with_default(json!("open")),
            )
            .field("phase", RawFieldMeta::new(Kind::Enum).with_enum(status));
        let record = compiler(def).compile(&RecordType::contract()).unwrap();
        assert_eq!(record.field("status").unwrap().descriptor.default, json!("open"));
        assert_eq!(record.field("phase").unwrap().descriptor.default, Value::Null);
        assert_eq!(record.field("phase").unwrap().ty.to_string(), "Optional[Status]");
    }

    #[test]
    fn enum_without_type_aborts_compilation() {
        let def = SchemaDefinition::new("Ticket").field("status", RawFieldMeta::new(Kind::Enum));
        let err = compiler(def).compile(&RecordType::contract()).unwrap_err();
        assert!(matches!(err, CompileError::Configuration { .. }));
    }

    #[test]
    fn record_carries_params_tag_and_combine() {
        let mut params = Map::new();
        params.insert("team".to_string(), json!("ops"));
        let def = SchemaDefinition::from_value(json!({
            "meta_name": "Job",
            "type_object": "job",
            "combine": {"extra": "integer"}
        }))
        .unwrap()
        .with_params(params);

        let record = compiler(def).compile(&RecordType::contract()).unwrap();
        assert_eq!(record.type_object(), "job");
        assert_eq!(record.params()["team"], json!("ops"));
        assert_eq!(Value::Object(record.combine().clone()), json!({"extra": 0}));
    }

    #[test]
    fn with_config_applies_collision_policy() {
        let cache = ReferenceCache::new();
        cache
            .resolve(
                "Device",
                Some(&Linkage::new("Device").with_service("devices", "v1")),
            )
            .unwrap();
        let def = SchemaDefinition::new("Sensor").field(
            "owner",
            RawFieldMeta::new(Kind::Ref)
                .with_reference("Device", json!([]), json!([]))
                .with_service("devices", "v2"),
        );
        let config = CompilerConfig::from_yaml_str("collision_policy: reject").unwrap();
        let err = SchemaCompiler::with_cache(def, cache)
            .with_config(config)
            .compile(&RecordType::contract())
            .unwrap_err();
        assert!(matches!(err, CompileError::NameCollision { .. }));
    }
}
