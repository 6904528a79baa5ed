//! # Standard Attribute Inheritor
//!
//! Re-derives compile-time descriptors for the fields an existing record
//! type already declares, so a new schema can extend it without repeating
//! unchanged fields. Reserved names are skipped; they always come from the
//! base record contract.

use serde_json::Value;

use recforge_core::{
    AttributeSet, CompileError, FieldDescriptor, Kind, RecordType, ResolvedField, ValueType,
};

use crate::config::CompilerConfig;
use crate::resolve::AttributeResolver;

/// Rebuild the descriptor of an exported field.
///
/// The kind is taken from the declared type, then overridden: fields with
/// linkage become `ref_list` (sequence type or array default) or `ref`;
/// enumeration-typed fields become `enum` with their enum type attached.
pub fn derive_descriptor(field: &ResolvedField) -> FieldDescriptor {
    let source = &field.descriptor;
    let declared = field.ty.value();

    let mut descriptor = FieldDescriptor::new(source.name.clone(), declared.kind())
        .with_description(source.description.clone())
        .with_default(source.default.clone());
    descriptor.show = source.show;

    if let Some(linkage) = &source.linkage {
        descriptor.kind = if declared.is_sequence() || matches!(source.default, Value::Array(_)) {
            Kind::RefList
        } else {
            Kind::Ref
        };
        descriptor.linkage = Some(linkage.clone());
    } else if let ValueType::Enum(enum_type) = declared {
        descriptor.kind = Kind::Enum;
        descriptor.enum_type = Some(enum_type.clone());
    }

    descriptor
}

/// Resolve every non-reserved field of `base` into a fresh attribute set.
pub fn inherit_from(
    base: &RecordType,
    config: &CompilerConfig,
    resolver: &mut AttributeResolver,
) -> Result<AttributeSet, CompileError> {
    let mut attrs = AttributeSet::new();
    for field in base.export_schema() {
        if config.is_reserved(field.name()) {
            continue;
        }
        let descriptor = derive_descriptor(field);
        let ty = resolver.resolve_type(&descriptor)?;
        attrs.upsert(ResolvedField::new(ty, descriptor));
    }
    tracing::debug!(base = base.name(), inherited = attrs.len(), "inherited standard attributes");
    Ok(attrs)
}
