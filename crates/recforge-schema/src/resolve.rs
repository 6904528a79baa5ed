//! # Attribute Type Resolver
//!
//! Turns a [`FieldDescriptor`] into the [`TypeDescriptor`] of its field.
//! Every result is optional. Reference kinds go through the
//! [`ReferenceCache`], so `ref` and `ref_list` fields naming the same
//! reference type share one `Arc<ReferenceType>`.
//!
//! The resolver also owns the per-compilation [`ReferenceUrlTable`]. A
//! reference field whose linkage names a service and version records the
//! URL of the entry it resolves to, whether that entry was created by this
//! call or found cached (the cached URL wins).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use recforge_core::{
    CompileError, FieldDescriptor, Kind, Linkage, Primitive, ReferenceType, TypeDescriptor,
    ValueType,
};

use crate::cache::ReferenceCache;
use crate::config::CollisionPolicy;

/// Per-compilation map from reference-type name to service URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceUrlTable {
    urls: BTreeMap<String, String>,
}

impl ReferenceUrlTable {
    pub fn get(&self, reference_type_name: &str) -> Option<&str> {
        self.urls.get(reference_type_name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn record(&mut self, reference_type_name: &str, url: &str) {
        self.urls
            .insert(reference_type_name.to_string(), url.to_string());
    }
}

/// Primitive for a non-reference, non-enum kind; unknown kinds fall back to
/// [`Primitive::String`].
pub fn primitive_for(kind: &Kind) -> Primitive {
    kind.primitive().unwrap_or(Primitive::String)
}

/// Resolves field descriptors to type descriptors.
#[derive(Debug)]
pub struct AttributeResolver {
    cache: ReferenceCache,
    policy: CollisionPolicy,
    urls: ReferenceUrlTable,
}

impl AttributeResolver {
    pub fn new(cache: ReferenceCache, policy: CollisionPolicy) -> Self {
        Self {
            cache,
            policy,
            urls: ReferenceUrlTable::default(),
        }
    }

    /// Resolve the (optional) type of a field.
    ///
    /// The descriptor is only read, so resolving it again yields an equal
    /// descriptor.
    pub fn resolve_type(
        &mut self,
        descriptor: &FieldDescriptor,
    ) -> Result<TypeDescriptor, CompileError> {
        let value = match &descriptor.kind {
            Kind::Ref => ValueType::Reference(self.reference(descriptor)?),
            Kind::RefList => {
                ValueType::List(Box::new(ValueType::Reference(self.reference(descriptor)?)))
            }
            Kind::Enum => {
                let enum_type = descriptor.enum_type.as_ref().ok_or_else(|| {
                    CompileError::configuration(
                        &descriptor.name,
                        "kind 'enum' requires an enumeration type",
                    )
                })?;
                ValueType::Enum(Arc::clone(enum_type))
            }
            other => ValueType::Primitive(primitive_for(other)),
        };
        tracing::trace!(
            field = %descriptor.name,
            kind = %descriptor.kind,
            ty = %value,
            "resolved attribute type"
        );
        Ok(TypeDescriptor::optional(value))
    }

    pub fn reference_urls(&self) -> &ReferenceUrlTable {
        &self.urls
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    fn reference(
        &mut self,
        descriptor: &FieldDescriptor,
    ) -> Result<Arc<ReferenceType>, CompileError> {
        let linkage = descriptor
            .linkage
            .as_ref()
            .filter(|l| !l.reference_type_name.is_empty())
            .ok_or_else(|| {
                CompileError::configuration(
                    &descriptor.name,
                    format!("kind '{}' requires a non-empty type_object", descriptor.kind),
                )
            })?;

        let lookup = self
            .cache
            .resolve(&linkage.reference_type_name, Some(linkage))?;
        if !lookup.is_created() {
            self.check_collision(lookup.entry(), linkage)?;
        }

        let entry = lookup.into_entry();
        if linkage.service_url().is_some() {
            if let Some(url) = entry.service_url() {
                self.urls.record(entry.object_type(), url);
            }
        }
        Ok(entry)
    }

    // A cached entry whose service URL disagrees with the requested linkage.
    fn check_collision(
        &self,
        entry: &ReferenceType,
        linkage: &Linkage,
    ) -> Result<(), CompileError> {
        let requested = match linkage.service_url() {
            Some(url) if Some(url.as_str()) != entry.service_url() => url,
            _ => return Ok(()),
        };

        match self.policy {
            CollisionPolicy::FirstWins => {
                tracing::warn!(
                    reference = entry.object_type(),
                    cached = entry.service_url().unwrap_or(""),
                    requested = %requested,
                    "reference type already registered with other linkage; first registration wins"
                );
                Ok(())
            }
            CollisionPolicy::Reject => Err(CompileError::NameCollision {
                name: entry.object_type().to_string(),
                reason: format!(
                    "already registered with service URL '{}', requested '{requested}'",
                    entry.service_url().unwrap_or("")
                ),
            }),
        }
    }
}
