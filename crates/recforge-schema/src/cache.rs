//! # Reference Cache
//!
//! Maps a reference-type name (e.g. `Device`) to its synthesized
//! [`ReferenceType`]. At most one entry is ever created per name: the
//! lookup and the insert run under a single lock, so concurrent first
//! resolutions of a name race for the slot and every racer observes the
//! winning entry.
//!
//! The cache also remembers the names of synthesized records. Reference
//! records (`Ref{X}`) and synthesized records share one namespace, and
//! whichever side claims a name first keeps it; the other side gets a
//! [`CompileError::NameCollision`].
//!
//! Entries are never mutated or removed. Handles are cheap clones sharing
//! one registry; [`ReferenceCache::global`] is the process-wide instance.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use recforge_core::{CompileError, Linkage, ReferenceType};

/// Outcome of [`ReferenceCache::resolve`].
#[derive(Debug, Clone)]
pub enum Lookup {
    /// This call created and registered the entry.
    Created(Arc<ReferenceType>),
    /// The entry already existed and was returned unchanged.
    Existing(Arc<ReferenceType>),
}

impl Lookup {
    pub fn entry(&self) -> &Arc<ReferenceType> {
        match self {
            Self::Created(entry) | Self::Existing(entry) => entry,
        }
    }

    pub fn into_entry(self) -> Arc<ReferenceType> {
        match self {
            Self::Created(entry) | Self::Existing(entry) => entry,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Debug, Default)]
struct Registry {
    references: HashMap<String, Arc<ReferenceType>>,
    records: HashSet<String>,
}

/// Thread-safe, cloneable cache of reference types.
///
/// The lock is `parking_lot`: non-poisonable, so a panicking caller cannot
/// wedge every later compilation.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    registry: Arc<Mutex<Registry>>,
}

static GLOBAL: OnceLock<ReferenceCache> = OnceLock::new();

impl ReferenceCache {
    /// Create an empty, private cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// Return the entry for `name`, creating it from `linkage` if absent.
    ///
    /// A new entry records the linkage's service URL when the linkage
    /// supplies both a service name and version. An existing entry is
    /// returned as-is; `linkage` is not consulted. Creating an entry whose
    /// record name was already claimed by a synthesized record fails.
    pub fn resolve(&self, name: &str, linkage: Option<&Linkage>) -> Result<Lookup, CompileError> {
        let mut registry = self.registry.lock();
        if let Some(existing) = registry.references.get(name) {
            return Ok(Lookup::Existing(Arc::clone(existing)));
        }

        let service_url = linkage.and_then(Linkage::service_url);
        let entry = Arc::new(ReferenceType::new(name, service_url));
        if registry.records.contains(entry.name()) {
            return Err(CompileError::NameCollision {
                name: entry.name().to_string(),
                reason: "a synthesized record type already uses this name".to_string(),
            });
        }

        registry
            .references
            .insert(name.to_string(), Arc::clone(&entry));
        tracing::debug!(
            reference = name,
            service_url = entry.service_url().unwrap_or(""),
            "registered reference type"
        );
        Ok(Lookup::Created(entry))
    }

    /// Claim `class_name` for a synthesized record.
    ///
    /// Claiming a name twice is fine; claiming the record name of a cached
    /// reference type (e.g. `RefDevice`) is a collision.
    pub fn claim_record_name(&self, class_name: &str) -> Result<(), CompileError> {
        let mut registry = self.registry.lock();
        if registry
            .references
            .values()
            .any(|entry| entry.name() == class_name)
        {
            return Err(CompileError::NameCollision {
                name: class_name.to_string(),
                reason: "a reference type with this record name is already registered"
                    .to_string(),
            });
        }
        registry.records.insert(class_name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<ReferenceType>> {
        self.registry.lock().references.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.lock().references.contains_key(name)
    }

    /// Number of cached reference types.
    pub fn len(&self) -> usize {
        self.registry.lock().references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_resolution_creates_then_reuses() {
        let cache = ReferenceCache::new();
        let linkage = Linkage::new("Device").with_service("devices", "v1");

        let first = cache.resolve("Device", Some(&linkage)).unwrap();
        assert!(first.is_created());
        assert_eq!(first.entry().service_url(), Some("/v1/devices"));

        let second = cache.resolve("Device", None).unwrap();
        assert!(!second.is_created());
        assert!(Arc::ptr_eq(first.entry(), second.entry()));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("Device"));
    }

    #[test]
    fn existing_entry_ignores_new_linkage() {
        let cache = ReferenceCache::new();
        cache.resolve("Device", None).unwrap();
        let relinked = Linkage::new("Device").with_service("devices", "v2");
        let entry = cache.resolve("Device", Some(&relinked)).unwrap().into_entry();
        assert_eq!(entry.service_url(), None);
    }

    #[test]
    fn clones_share_entries() {
        let cache = ReferenceCache::new();
        let handle = cache.clone();
        let a = cache.resolve("Site", None).unwrap().into_entry();
        let b = handle.get("Site").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn record_names_and_reference_names_exclude_each_other() {
        let cache = ReferenceCache::new();
        cache.resolve("Site", None).unwrap();
        assert!(matches!(
            cache.claim_record_name("RefSite"),
            Err(CompileError::NameCollision { name, .. }) if name == "RefSite"
        ));
        cache.claim_record_name("Site").unwrap();
        cache.claim_record_name("Site").unwrap();

        cache.claim_record_name("RefRack").unwrap();
        assert!(matches!(
            cache.resolve("Rack", None),
            Err(CompileError::NameCollision { name, .. }) if name == "RefRack"
        ));
        assert!(!cache.contains("Rack"));
    }

    #[test]
    fn global_handles_share_one_map() {
        let name = "CacheModuleGlobalEntry";
        let a = ReferenceCache::global().resolve(name, None).unwrap().into_entry();
        let b = ReferenceCache::global().get(name).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn concurrent_first_resolutions_agree() {
        let cache = ReferenceCache::new();
        let linkage = Linkage::new("Gateway").with_service("gateways", "v1");

        let entries: Vec<Arc<ReferenceType>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let cache = cache.clone();
                    let linkage = linkage.clone();
                    s.spawn(move || {
                        cache
                            .resolve("Gateway", Some(&linkage))
                            .unwrap()
                            .into_entry()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.len(), 1);
        for entry in &entries[1..] {
            assert!(Arc::ptr_eq(&entries[0], entry));
        }
    }
}
