//! # recforge-schema — Runtime Schema Compiler
//!
//! Compiles declarative field metadata into typed [`RecordType`]s.
//!
//! ## Pipeline
//!
//! ```text
//! SchemaDefinition -> inherit (base) -> resolve declared fields -> synthesize
//!                        |                  |
//!                        +-- AttributeResolver --> ReferenceCache (process-wide)
//! ```
//!
//! - [`cache`]: the process-wide reference type cache (first writer wins).
//! - [`resolve`]: kind to type resolution and the per-compilation URL table.
//! - [`defaults`]: kind to canonical default value.
//! - [`inherit`]: re-derivation of a base type's standard attributes.
//! - [`combine`]: auxiliary fields with concrete types.
//! - [`synth`]: final record assembly.
//! - [`compiler`]: orchestration.
//!
//! ## Example
//!
//! ```
//! use recforge_core::RecordType;
//! use recforge_schema::{SchemaCompiler, SchemaDefinition, ReferenceCache};
//!
//! let definition = SchemaDefinition::from_yaml_str(r#"
//! meta_name: Sensor
//! fields:
//!   value: {attrs_type: int, description: reading}
//!   owner:
//!     attrs_type: ref
//!     type_object: Device
//!     type_service: devices
//!     service_version: v1
//!     attrs: []
//!     links: []
//! "#).unwrap();
//!
//! let mut compiler = SchemaCompiler::with_cache(definition, ReferenceCache::new());
//! let sensor = compiler.compile(&RecordType::contract()).unwrap();
//!
//! assert_eq!(sensor.object_type(), "Sensor");
//! assert_eq!(compiler.reference_urls().get("Device"), Some("/v1/devices"));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `recforge-core` internally.
//! - No I/O: definitions and configuration are parsed from in-memory text.
//! - Reference type identity is `Arc` pointer identity and must stay so.

pub mod cache;
pub mod combine;
pub mod compiler;
pub mod config;
pub mod defaults;
pub mod definition;
pub mod inherit;
pub mod resolve;
pub mod synth;

pub use cache::{Lookup, ReferenceCache};
pub use combine::{CombineDefinition, CombineField};
pub use compiler::{compile, Compilation, SchemaCompiler};
pub use config::{CollisionPolicy, CompilerConfig};
pub use defaults::default_for;
pub use definition::{OrderedMap, RawFieldMeta, SchemaDefinition};
pub use inherit::{derive_descriptor, inherit_from};
pub use resolve::{AttributeResolver, ReferenceUrlTable};
pub use synth::synthesize;

pub use recforge_core::{CompileError, RecordType};
