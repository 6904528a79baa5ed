#![deny(missing_docs)]

//! # recforge-core — Object-Modeling Layer
//!
//! The types the schema compiler reads and produces. Nothing in this crate
//! resolves metadata; it only describes record shapes.
//!
//! ## Key Types
//!
//! 1. **[`Kind`] and [`Primitive`].** The declared kind of a field and the
//!    five primitive types the non-reference kinds map to.
//!
//! 2. **[`TypeDescriptor`].** A resolved field type. Reference and enum
//!    types are shared through `Arc`; reference equality is pointer equality.
//!
//! 3. **[`FieldDescriptor`] and [`AttributeSet`].** Per-field metadata and
//!    the insertion-ordered table of `(type, descriptor)` pairs.
//!
//! 4. **[`RecordType`] and [`ReferenceType`].** Explicit descriptor tables
//!    standing in for generated classes, with schema export and default
//!    instantiation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `recforge-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod field;
pub mod kind;
pub mod record;
pub mod types;

// Re-export primary types for ergonomic imports.
pub use error::CompileError;
pub use field::{AttributeSet, FieldDescriptor, Linkage, ResolvedField};
pub use kind::{Kind, Primitive};
pub use record::{
    contract_fields, RecordType, RecordTypeBuilder, ReferenceType, CONTRACT_FIELDS,
    CONTRACT_NAME, EXTENSION_FIELDS, REFERENCE_CLASS_PREFIX, REFERENCE_CONTRACT_NAME,
};
pub use types::{EnumType, TypeDescriptor, ValueType};
