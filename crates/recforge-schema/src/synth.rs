//! # Class Synthesizer
//!
//! Assembles resolved attributes into the final [`RecordType`]: the base
//! contract fields first, then the attributes in order, tagged with
//! `object_type = meta_name`. Pure assembly; the only failure is a name
//! already taken by a cached reference type. A successful synthesis claims
//! the name, so a later reference type named `Ref{X}` cannot shadow it.

use recforge_core::{AttributeSet, CompileError, RecordType};

use crate::cache::ReferenceCache;

pub fn synthesize(
    meta_name: &str,
    attributes: AttributeSet,
    cache: &ReferenceCache,
) -> Result<RecordType, CompileError> {
    cache.claim_record_name(meta_name)?;

    let record = RecordType::extending_contract(meta_name)
        .object_type(meta_name)
        .fields(attributes)
        .build();
    tracing::debug!(
        record = meta_name,
        fields = record.fields().len(),
        "synthesized record type"
    );
    Ok(record)
}
