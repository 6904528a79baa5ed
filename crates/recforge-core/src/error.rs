//! # Error Types — Schema Compilation Failures
//!
//! Every failure the compiler can surface is a variant of [`CompileError`].
//! All errors are fatal to the compilation that produced them: no partial
//! record type is returned, and nothing is retried.
//!
//! ## Design
//!
//! - Configuration errors name the offending field and the reason.
//! - Linkage errors name the field and the missing metadata key.
//! - Collision errors name the type that collided.

use thiserror::Error;

/// Top-level error type for schema compilation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A field descriptor is internally inconsistent (e.g. `enum` without an
    /// enumeration type, `ref` without a reference-type name).
    #[error("invalid configuration for field '{field}': {reason}")]
    Configuration {
        /// Name of the offending field.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The default value table has no entry for this kind.
    #[error("no default value for attribute kind '{kind}'")]
    UnknownKind {
        /// The kind that could not be looked up.
        kind: String,
    },

    /// A type name is already taken by a different definition.
    #[error("name collision on '{name}': {reason}")]
    NameCollision {
        /// The colliding type name.
        name: String,
        /// What the name collided with.
        reason: String,
    },

    /// A reference field omits a linkage key the pipeline requires.
    #[error("reference field '{field}' is missing linkage key '{key}'")]
    MissingLinkage {
        /// Name of the reference field.
        field: String,
        /// The absent metadata key.
        key: &'static str,
    },

    /// A schema definition or configuration document could not be parsed.
    #[error("failed to parse {format}: {reason}")]
    Parse {
        /// Input format (`json` or `yaml`).
        format: &'static str,
        /// Parser message.
        reason: String,
    },
}

impl CompileError {
    /// Shorthand for a [`CompileError::Configuration`] error.
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            format: "json",
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_item() {
        let err = CompileError::MissingLinkage {
            field: "owner".to_string(),
            key: "links",
        };
        assert_eq!(
            err.to_string(),
            "reference field 'owner' is missing linkage key 'links'"
        );

        let err = CompileError::UnknownKind {
            kind: "decimal".to_string(),
        };
        assert!(err.to_string().contains("decimal"));
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        match CompileError::from(e) {
            CompileError::Parse { format, .. } => assert_eq!(format, "json"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
