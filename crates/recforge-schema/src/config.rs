//! # Compiler Configuration
//!
//! [`CompilerConfig`] holds the knobs of the compilation pipeline. Every
//! field has a default, so an empty document yields the standard behavior;
//! configuration text is parsed from memory (YAML or JSON), never read from
//! disk here.

use serde::{Deserialize, Serialize};

use recforge_core::{CompileError, CONTRACT_FIELDS, EXTENSION_FIELDS};

/// What to do when a reference type is re-resolved with linkage that
/// disagrees with the cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the first registration and log a warning.
    #[default]
    FirstWins,
    /// Fail the compilation with a name collision error.
    Reject,
}

/// Configuration of a [`SchemaCompiler`](crate::SchemaCompiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Field names never re-resolved from schema metadata.
    pub reserved_names: Vec<String>,
    /// Field-name prefix that marks a field as carrying reference linkage.
    pub reference_prefix: String,
    pub collision_policy: CollisionPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            reserved_names: CONTRACT_FIELDS
                .iter()
                .chain(EXTENSION_FIELDS.iter())
                .map(|s| s.to_string())
                .collect(),
            reference_prefix: "ref_".to_string(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl CompilerConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, CompileError> {
        serde_yaml::from_str(text).map_err(|e| CompileError::Parse {
            format: "yaml",
            reason: e.to_string(),
        })
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|r| r == name)
    }

    /// Whether a field with this name carries reference linkage regardless
    /// of its `type_object`.
    pub fn has_reference_prefix(&self, name: &str) -> bool {
        !self.reference_prefix.is_empty() && name.starts_with(&self.reference_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reserves_contract_and_extension_fields() {
        let config = CompilerConfig::default();
        for name in ["id", "type", "name", "ref_metadata", "subsystemData"] {
            assert!(config.is_reserved(name), "{name} should be reserved");
        }
        assert!(!config.is_reserved("owner"));
        assert_eq!(config.collision_policy, CollisionPolicy::FirstWins);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = CompilerConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let config = CompilerConfig::from_yaml_str(
            "collision_policy: reject\nreference_prefix: link_\n",
        )
        .unwrap();
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
        assert!(config.has_reference_prefix("link_owner"));
        assert!(!config.has_reference_prefix("ref_owner"));
        assert_eq!(config.reserved_names.len(), 5);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = CompilerConfig::from_yaml_str("collision_policy: [").unwrap_err();
        assert!(matches!(err, CompileError::Parse { format: "yaml", .. }));
        let err = CompilerConfig::from_json_str("{\"collision_policy\": \"sometimes\"}")
            .unwrap_err();
        assert!(matches!(err, CompileError::Parse { format: "json", .. }));
    }
}
