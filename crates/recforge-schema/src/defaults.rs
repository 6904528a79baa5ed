//! # Default Value Resolver
//!
//! Maps a declared kind to its canonical zero value. Unlike type
//! resolution there is no fallback: a kind outside the table is an error.

use serde_json::{Map, Value};

use recforge_core::{CompileError, Kind};

/// Canonical default for `kind`.
///
/// `ref` → `{}`, `ref_list` → `[]`, and the table
/// `str → ""`, `int → 0`, `dict → {}`, `list → []`, `bool → false`.
pub fn default_for(kind: &Kind) -> Result<Value, CompileError> {
    match kind {
        Kind::Ref => Ok(Value::Object(Map::new())),
        Kind::RefList => Ok(Value::Array(Vec::new())),
        other => other
            .primitive()
            .map(|p| p.zero_value())
            .ok_or_else(|| CompileError::UnknownKind {
                kind: other.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn table_values() {
        assert_eq!(default_for(&Kind::Str).unwrap(), json!(""));
        assert_eq!(default_for(&Kind::Int).unwrap(), json!(0));
        assert_eq!(default_for(&Kind::Dict).unwrap(), json!({}));
        assert_eq!(default_for(&Kind::List).unwrap(), json!([]));
        assert_eq!(default_for(&Kind::Bool).unwrap(), json!(false));
    }

    #[test]
    fn reference_kinds() {
        assert_eq!(default_for(&Kind::Ref).unwrap(), json!({}));
        assert_eq!(default_for(&Kind::RefList).unwrap(), json!([]));
    }

    #[test]
    fn enum_has_no_table_default() {
        assert_eq!(
            default_for(&Kind::Enum),
            Err(CompileError::UnknownKind {
                kind: "enum".to_string()
            })
        );
    }

    proptest! {
        #[test]
        fn unknown_kinds_are_rejected(name in "[a-z]{1,10}") {
            let kind = Kind::from(name.as_str());
            prop_assume!(matches!(kind, Kind::Other(_)));
            let is_unknown_kind = matches!(
                default_for(&kind),
                Err(CompileError::UnknownKind { .. })
            );
            prop_assert!(is_unknown_kind);
        }
    }
}
