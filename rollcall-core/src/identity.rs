//! Identity types for ROLLCALL records

use uuid::Uuid;

use crate::error::{RollcallResult, ValidationError};

/// Record identifier. Opaque string, unique, immutable and never reused.
pub type RecordId = String;

/// Generate a new record id.
/// UUIDv7 embeds a Unix timestamp, making ids naturally sortable by creation time.
pub fn new_record_id() -> RecordId {
    Uuid::now_v7().to_string()
}

/// Reject an empty identifier.
///
/// An empty id is a caller bug rather than a missing record, so it is
/// reported as a validation error before any tier is consulted.
pub fn require_id(id: &str) -> RollcallResult<&str> {
    if id.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "id".to_string(),
        }
        .into());
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RollcallError;

    #[test]
    fn test_new_record_ids_are_unique_and_sortable() {
        let a = new_record_id();
        let b = new_record_id();
        assert_ne!(a, b);
        assert!(a < b, "UUIDv7 ids should sort by creation order");
    }

    #[test]
    fn test_require_id_rejects_blank() {
        assert!(matches!(require_id(""), Err(RollcallError::Validation(_))));
        assert!(matches!(require_id("   "), Err(RollcallError::Validation(_))));
        assert_eq!(require_id("abc").unwrap(), "abc");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any id with at least one non-whitespace character passes through unchanged.
        #[test]
        fn prop_require_id_accepts_non_blank(id in "[ ]{0,3}[a-zA-Z0-9_-]{1,24}[ ]{0,3}") {
            prop_assert_eq!(require_id(&id).unwrap(), id.as_str());
        }

        /// Whitespace-only ids are always rejected.
        #[test]
        fn prop_require_id_rejects_whitespace(id in "[ \t]{0,8}") {
            prop_assert!(require_id(&id).is_err());
        }
    }
}
