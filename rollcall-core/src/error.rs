//! Error types for ROLLCALL operations

use crate::Tier;
use std::fmt;
use thiserror::Error;

/// Write operations a data source can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOperation {
    Save,
    Update,
    DeleteAll,
    DeleteOne,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteOperation::Save => "save",
            WriteOperation::Update => "update",
            WriteOperation::DeleteAll => "delete_all",
            WriteOperation::DeleteOne => "delete_one",
        };
        write!(f, "{}", s)
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// A read found nothing at the given tier. `id` is `None` for bulk reads.
    #[error("Data not available from {tier} tier{}", id_suffix(.id))]
    NotAvailable { tier: Tier, id: Option<String> },

    #[error("{operation} failed on {tier} tier: {reason}")]
    WriteFailed {
        tier: Tier,
        operation: WriteOperation,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" for id {}", id),
        None => String::new(),
    }
}

impl StorageError {
    /// Not-available outcome of a bulk read.
    pub fn list_not_available(tier: Tier) -> Self {
        Self::NotAvailable { tier, id: None }
    }

    /// Not-available outcome of a single-record read.
    pub fn record_not_available(tier: Tier, id: impl Into<String>) -> Self {
        Self::NotAvailable {
            tier,
            id: Some(id.into()),
        }
    }

    /// Rejected write.
    pub fn write_failed(tier: Tier, operation: WriteOperation, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            tier,
            operation,
            reason: reason.into(),
        }
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to initialize tracing: {reason}")]
    TracingInit { reason: String },
}

/// Master error type for all ROLLCALL errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RollcallError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RollcallError {
    /// True for the "nothing found at this tier" outcome of a read.
    pub fn is_not_available(&self) -> bool {
        matches!(self, RollcallError::Storage(StorageError::NotAvailable { .. }))
    }

    /// True for a write rejected by a tier.
    pub fn is_write_failed(&self) -> bool {
        matches!(self, RollcallError::Storage(StorageError::WriteFailed { .. }))
    }

    /// The tier that produced a storage outcome, if any.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            RollcallError::Storage(StorageError::NotAvailable { tier, .. })
            | RollcallError::Storage(StorageError::WriteFailed { tier, .. }) => Some(*tier),
            _ => None,
        }
    }
}

/// Result type alias for ROLLCALL operations.
pub type RollcallResult<T> = Result<T, RollcallError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_available() {
        let err = StorageError::record_not_available(Tier::Remote, "abc");
        let msg = format!("{}", err);
        assert!(msg.contains("not available"));
        assert!(msg.contains("remote"));
        assert!(msg.contains("abc"));

        let bulk = StorageError::list_not_available(Tier::Local);
        let msg = format!("{}", bulk);
        assert!(msg.contains("local"));
        assert!(!msg.contains("for id"));
    }

    #[test]
    fn test_storage_error_display_write_failed() {
        let err = StorageError::write_failed(Tier::Local, WriteOperation::DeleteOne, "disk full");
        let msg = format!("{}", err);
        assert!(msg.contains("delete_one"));
        assert!(msg.contains("local"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "write_policy".to_string(),
            value: "eager".to_string(),
            reason: "expected optimistic or confirmed".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("write_policy"));
        assert!(msg.contains("eager"));
    }

    #[test]
    fn test_rollcall_error_from_variants() {
        let storage = RollcallError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, RollcallError::Storage(_)));

        let validation = RollcallError::from(ValidationError::RequiredFieldMissing {
            field: "id".to_string(),
        });
        assert!(matches!(validation, RollcallError::Validation(_)));

        let config = RollcallError::from(ConfigError::TracingInit {
            reason: "already set".to_string(),
        });
        assert!(matches!(config, RollcallError::Config(_)));
    }

    #[test]
    fn test_error_classification() {
        let na: RollcallError = StorageError::list_not_available(Tier::Remote).into();
        assert!(na.is_not_available());
        assert!(!na.is_write_failed());
        assert_eq!(na.tier(), Some(Tier::Remote));

        let wf: RollcallError =
            StorageError::write_failed(Tier::Local, WriteOperation::Save, "nope").into();
        assert!(wf.is_write_failed());
        assert_eq!(wf.tier(), Some(Tier::Local));

        let poisoned: RollcallError = StorageError::LockPoisoned.into();
        assert_eq!(poisoned.tier(), None);
    }
}
