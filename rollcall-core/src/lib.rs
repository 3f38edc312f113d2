//! ROLLCALL Core - Record Types
//!
//! Plain data structures shared by every other crate: the `Record` contract,
//! the `Student` record, the error taxonomy and configuration.
//! This crate contains no tier coordination logic.

pub mod config;
pub mod error;
pub mod identity;
pub mod record;
pub mod student;
pub mod telemetry;

pub use config::{RepositoryConfig, WritePolicy};
pub use error::{
    ConfigError, RollcallError, RollcallResult, StorageError, ValidationError, WriteOperation,
};
pub use identity::{new_record_id, require_id, RecordId};
pub use record::{Record, Tier};
pub use student::Student;
pub use telemetry::{init_tracing, TelemetryConfig};
