//! The record contract shared by every storage tier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage tier discriminator, used in logs and error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// In-memory cache owned by the repository.
    Cache,
    /// Durable store on the device.
    Local,
    /// Store reached over the network.
    Remote,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Cache => "cache",
            Tier::Local => "local",
            Tier::Remote => "remote",
        };
        write!(f, "{}", s)
    }
}

/// Marker trait for values the repository can store.
///
/// The repository treats a record as an opaque keyed value: it only ever
/// looks at `record_id()`. Two records with the same id are the same record.
///
/// # Implementation Requirements
///
/// - `record_id()` must be stable for the lifetime of the value
/// - Implementations must be `Clone` so the cache can hand out copies
/// - Implementations must be `Send + Sync + 'static` for async compatibility
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Get the unique identifier for this record.
    fn record_id(&self) -> &str;
}
