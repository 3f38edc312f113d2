//! Record cache owned by the repository.
//!
//! The cache is an insertion-ordered id→record map plus a dirty flag. Its
//! bulk view moves through three states:
//!
//! ```text
//!   Empty --(local or remote load)--> Fresh --(refresh)--> Dirty
//!                                       ^                    |
//!                                       +--(remote load)-----+
//! ```
//!
//! Failed loads leave the state unchanged. Single-record lookups ignore the
//! dirty flag: an entry that is present is served regardless of state.

pub mod state;
pub mod stats;

pub use state::{CacheState, RecordCache};
pub use stats::CacheStats;
