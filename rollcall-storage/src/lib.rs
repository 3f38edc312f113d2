//! ROLLCALL Storage - Tiered Repository
//!
//! Defines the data source abstraction, the record cache and the repository
//! that coordinates reads and writes across cache, local and remote tiers.
//! Concrete persistence lives behind [`DataSource`]; [`MockDataSource`] is the
//! in-memory implementation used in tests.

pub mod cache;
pub mod mock;
pub mod repository;
pub mod source;

pub use cache::{CacheState, CacheStats, RecordCache};
pub use mock::{MockDataSource, SourceCall};
pub use repository::Repository;
pub use source::DataSource;

/// Repository over two mock sources, as used throughout the tests.
pub type MockRepository<R> = Repository<R, MockDataSource<R>, MockDataSource<R>>;
