//! Tiered repository: cache, local source, remote source.
//!
//! The repository answers every read from the cheapest tier that can answer
//! it and pushes every write through local then remote.
//!
//! # Reads
//!
//! - `list_all`: fresh cache → local (skipped when dirty) → remote. A remote
//!   load replaces the cache and rebuilds the local store from the result.
//! - `get_one`: cache (dirty flag ignored) → local → remote. A hit at a
//!   source is inserted into the cache.
//!
//! # Writes
//!
//! `save`/`update` write local then remote. Under [`WritePolicy::Optimistic`]
//! the cache takes the record before either tier answers and is not rolled
//! back on failure; under [`WritePolicy::Confirmed`] it takes the record only
//! after both tiers succeed. `delete_one` removes the cached entry after both
//! tiers succeed. `delete_all` never touches the cache; the next listing only
//! drops the stale entries once the cache is refreshed.
//!
//! # Concurrency
//!
//! The cache sits behind a mutex that is never held across an `.await`.
//! Writes and cache fills for one id are serialized, so a `get_one` that
//! overlaps a `delete_one` cannot put the deleted record back. For different
//! ids, or for concurrent bulk loads, completion order decides the final
//! cache contents.

mod locks;

use std::sync::{Arc, Mutex, MutexGuard};

use rollcall_core::{
    require_id, Record, RepositoryConfig, RollcallResult, StorageError, Tier, WriteOperation,
};
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheState, CacheStats, RecordCache};
use crate::source::DataSource;
use locks::KeyLocks;

/// Which upsert a write performs at each tier.
#[derive(Debug, Clone, Copy)]
enum Upsert {
    Save,
    Update,
}

impl Upsert {
    fn operation(self) -> WriteOperation {
        match self {
            Upsert::Save => WriteOperation::Save,
            Upsert::Update => WriteOperation::Update,
        }
    }

    async fn apply<R, S>(self, source: &S, record: &R) -> RollcallResult<()>
    where
        R: Record,
        S: DataSource<R> + ?Sized,
    {
        match self {
            Upsert::Save => source.save(record).await,
            Upsert::Update => source.update(record).await,
        }
    }
}

/// Coordinator over an in-memory cache and two data sources.
///
/// Cheap to clone; clones share the cache and both sources.
///
/// # Example
///
/// ```ignore
/// let repo = Repository::new(Arc::new(local), Arc::new(remote), RepositoryConfig::default());
///
/// repo.save(Student::new("Ada")).await?;
/// let everyone = repo.list_all().await?;
///
/// // Force the next listing to come from the remote tier
/// repo.refresh()?;
/// ```
pub struct Repository<R, L, M>
where
    R: Record,
    L: DataSource<R> + ?Sized,
    M: DataSource<R> + ?Sized,
{
    local: Arc<L>,
    remote: Arc<M>,
    cache: Arc<Mutex<RecordCache<R>>>,
    locks: Arc<KeyLocks>,
    config: RepositoryConfig,
}

impl<R, L, M> Repository<R, L, M>
where
    R: Record,
    L: DataSource<R> + ?Sized,
    M: DataSource<R> + ?Sized,
{
    /// Create a repository with an empty cache.
    pub fn new(local: Arc<L>, remote: Arc<M>, config: RepositoryConfig) -> Self {
        debug!(
            write_policy = %config.write_policy,
            write_back = config.write_back_on_remote_load,
            "Repository created"
        );
        Self {
            local,
            remote,
            cache: Arc::new(Mutex::new(RecordCache::new())),
            locks: Arc::new(KeyLocks::new()),
            config,
        }
    }

    /// Create a repository with default configuration.
    pub fn with_defaults(local: Arc<L>, remote: Arc<M>) -> Self {
        Self::new(local, remote, RepositoryConfig::default())
    }

    /// Get the repository configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Get a reference to the local data source.
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Get a reference to the remote data source.
    pub fn remote(&self) -> &M {
        &self.remote
    }

    /// Current bulk-listing state of the cache.
    pub fn cache_state(&self) -> RollcallResult<CacheState> {
        Ok(self.lock_cache()?.state())
    }

    /// Cache counters.
    pub fn stats(&self) -> RollcallResult<CacheStats> {
        Ok(self.lock_cache()?.stats())
    }

    /// Whether `id` is currently cached, without touching the counters.
    pub fn is_cached(&self, id: &str) -> RollcallResult<bool> {
        Ok(self.lock_cache()?.contains(id))
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// List every record.
    ///
    /// Fresh cache first; otherwise local (unless the cache is dirty), then
    /// remote. Returns the remote tier's not-available error when no tier can
    /// answer, leaving the cache untouched.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_all(&self) -> RollcallResult<Vec<R>> {
        let dirty = {
            let mut cache = self.lock_cache()?;
            if let Some(records) = cache.fresh_snapshot() {
                debug!(count = records.len(), "Listing served from cache");
                return Ok(records);
            }
            cache.is_dirty()
        };

        if dirty {
            debug!("Cache dirty, bypassing local tier");
        } else {
            match self.local.list_all().await {
                Ok(records) => {
                    self.lock_cache()?.replace_all(records.iter().cloned());
                    info!(tier = %Tier::Local, count = records.len(), "Cache reloaded");
                    return Ok(records);
                }
                Err(err) => {
                    debug!(error = %err, "Local listing unavailable, falling back to remote");
                }
            }
        }

        let records = self.remote.list_all().await.map_err(|err| {
            warn!(error = %err, "Remote listing unavailable");
            err
        })?;
        self.lock_cache()?.replace_all(records.iter().cloned());
        info!(tier = %Tier::Remote, count = records.len(), "Cache reloaded");

        if self.config.write_back_on_remote_load {
            self.write_back_local(&records).await;
        }
        Ok(records)
    }

    /// Get one record by id.
    ///
    /// A cached entry is returned even when the cache is dirty. A miss holds
    /// the id's write lock until the fetched record is cached.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_one(&self, id: &str) -> RollcallResult<R> {
        require_id(id)?;

        if let Some(record) = self.lock_cache()?.get(id) {
            debug!("Record served from cache");
            return Ok(record);
        }

        let _guard = self.locks.acquire(id).await?;
        // A write that held the lock may have filled the entry meanwhile.
        if let Some(record) = self.lock_cache()?.peek(id).cloned() {
            return Ok(record);
        }

        match self.local.get_one(id).await {
            Ok(record) => {
                self.lock_cache()?.put(record.clone());
                return Ok(record);
            }
            Err(err) => {
                debug!(error = %err, "Local record unavailable, falling back to remote");
            }
        }

        let record = self.remote.get_one(id).await.map_err(|err| {
            warn!(error = %err, "Remote record unavailable");
            err
        })?;
        self.lock_cache()?.put(record.clone());
        Ok(record)
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert or replace a record in both tiers.
    #[instrument(level = "debug", skip(self, record), fields(id = record.record_id()))]
    pub async fn save(&self, record: R) -> RollcallResult<()> {
        self.write_through(record, Upsert::Save).await
    }

    /// Update a record in both tiers.
    #[instrument(level = "debug", skip(self, record), fields(id = record.record_id()))]
    pub async fn update(&self, record: R) -> RollcallResult<()> {
        self.write_through(record, Upsert::Update).await
    }

    /// Remove every record from both tiers.
    ///
    /// The cache keeps its entries; call [`refresh`](Self::refresh) to stop
    /// listing them.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_all(&self) -> RollcallResult<()> {
        self.local.delete_all().await.map_err(|err| {
            warn!(tier = %Tier::Local, error = %err, "Delete all rejected");
            err
        })?;
        self.remote.delete_all().await.map_err(|err| {
            warn!(tier = %Tier::Remote, error = %err, "Delete all rejected");
            err
        })?;
        debug!("All records deleted from both tiers");
        Ok(())
    }

    /// Remove one record from both tiers, then from the cache.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_one(&self, id: &str) -> RollcallResult<()> {
        require_id(id)?;
        let _guard = self.locks.acquire(id).await?;

        self.local.delete_one(id).await.map_err(|err| {
            warn!(tier = %Tier::Local, error = %err, "Delete rejected");
            err
        })?;
        self.remote.delete_one(id).await.map_err(|err| {
            warn!(tier = %Tier::Remote, error = %err, "Delete rejected");
            err
        })?;

        let removed = self.lock_cache()?.remove(id).is_some();
        debug!(evicted = removed, "Record deleted from both tiers");
        Ok(())
    }

    // ========================================================================
    // INVALIDATION & LIFECYCLE
    // ========================================================================

    /// Mark the cache dirty so the next listing is sourced from remote.
    /// No I/O.
    pub fn refresh(&self) -> RollcallResult<()> {
        self.lock_cache()?.mark_dirty();
        debug!("Cache marked dirty");
        Ok(())
    }

    /// Drop all cached entries and counters, returning the cache to `Empty`.
    ///
    /// Intended for test isolation; production code builds a new repository
    /// instead of resetting a shared one.
    pub fn reset(&self) -> RollcallResult<()> {
        self.lock_cache()?.reset();
        Ok(())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn lock_cache(&self) -> RollcallResult<MutexGuard<'_, RecordCache<R>>> {
        self.cache
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    async fn write_through(&self, record: R, kind: Upsert) -> RollcallResult<()> {
        let id = require_id(record.record_id())?.to_string();
        let _guard = self.locks.acquire(&id).await?;
        let operation = kind.operation();

        if self.config.write_policy.is_optimistic() {
            self.lock_cache()?.put(record.clone());
        }

        kind.apply(self.local.as_ref(), &record).await.map_err(|err| {
            warn!(tier = %Tier::Local, %operation, error = %err, "Write rejected");
            err
        })?;
        kind.apply(self.remote.as_ref(), &record).await.map_err(|err| {
            warn!(tier = %Tier::Remote, %operation, error = %err, "Write rejected");
            err
        })?;

        if self.config.write_policy.is_confirmed() {
            self.lock_cache()?.put(record);
        }
        debug!(%operation, "Write confirmed by both tiers");
        Ok(())
    }

    /// Rebuild the local store from a remote listing: delete all, then save
    /// each record. Failures are logged and do not fail the listing.
    async fn write_back_local(&self, records: &[R]) {
        if let Err(err) = self.local.delete_all().await {
            warn!(error = %err, "Local write-back skipped, delete all rejected");
            return;
        }
        let mut failed = 0usize;
        for record in records {
            if let Err(err) = self.local.save(record).await {
                failed += 1;
                warn!(id = record.record_id(), error = %err, "Local write-back save rejected");
            }
        }
        debug!(count = records.len(), failed, "Local store rebuilt from remote");
    }
}

impl<R, L, M> Clone for Repository<R, L, M>
where
    R: Record,
    L: DataSource<R> + ?Sized,
    M: DataSource<R> + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
            cache: Arc::clone(&self.cache),
            locks: Arc::clone(&self.locks),
            config: self.config.clone(),
        }
    }
}

/// The repository is itself a data source, so it can stand in wherever a
/// tier is expected.
#[async_trait::async_trait]
impl<R, L, M> DataSource<R> for Repository<R, L, M>
where
    R: Record,
    L: DataSource<R> + ?Sized,
    M: DataSource<R> + ?Sized,
{
    fn tier(&self) -> Tier {
        Tier::Cache
    }

    async fn list_all(&self) -> RollcallResult<Vec<R>> {
        Repository::list_all(self).await
    }

    async fn get_one(&self, id: &str) -> RollcallResult<R> {
        Repository::get_one(self, id).await
    }

    async fn save(&self, record: &R) -> RollcallResult<()> {
        Repository::save(self, record.clone()).await
    }

    async fn update(&self, record: &R) -> RollcallResult<()> {
        Repository::update(self, record.clone()).await
    }

    async fn delete_all(&self) -> RollcallResult<()> {
        Repository::delete_all(self).await
    }

    async fn delete_one(&self, id: &str) -> RollcallResult<()> {
        Repository::delete_one(self, id).await
    }

    fn refresh(&self) -> RollcallResult<()> {
        Repository::refresh(self)
    }
}
