//! In-memory data source usable as either tier.
//!
//! Records are kept in insertion order. Every trait call is logged as a
//! [`SourceCall`] so tests can assert exactly which tier was consulted, and
//! availability, write failures and latency can be injected at runtime.
//! A read delay holds back a read's outcome after the store was consulted,
//! which lets tests interleave a write between a read and its delivery.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use ::async_trait::async_trait;
use indexmap::IndexMap;
use rollcall_core::{Record, RecordId, RollcallResult, StorageError, Tier, WriteOperation};

use crate::source::DataSource;

/// One logged call against a [`MockDataSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    ListAll,
    GetOne(String),
    Save(String),
    Update(String),
    DeleteAll,
    DeleteOne(String),
    Refresh,
}

impl SourceCall {
    /// True for calls that mutate the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            SourceCall::Save(_)
                | SourceCall::Update(_)
                | SourceCall::DeleteAll
                | SourceCall::DeleteOne(_)
        )
    }
}

#[derive(Debug)]
struct MockState<R> {
    records: IndexMap<RecordId, R>,
    calls: Vec<SourceCall>,
    available: bool,
    empty_is_unavailable: bool,
    failing_writes: HashSet<WriteOperation>,
    latency: Option<Duration>,
    read_delay: Option<Duration>,
}

impl<R> Default for MockState<R> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
            calls: Vec::new(),
            available: true,
            empty_is_unavailable: false,
            failing_writes: HashSet::new(),
            latency: None,
            read_delay: None,
        }
    }
}

/// In-memory mock data source for testing.
///
/// Clones share the same store and call log.
#[derive(Debug, Clone)]
pub struct MockDataSource<R: Record> {
    tier: Tier,
    state: Arc<RwLock<MockState<R>>>,
}

impl<R: Record> MockDataSource<R> {
    /// Create an empty, available source for `tier`.
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            state: Arc::new(RwLock::new(MockState::default())),
        }
    }

    /// Empty local source.
    pub fn local() -> Self {
        Self::new(Tier::Local)
    }

    /// Empty remote source.
    pub fn remote() -> Self {
        Self::new(Tier::Remote)
    }

    /// Seed the store.
    pub fn with_records(self, records: impl IntoIterator<Item = R>) -> Self {
        {
            let mut state = self.write_state();
            for record in records {
                state.records.insert(record.record_id().to_string(), record);
            }
        }
        self
    }

    /// Report reads as not available while the store holds no records, the
    /// way an empty local table behaves.
    pub fn with_empty_as_unavailable(self) -> Self {
        self.write_state().empty_is_unavailable = true;
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.write_state().latency = Some(latency);
        self
    }

    /// Delay delivery of every read result by `delay`, after the store has
    /// been read.
    pub fn with_read_delay(self, delay: Duration) -> Self {
        self.write_state().read_delay = Some(delay);
        self
    }

    // ========================================================================
    // FAILURE INJECTION
    // ========================================================================

    /// Toggle availability. An unavailable source fails every read and write.
    pub fn set_available(&self, available: bool) {
        self.write_state().available = available;
    }

    /// Make one kind of write fail until cleared.
    pub fn fail_writes(&self, operation: WriteOperation) {
        self.write_state().failing_writes.insert(operation);
    }

    /// Make every kind of write fail until cleared.
    pub fn fail_all_writes(&self) {
        let mut state = self.write_state();
        state.failing_writes.extend([
            WriteOperation::Save,
            WriteOperation::Update,
            WriteOperation::DeleteAll,
            WriteOperation::DeleteOne,
        ]);
    }

    /// Stop injecting write failures.
    pub fn clear_failures(&self) {
        self.write_state().failing_writes.clear();
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    /// Insert a record directly, bypassing the call log.
    pub fn insert(&self, record: R) {
        self.write_state()
            .records
            .insert(record.record_id().to_string(), record);
    }

    /// Stored records in insertion order.
    pub fn records(&self) -> Vec<R> {
        self.read_state().records.values().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read_state().records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read_state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.read_state().calls.clone()
    }

    /// Number of logged calls.
    pub fn call_count(&self) -> usize {
        self.read_state().calls.len()
    }

    /// Number of logged `list_all` calls.
    pub fn list_calls(&self) -> usize {
        self.count_calls(|call| matches!(call, SourceCall::ListAll))
    }

    /// Number of logged `get_one` calls.
    pub fn get_calls(&self) -> usize {
        self.count_calls(|call| matches!(call, SourceCall::GetOne(_)))
    }

    /// Number of logged writes of any kind.
    pub fn write_calls(&self) -> usize {
        self.count_calls(SourceCall::is_write)
    }

    /// Forget the call log. Records are kept.
    pub fn clear_calls(&self) {
        self.write_state().calls.clear();
    }

    fn count_calls(&self, predicate: impl Fn(&SourceCall) -> bool) -> usize {
        self.read_state()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    // Test helpers recover from poisoning; trait methods report it.
    fn read_state(&self) -> RwLockReadGuard<'_, MockState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, MockState<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log `call` and return the configured latency.
    fn record_call(&self, call: SourceCall) -> RollcallResult<Option<Duration>> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        state.calls.push(call);
        Ok(state.latency)
    }

    async fn enter(&self, call: SourceCall) -> RollcallResult<()> {
        if let Some(latency) = self.record_call(call)? {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }

    async fn deliver<T>(result: RollcallResult<T>, delay: Option<Duration>) -> RollcallResult<T> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    fn locked(&self) -> RollcallResult<RwLockWriteGuard<'_, MockState<R>>> {
        self.state
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn check_write(&self, state: &MockState<R>, operation: WriteOperation) -> RollcallResult<()> {
        if !state.available {
            return Err(StorageError::write_failed(self.tier, operation, "source unavailable").into());
        }
        if state.failing_writes.contains(&operation) {
            return Err(StorageError::write_failed(self.tier, operation, "injected failure").into());
        }
        Ok(())
    }

    fn readable(&self, state: &MockState<R>) -> bool {
        state.available && !(state.empty_is_unavailable && state.records.is_empty())
    }
}

#[async_trait]
impl<R: Record> DataSource<R> for MockDataSource<R> {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn list_all(&self) -> RollcallResult<Vec<R>> {
        self.enter(SourceCall::ListAll).await?;
        let (result, delay) = {
            let state = self.locked()?;
            let result: RollcallResult<Vec<R>> = if self.readable(&state) {
                Ok(state.records.values().cloned().collect())
            } else {
                Err(StorageError::list_not_available(self.tier).into())
            };
            (result, state.read_delay)
        };
        Self::deliver(result, delay).await
    }

    async fn get_one(&self, id: &str) -> RollcallResult<R> {
        self.enter(SourceCall::GetOne(id.to_string())).await?;
        let (result, delay) = {
            let state = self.locked()?;
            let found = if self.readable(&state) {
                state.records.get(id).cloned()
            } else {
                None
            };
            let result: RollcallResult<R> =
                found.ok_or_else(|| StorageError::record_not_available(self.tier, id).into());
            (result, state.read_delay)
        };
        Self::deliver(result, delay).await
    }

    async fn save(&self, record: &R) -> RollcallResult<()> {
        let id = record.record_id().to_string();
        self.enter(SourceCall::Save(id.clone())).await?;
        let mut state = self.locked()?;
        self.check_write(&state, WriteOperation::Save)?;
        state.records.insert(id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &R) -> RollcallResult<()> {
        let id = record.record_id().to_string();
        self.enter(SourceCall::Update(id.clone())).await?;
        let mut state = self.locked()?;
        self.check_write(&state, WriteOperation::Update)?;
        match state.records.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StorageError::write_failed(
                self.tier,
                WriteOperation::Update,
                format!("no record with id {id}"),
            )
            .into()),
        }
    }

    async fn delete_all(&self) -> RollcallResult<()> {
        self.enter(SourceCall::DeleteAll).await?;
        let mut state = self.locked()?;
        self.check_write(&state, WriteOperation::DeleteAll)?;
        state.records.clear();
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> RollcallResult<()> {
        self.enter(SourceCall::DeleteOne(id.to_string())).await?;
        let mut state = self.locked()?;
        self.check_write(&state, WriteOperation::DeleteOne)?;
        // Deleting an absent id succeeds.
        state.records.shift_remove(id);
        Ok(())
    }

    fn refresh(&self) -> RollcallResult<()> {
        self.record_call(SourceCall::Refresh)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::Student;

    #[tokio::test]
    async fn test_mock_crud_roundtrip() {
        let source = MockDataSource::<Student>::local();
        let ada = Student::new("Ada");

        source.save(&ada).await.unwrap();
        assert_eq!(source.get_one(&ada.id).await.unwrap().name, "Ada");

        source.update(&ada.renamed("Ada L.")).await.unwrap();
        assert_eq!(source.records()[0].name, "Ada L.");

        source.delete_one(&ada.id).await.unwrap();
        assert!(source.is_empty());
        assert!(source.get_one(&ada.id).await.unwrap_err().is_not_available());
    }

    #[tokio::test]
    async fn test_mock_preserves_insertion_order() {
        let a = Student::new("a");
        let b = Student::new("b");
        let c = Student::new("c");
        let source = MockDataSource::remote().with_records([c.clone(), a.clone(), b.clone()]);

        let names: Vec<_> = source
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_mock_update_missing_record_fails() {
        let source = MockDataSource::<Student>::remote();
        let err = source.update(&Student::new("ghost")).await.unwrap_err();
        assert!(err.is_write_failed());
        assert_eq!(err.tier(), Some(Tier::Remote));
    }

    #[tokio::test]
    async fn test_mock_empty_as_unavailable() {
        let source = MockDataSource::<Student>::local().with_empty_as_unavailable();
        assert!(source.list_all().await.unwrap_err().is_not_available());

        source.insert(Student::new("Ada"));
        assert_eq!(source.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_unavailable_fails_reads_and_writes() {
        let source = MockDataSource::<Student>::remote();
        source.set_available(false);

        let err = source.list_all().await.unwrap_err();
        assert_eq!(err.tier(), Some(Tier::Remote));
        assert!(err.is_not_available());
        assert!(source.save(&Student::new("x")).await.unwrap_err().is_write_failed());
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn test_mock_injected_write_failure() {
        let source = MockDataSource::<Student>::local();
        source.fail_writes(WriteOperation::DeleteAll);

        source.save(&Student::new("x")).await.unwrap();
        assert!(source.delete_all().await.unwrap_err().is_write_failed());
        assert_eq!(source.len(), 1);

        source.clear_failures();
        source.delete_all().await.unwrap();
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn test_read_delay_delivers_value_read_before_write() {
        let source = MockDataSource::local()
            .with_records([Student::from_parts("a", "Ada", None, None)])
            .with_read_delay(Duration::from_millis(30));
        let reader = source.clone();
        let read = tokio::spawn(async move { reader.get_one("a").await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        source.delete_one("a").await.unwrap();
        assert!(!source.contains("a"));

        assert_eq!(read.await.unwrap().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_mock_call_log() {
        let source = MockDataSource::<Student>::local();
        let ada = Student::new("Ada");

        source.save(&ada).await.unwrap();
        let _ = source.get_one("missing").await;
        source.list_all().await.unwrap();
        source.refresh().unwrap();

        assert_eq!(
            source.calls(),
            vec![
                SourceCall::Save(ada.id.clone()),
                SourceCall::GetOne("missing".to_string()),
                SourceCall::ListAll,
                SourceCall::Refresh,
            ]
        );
        assert_eq!(source.write_calls(), 1);
        assert_eq!(source.get_calls(), 1);
        assert_eq!(source.list_calls(), 1);

        source.clear_calls();
        assert_eq!(source.call_count(), 0);
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let source = MockDataSource::<Student>::local();
        let clone = source.clone();
        clone.save(&Student::new("shared")).await.unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.call_count(), 1);
    }
}
