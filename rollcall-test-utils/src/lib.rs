//! ROLLCALL Test Utilities
//!
//! Centralized test infrastructure for the ROLLCALL workspace:
//! - Proptest generators for students and rosters
//! - Fixtures for seeded data sources and repositories
//! - Custom assertions for tier outcomes

// Re-export the mock data source from its source crate
pub use rollcall_storage::{
    CacheState, CacheStats, DataSource, MockDataSource, MockRepository, Repository, SourceCall,
};

// Re-export core types for convenience
pub use rollcall_core::{
    Record, RecordId, RepositoryConfig, RollcallError, RollcallResult, StorageError, Student,
    Tier, ValidationError, WriteOperation, WritePolicy,
};

use chrono::NaiveDate;
use std::sync::Arc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating ROLLCALL records.

    use super::*;
    use proptest::prelude::*;
    use uuid::Builder;

    /// Generate a record id in the canonical UUIDv7 form.
    ///
    /// Built from a generated timestamp and random bits, so failing cases
    /// replay and shrink.
    pub fn arb_record_id() -> impl Strategy<Value = RecordId> {
        // 2020-01-01 to 2030-01-01 in Unix milliseconds
        (1_577_836_800_000u64..1_893_456_000_000u64, any::<[u8; 10]>()).prop_map(
            |(millis, random)| {
                Builder::from_unix_timestamp_millis(millis, &random)
                    .into_uuid()
                    .to_string()
            },
        )
    }

    /// Generate a short human-readable id, handy for readable failures.
    pub fn arb_short_id() -> impl Strategy<Value = RecordId> {
        "[a-z][a-z0-9]{0,11}"
    }

    /// Generate a student name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Z][a-z]{1,15}",
            "[A-Z][a-z]{1,10} [A-Z][a-z]{1,12}",
            // Edge case: single character
            Just("X".to_string()),
        ]
    }

    /// Generate a date of birth between 1950 and 2020.
    pub fn arb_dob() -> impl Strategy<Value = NaiveDate> {
        (1950i32..2020, 1u32..=12, 1u32..=28).prop_map(|(year, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
        })
    }

    /// Generate a mobile number.
    pub fn arb_mobile() -> impl Strategy<Value = String> {
        prop_oneof!["\\+[1-9][0-9]{7,12}", "0[0-9]{9}",]
    }

    /// Generate a student using any of the partial constructors.
    pub fn arb_student() -> impl Strategy<Value = Student> {
        (
            arb_name(),
            proptest::option::of(arb_dob()),
            proptest::option::of(arb_mobile()),
        )
            .prop_map(|(name, dob, mobile)| Student {
                dob,
                mobile,
                ..Student::new(name)
            })
    }

    /// Generate a student with a short id.
    pub fn arb_student_with_short_id() -> impl Strategy<Value = Student> {
        (
            arb_short_id(),
            arb_name(),
            proptest::option::of(arb_dob()),
            proptest::option::of(arb_mobile()),
        )
            .prop_map(|(id, name, dob, mobile)| Student::from_parts(id, name, dob, mobile))
    }

    /// Generate a roster of up to `max` students with unique ids.
    pub fn arb_roster(max: usize) -> impl Strategy<Value = Vec<Student>> {
        prop::collection::vec(arb_student_with_short_id(), 0..=max).prop_map(|students| {
            let mut seen = std::collections::HashSet::new();
            students
                .into_iter()
                .filter(|s| seen.insert(s.id.clone()))
                .collect()
        })
    }

    /// Generate a write policy.
    pub fn arb_write_policy() -> impl Strategy<Value = WritePolicy> {
        prop_oneof![Just(WritePolicy::Optimistic), Just(WritePolicy::Confirmed)]
    }

    /// Generate a repository configuration.
    pub fn arb_repository_config() -> impl Strategy<Value = RepositoryConfig> {
        (arb_write_policy(), any::<bool>()).prop_map(|(policy, write_back)| {
            RepositoryConfig::default()
                .with_write_policy(policy)
                .with_write_back(write_back)
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A student with a fixed, readable id.
    pub fn student(id: &str, name: &str) -> Student {
        Student::from_parts(id, name, None, None)
    }

    /// Three students with ids `a`, `b`, `c`.
    pub fn sample_roster() -> Vec<Student> {
        vec![
            Student::from_parts(
                "a",
                "Ada Lovelace",
                NaiveDate::from_ymd_opt(1815, 12, 10),
                None,
            ),
            Student::from_parts("b", "Bo Diddley", None, Some("+15550100".to_string())),
            student("c", "Cy Young"),
        ]
    }

    /// Local source that reports an empty store as not available, the way an
    /// empty on-device table does.
    pub fn empty_local() -> MockDataSource<Student> {
        MockDataSource::local().with_empty_as_unavailable()
    }

    /// Remote source seeded with `records`.
    pub fn seeded_remote(records: impl IntoIterator<Item = Student>) -> MockDataSource<Student> {
        MockDataSource::remote().with_records(records)
    }

    /// Ids of `records`, in order.
    pub fn ids<R: Record>(records: &[R]) -> Vec<&str> {
        records.iter().map(Record::record_id).collect()
    }

    /// Forget the call logs of both tiers behind `repo`.
    pub fn clear_calls<R: Record>(repo: &MockRepository<R>) {
        repo.local().clear_calls();
        repo.remote().clear_calls();
    }

    /// Repository over the given sources with default configuration.
    pub fn repository_with_defaults(
        local: MockDataSource<Student>,
        remote: MockDataSource<Student>,
    ) -> MockRepository<Student> {
        Repository::with_defaults(Arc::new(local), Arc::new(remote))
    }

    /// Repository whose cache was loaded from a local tier holding `records`,
    /// with both call logs cleared afterwards.
    pub async fn local_loaded_repository(
        records: Vec<Student>,
    ) -> RollcallResult<MockRepository<Student>> {
        let repo = repository_with_defaults(
            MockDataSource::local().with_records(records),
            MockDataSource::remote(),
        );
        repo.list_all().await?;
        clear_calls(&repo);
        Ok(repo)
    }

    /// Repository over the given sources.
    pub fn repository(
        local: MockDataSource<Student>,
        remote: MockDataSource<Student>,
        config: RepositoryConfig,
    ) -> MockRepository<Student> {
        Repository::new(Arc::new(local), Arc::new(remote), config)
    }

    /// Repository whose local tier is empty and whose remote tier holds the
    /// sample roster.
    pub fn remote_only_repository() -> MockRepository<Student> {
        repository(
            empty_local(),
            seeded_remote(sample_roster()),
            RepositoryConfig::default(),
        )
    }

    /// Repository with both tiers holding the sample roster.
    pub fn mirrored_repository(config: RepositoryConfig) -> MockRepository<Student> {
        repository(
            MockDataSource::local().with_records(sample_roster()),
            MockDataSource::remote().with_records(sample_roster()),
            config,
        )
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for tier outcomes.

    use super::*;

    /// Assert that a RollcallResult is a not-available outcome from `tier`.
    #[track_caller]
    pub fn assert_not_available<T: std::fmt::Debug>(result: &RollcallResult<T>, tier: Tier) {
        match result {
            Err(RollcallError::Storage(StorageError::NotAvailable { tier: t, .. })) => {
                assert_eq!(*t, tier, "Wrong tier in NotAvailable error");
            }
            other => panic!("Expected NotAvailable from {tier} tier, got: {other:?}"),
        }
    }

    /// Assert that a RollcallResult is a write failure from `tier`.
    #[track_caller]
    pub fn assert_write_failed<T: std::fmt::Debug>(result: &RollcallResult<T>, tier: Tier) {
        match result {
            Err(RollcallError::Storage(StorageError::WriteFailed { tier: t, .. })) => {
                assert_eq!(*t, tier, "Wrong tier in WriteFailed error");
            }
            other => panic!("Expected WriteFailed from {tier} tier, got: {other:?}"),
        }
    }

    /// Assert that a RollcallResult is a validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &RollcallResult<T>) {
        match result {
            Err(RollcallError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    /// Assert that neither tier behind `repo` has been called.
    #[track_caller]
    pub fn assert_untouched<R: Record>(repo: &MockRepository<R>) {
        assert!(
            repo.local().calls().is_empty(),
            "local tier was called: {:?}",
            repo.local().calls()
        );
        assert!(
            repo.remote().calls().is_empty(),
            "remote tier was called: {:?}",
            repo.remote().calls()
        );
    }

    /// Assert that two record lists hold the same ids in the same order.
    #[track_caller]
    pub fn assert_same_ids<R: Record>(actual: &[R], expected: &[R]) {
        assert_eq!(fixtures::ids(actual), fixtures::ids(expected));
    }
}
