//! Student record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::{new_record_id, RecordId};
use crate::Record;

/// A student enrolled in the roster.
///
/// Immutable after construction. `new`, `with_dob` and `with_mobile` each
/// assign a fresh id; `from_parts` keeps the id it is given, and `renamed`
/// returns a copy that keeps the original id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub mobile: Option<String>,
}

impl Student {
    /// Create a student with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            dob: None,
            mobile: None,
        }
    }

    /// Create a student with a name and date of birth.
    pub fn with_dob(name: impl Into<String>, dob: NaiveDate) -> Self {
        Self {
            dob: Some(dob),
            ..Self::new(name)
        }
    }

    /// Create a student with a name and mobile number.
    pub fn with_mobile(name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            mobile: Some(mobile.into()),
            ..Self::new(name)
        }
    }

    /// Rebuild a student from stored fields, keeping the given id.
    pub fn from_parts(
        id: impl Into<RecordId>,
        name: impl Into<String>,
        dob: Option<NaiveDate>,
        mobile: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dob,
            mobile,
        }
    }

    /// Copy of this student with a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Student {}

impl Record for Student {
    fn record_id(&self) -> &str {
        &self.id
    }
}
