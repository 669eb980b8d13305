//! Core contact types for contactlog.
//!
//! This module defines the record shape persisted in the contact slot along
//! with the input and summary types built around it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single logged contact.
///
/// `number` is an opaque string and acts as the informal identity key. No
/// normalization is ever applied, so `"555-1234"` and `"5551234"` are
/// different contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Display name, not required to be unique.
    pub name: String,

    /// Phone number as entered.
    pub number: String,

    /// Human-readable time captured when the contact was saved.
    pub time: String,

    /// Human-readable place captured when the contact was saved.
    pub location: String,

    /// Optional free-text relation label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,

    /// Whether the contact has been reached.
    #[serde(default)]
    pub contacted: bool,
}

impl ContactRecord {
    /// Check whether this record matches the given name and number exactly.
    #[must_use]
    pub fn matches(&self, name: &str, number: &str) -> bool {
        self.name == name && self.number == number
    }
}

/// A contact as supplied by a caller, before the store assigns its status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub number: String,
    /// Human-readable capture time.
    pub time: String,
    /// Human-readable capture place.
    pub location: String,
    /// Optional relation label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl NewContact {
    /// Reject input that is missing a name or number.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("number", &self.number)
    }

    /// Turn this input into a record that has not been contacted yet.
    #[must_use]
    pub fn into_record(self) -> ContactRecord {
        ContactRecord {
            name: self.name,
            number: self.number,
            time: self.time,
            location: self.location,
            relation: self.relation,
            contacted: false,
        }
    }
}

impl From<ContactRecord> for NewContact {
    fn from(record: ContactRecord) -> Self {
        Self {
            name: record.name,
            number: record.number,
            time: record.time,
            location: record.location,
            relation: record.relation,
        }
    }
}

/// Replacement field values applied by an edit.
///
/// The edit flow rewrites every user-visible field but never touches the
/// `contacted` flag of an existing record.
pub type ContactEdit = NewContact;

/// Ensure a required field is present.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Aggregate counts over a contact collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactStats {
    /// Total number of records.
    pub total: usize,
    /// Records marked as contacted.
    pub contacted: usize,
    /// Records not yet contacted.
    pub not_contacted: usize,
}

impl ContactStats {
    /// Count contacted and not-contacted records.
    #[must_use]
    pub fn from_records(records: &[ContactRecord]) -> Self {
        let contacted = records.iter().filter(|c| c.contacted).count();
        Self {
            total: records.len(),
            contacted,
            not_contacted: records.len() - contacted,
        }
    }

    /// Fraction of records contacted, `0.0` for an empty collection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn contacted_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.contacted as f64 / self.total as f64
        }
    }
}

/// Sort records by name for display, ignoring case.
///
/// The sort is stable, so records sharing a name keep their stored order.
pub fn sort_by_name(records: &mut [ContactRecord]) {
    records.sort_by_cached_key(|c| c.name.to_lowercase());
}
