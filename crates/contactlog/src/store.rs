//! The contact store.
//!
//! The whole contact list lives as one JSON array in one slot of a
//! [`KeyValueStore`]. Every operation is a full read, an in-memory change and
//! a full write back. Nothing coordinates overlapping writers: the last
//! write replaces the whole list.
//!
//! A slot holding something that is not a contact list is treated as empty.
//! That event is logged at `warn` and reported through [`Snapshot`] so a
//! front end can tell the user their old data was unreadable.

use tracing::{debug, info, warn};

use crate::contact::{ContactEdit, ContactRecord, ContactStats, NewContact};
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// Name of the slot that holds the contact list by default.
pub const DEFAULT_SLOT_KEY: &str = "contacts";

/// The result of reading the contact slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// The decoded contacts, empty when the slot was absent or unreadable.
    pub contacts: Vec<ContactRecord>,
    /// Set when the slot held data that could not be decoded and was ignored.
    pub discarded_corrupt: bool,
}

/// Gateway to the persisted contact list.
#[derive(Debug)]
pub struct ContactStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> ContactStore<S> {
    /// Create a store using the default slot name.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_SLOT_KEY)
    }

    /// Create a store using a custom slot name.
    #[must_use]
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Get the slot name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the slot, reporting whether corrupt data was discarded.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails. Undecodable data
    /// is never an error.
    pub async fn load(&self) -> Result<Snapshot> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            debug!("Slot {} is empty", self.key);
            return Ok(Snapshot::default());
        };

        match decode(&self.key, &raw) {
            Ok(contacts) => {
                debug!("Loaded {} contacts from slot {}", contacts.len(), self.key);
                Ok(Snapshot {
                    contacts,
                    discarded_corrupt: false,
                })
            }
            Err(err) if err.is_parse_fault() => {
                warn!("{}; treating contact list as empty", err);
                Ok(Snapshot {
                    contacts: Vec::new(),
                    discarded_corrupt: true,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Check whether the slot currently holds data that cannot be decoded.
    ///
    /// Any write replaces such data, so front ends check this before
    /// mutating to tell the user what is about to be lost.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn is_corrupt(&self) -> Result<bool> {
        Ok(self.load().await?.discarded_corrupt)
    }

    /// Read every contact.
    ///
    /// An absent slot and an undecodable slot both yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn get_all(&self) -> Result<Vec<ContactRecord>> {
        Ok(self.load().await?.contacts)
    }

    /// Replace the whole contact list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the backend write fails.
    pub async fn save_all(&self, records: &[ContactRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(&self.key, &raw).await?;
        info!("Saved {} contacts to slot {}", records.len(), self.key);
        Ok(())
    }

    /// Append a contact. The stored record is always not-contacted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the slot fails.
    pub async fn add(&self, contact: NewContact) -> Result<ContactRecord> {
        let record = contact.into_record();
        let mut contacts = self.get_all().await?;
        contacts.push(record.clone());
        self.save_all(&contacts).await?;
        Ok(record)
    }

    /// Insert a contact at the front of the list, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the slot fails.
    pub async fn prepend(&self, contact: NewContact) -> Result<ContactRecord> {
        let record = contact.into_record();
        let mut contacts = self.get_all().await?;
        contacts.insert(0, record.clone());
        self.save_all(&contacts).await?;
        Ok(record)
    }

    /// Mark every contact matching both `name` and `number` as contacted.
    ///
    /// Matching is exact and case-sensitive. The list is written back even
    /// when nothing matched. Returns the number of matching records,
    /// including any that were already contacted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the slot fails.
    pub async fn mark_contacted(&self, name: &str, number: &str) -> Result<usize> {
        let mut contacts = self.get_all().await?;

        let mut matched = 0;
        for contact in contacts.iter_mut().filter(|c| c.matches(name, number)) {
            contact.contacted = true;
            matched += 1;
        }

        self.save_all(&contacts).await?;
        debug!("Marked {} contacts as contacted", matched);
        Ok(matched)
    }

    /// Rewrite every contact whose number equals `original_number`.
    ///
    /// Name, number, time, location and relation are replaced; the
    /// contacted flag is kept. When nothing matched, the edit is appended as
    /// a new, not-contacted record. Returns the number of records replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the slot fails.
    pub async fn update_by_number(&self, original_number: &str, edit: ContactEdit) -> Result<usize> {
        let mut contacts = self.get_all().await?;

        let mut replaced = 0;
        for contact in contacts
            .iter_mut()
            .filter(|c| c.number == original_number)
        {
            *contact = ContactRecord {
                contacted: contact.contacted,
                ..edit.clone().into_record()
            };
            replaced += 1;
        }

        if replaced == 0 {
            debug!("No contact with number {}; appending", original_number);
            contacts.push(edit.into_record());
        }

        self.save_all(&contacts).await?;
        Ok(replaced)
    }

    /// Edit the first contact with `number` by applying `edit` to its
    /// current fields, then write the result to every contact with that
    /// number through [`Self::update_by_number`].
    ///
    /// When nothing has that number, `edit` starts from a blank contact
    /// carrying only the number, and the result is appended. Returns the
    /// number of records replaced.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without writing, if the edited contact
    /// has a blank name or number. Returns a storage error if reading or
    /// writing the slot fails.
    pub async fn edit_by_number<F>(&self, number: &str, edit: F) -> Result<usize>
    where
        F: FnOnce(NewContact) -> NewContact + Send,
    {
        let current = self
            .find_by_number(number)
            .await?
            .into_iter()
            .next()
            .map_or_else(
                || NewContact {
                    number: number.to_string(),
                    ..NewContact::default()
                },
                NewContact::from,
            );

        let edited = edit(current);
        edited.validate()?;
        self.update_by_number(number, edited).await
    }

    /// Find all contacts with exactly this number.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn find_by_number(&self, number: &str) -> Result<Vec<ContactRecord>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|c| c.number == number)
            .collect())
    }

    /// Count contacted and not-contacted records.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn stats(&self) -> Result<ContactStats> {
        Ok(ContactStats::from_records(&self.get_all().await?))
    }
}

/// Decode a raw slot value. An empty string counts as an empty list.
fn decode(key: &str, raw: &str) -> Result<Vec<ContactRecord>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| Error::parse(key, e))
}
