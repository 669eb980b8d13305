//! Dial-and-save intake.
//!
//! Turns what the user typed into a stored contact: validates the required
//! fields, stamps the current local time, resolves the current place and
//! puts the new record at the front of the list.

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, warn};

use crate::config::TaggingConfig;
use crate::contact::{require, ContactRecord, NewContact};
use crate::error::Result;
use crate::location::Geolocator;
use crate::storage::KeyValueStore;
use crate::store::ContactStore;

/// What the user entered on the dial screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialRequest {
    /// Contact name, required.
    pub name: String,
    /// Phone number, required.
    pub number: String,
    /// Optional relation label. Blank input is stored as no relation.
    pub relation: Option<String>,
}

impl DialRequest {
    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("number", &self.number)
    }
}

/// Tags and saves new contacts.
#[derive(Debug)]
pub struct DialIntake<G> {
    locator: G,
    time_format: String,
    fallback_location: String,
}

impl<G: Geolocator> DialIntake<G> {
    /// Create an intake using the tagging settings from configuration.
    #[must_use]
    pub fn new(locator: G, tagging: &TaggingConfig) -> Self {
        Self {
            locator,
            time_format: tagging.time_format.clone(),
            fallback_location: tagging.fallback_location.clone(),
        }
    }

    /// Format a moment the way contact times are stored.
    #[must_use]
    pub fn format_time<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        at.format(&self.time_format).to_string()
    }

    /// Resolve the current place as a display string.
    ///
    /// Locator failures are logged and fall back to the configured
    /// placeholder; they never fail the save.
    pub async fn resolve_location(&self) -> String {
        match self.locator.locate().await {
            Ok(Some(place)) => place
                .label()
                .unwrap_or_else(|| self.fallback_location.clone()),
            Ok(None) => {
                debug!("No place found for the current position");
                self.fallback_location.clone()
            }
            Err(err) => {
                warn!("Could not resolve location: {}", err);
                self.fallback_location.clone()
            }
        }
    }

    /// Build the record to store for a request at the given moment.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name or number is blank.
    pub async fn prepare<Tz: TimeZone>(
        &self,
        request: DialRequest,
        at: &DateTime<Tz>,
    ) -> Result<NewContact>
    where
        Tz::Offset: std::fmt::Display,
    {
        request.validate()?;

        Ok(NewContact {
            time: self.format_time(at),
            location: self.resolve_location().await,
            relation: request.relation.filter(|r| !r.trim().is_empty()),
            name: request.name,
            number: request.number,
        })
    }

    /// Validate, tag and save a new contact at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns a validation error before touching the store if the name or
    /// number is blank, or a storage error if the save fails.
    pub async fn save<S: KeyValueStore>(
        &self,
        store: &ContactStore<S>,
        request: DialRequest,
    ) -> Result<ContactRecord> {
        let contact = self.prepare(request, &Local::now()).await?;
        store.prepend(contact).await
    }
}
