//! Place resolution for newly logged contacts.
//!
//! The store only ever sees the rendered place string. Where that string
//! comes from is behind the [`Geolocator`] trait so a device provider, a
//! configured fixed place, or nothing at all can be plugged in.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A reverse-geocoded place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    /// City or town.
    pub city: Option<String>,
    /// Region, state or province.
    pub region: Option<String>,
    /// Country.
    pub country: Option<String>,
}

impl Place {
    /// Create a place from its parts.
    #[must_use]
    pub fn new(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> Self {
        Self {
            city: city.map(str::to_string),
            region: region.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    /// Render the non-empty parts joined by `", "`.
    ///
    /// Returns `None` when every part is missing or blank.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// A source of the device's current place.
#[async_trait]
pub trait Geolocator: Send + Sync + fmt::Debug {
    /// Resolve the current place.
    ///
    /// `Ok(None)` means the provider worked but found no address.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider is unavailable, for example when
    /// permission was denied.
    async fn locate(&self) -> Result<Option<Place>>;
}

#[async_trait]
impl<T: Geolocator + ?Sized> Geolocator for Box<T> {
    async fn locate(&self) -> Result<Option<Place>> {
        (**self).locate().await
    }
}

/// Always reports the same place.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    place: Place,
}

impl FixedGeolocator {
    /// Create a locator for a fixed place.
    #[must_use]
    pub fn new(place: Place) -> Self {
        Self { place }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Option<Place>> {
        Ok(Some(self.place.clone()))
    }
}

/// Never finds a place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocator;

#[async_trait]
impl Geolocator for NoGeolocator {
    async fn locate(&self) -> Result<Option<Place>> {
        Ok(None)
    }
}

/// Build a locator from an optional configured place.
#[must_use]
pub fn geolocator_for(place: Option<&Place>) -> Box<dyn Geolocator> {
    match place {
        Some(place) => Box::new(FixedGeolocator::new(place.clone())),
        None => Box::new(NoGeolocator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_full() {
        let place = Place::new(Some("Windhoek"), Some("Khomas"), Some("Namibia"));
        assert_eq!(place.label().as_deref(), Some("Windhoek, Khomas, Namibia"));
    }

    #[test]
    fn test_label_skips_missing_and_blank_parts() {
        let place = Place::new(Some("Windhoek"), Some("  "), Some("Namibia"));
        assert_eq!(place.label().as_deref(), Some("Windhoek, Namibia"));

        let place = Place::new(None, Some("Khomas"), None);
        assert_eq!(place.label().as_deref(), Some("Khomas"));
    }

    #[test]
    fn test_label_empty() {
        assert!(Place::default().label().is_none());
        assert!(Place::new(Some(""), None, Some(" ")).label().is_none());
    }

    #[tokio::test]
    async fn test_fixed_geolocator() {
        let place = Place::new(Some("Windhoek"), None, None);
        let locator = FixedGeolocator::new(place.clone());
        assert_eq!(locator.locate().await.unwrap(), Some(place));
    }

    #[tokio::test]
    async fn test_no_geolocator() {
        assert!(NoGeolocator.locate().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_geolocator_for() {
        let place = Place::new(Some("Lagos"), None, Some("Nigeria"));
        let located = geolocator_for(Some(&place)).locate().await.unwrap();
        assert_eq!(located, Some(place));

        assert!(geolocator_for(None).locate().await.unwrap().is_none());
    }
}
