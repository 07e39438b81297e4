//! Load → mutate → save operations on the preference document.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Preferences, Units, UnitsUpdate};
use crate::storage::PreferenceStore;

/// Applies city and unit changes to the stored preferences.
///
/// Each call loads, mutates and saves independently. Concurrent callers
/// are not serialized: two overlapping updates both start from the same
/// document and the later save wins. Wrap the store in something that
/// serializes writers if that matters.
#[derive(Debug, Clone)]
pub struct PreferenceManager {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceManager {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Result<Preferences> {
        self.store
            .load()
            .inspect_err(|e| tracing::error!(error = %e, "Error loading preferences"))
    }

    /// Track every city in the comma-separated `raw` list. Cities already
    /// tracked under any casing are skipped.
    pub fn add_cities(&self, raw: &str) -> Result<Preferences> {
        if raw.is_empty() {
            return Err(Error::CityRequired);
        }

        let mut prefs = self.get()?;
        for city in prefs.add_cities(raw) {
            tracing::debug!(city = %city, "City already tracked");
        }

        self.save(&prefs)?;
        tracing::info!(cities = ?prefs.cities, "Updated tracked cities");
        Ok(prefs)
    }

    /// Stop tracking every city in the comma-separated `raw` list and
    /// return the remaining cities. Unknown names are logged and ignored.
    pub fn delete_cities(&self, raw: &str) -> Result<Vec<String>> {
        if raw.is_empty() {
            return Err(Error::CityRequired);
        }

        let mut prefs = self.get()?;
        for city in prefs.remove_cities(raw) {
            tracing::warn!(city = %city, "City not found");
        }

        self.save(&prefs)?;
        tracing::info!(cities = ?prefs.cities, "Updated tracked cities");
        Ok(prefs.cities)
    }

    pub fn update_units(&self, candidate: &str) -> Result<UnitsUpdate> {
        let units: Units = candidate.parse().inspect_err(|_| {
            tracing::warn!(units = candidate, "Invalid unit type");
        })?;

        let mut prefs = self.get()?;
        prefs.units = units;

        self.save(&prefs)?;
        tracing::info!(%units, "Updated units");
        Ok(UnitsUpdate { units })
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        self.store
            .save(prefs)
            .inspect_err(|e| tracing::error!(error = %e, "Error saving preferences"))
    }
}
