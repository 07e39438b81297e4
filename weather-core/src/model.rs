use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Geographic position returned by the geocoding service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub wind_speed: f64,
}

/// Daily forecast as parallel sequences; all three have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub dates: Vec<String>,
    pub max_temps: Vec<f64>,
    pub min_temps: Vec<f64>,
}

impl Forecast {
    /// Rows of `(date, max, min)`.
    pub fn days(&self) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.max_temps)
            .zip(&self.min_temps)
            .map(|((date, max), min)| (date.as_str(), *max, *min))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = Error;

    /// Exact, case-sensitive match against the two unit names.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(Error::InvalidUnit(value.to_string())),
        }
    }
}

/// The persisted preference document.
///
/// No two entries of `cities` compare equal ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub cities: Vec<String>,
    pub units: Units,
}

impl Preferences {
    /// Append every city from a comma-separated list that is not already
    /// tracked (ignoring case). Returns the skipped duplicates.
    pub fn add_cities(&mut self, raw: &str) -> Vec<String> {
        let mut skipped = Vec::new();

        for candidate in split_cities(raw) {
            if self.position_of(candidate).is_some() {
                skipped.push(candidate.to_string());
            } else {
                self.cities.push(candidate.to_string());
            }
        }

        skipped
    }

    /// Remove the first case-insensitive match for every city in a
    /// comma-separated list. Returns the names that matched nothing.
    pub fn remove_cities(&mut self, raw: &str) -> Vec<String> {
        let mut missing = Vec::new();

        for candidate in split_cities(raw) {
            match self.position_of(candidate) {
                Some(idx) => {
                    self.cities.remove(idx);
                }
                None => missing.push(candidate.to_string()),
            }
        }

        missing
    }

    fn position_of(&self, city: &str) -> Option<usize> {
        self.cities
            .iter()
            .position(|existing| eq_ignore_case(existing, city))
    }
}

/// Splits on commas, trims each piece and drops empty ones.
pub fn split_cities(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|city| !city.is_empty())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Result of a unit update, serialized as `{"units": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsUpdate {
    pub units: Units,
}
