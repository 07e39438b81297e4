use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use serde_json::Value;
use weather_core::{Config, CurrentWeather, Forecast, Preferences, Units, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "weather_core=trace". Overrides the config file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set endpoints, the preferences file and the log level.
    Configure,

    #[command(flatten)]
    Query(Query),
}

/// Commands served by [`WeatherService`].
#[derive(Debug, Subcommand)]
pub enum Query {
    /// Show current weather for a city.
    Current {
        /// City name, e.g. "Halifax".
        city: String,
    },

    /// Show the daily forecast for a city.
    Forecast {
        /// City name, e.g. "Halifax".
        city: String,
    },

    /// Show tracked cities and preferred units.
    Prefs,

    /// Track one or more cities.
    Add {
        /// Comma-separated list, e.g. "Halifax, Berlin".
        cities: String,
    },

    /// Stop tracking one or more cities.
    Remove {
        /// Comma-separated list, e.g. "Halifax, Berlin".
        cities: String,
    },

    /// Set the preferred unit system.
    Units {
        /// "metric" or "imperial".
        units: String,
    },
}

impl Cli {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(config, self.config.as_deref()),
            Command::Query(query) => {
                let service = WeatherService::from_config(&config)?;
                query.run(&service).await?.print(self.json)
            }
        }
    }
}

impl Query {
    async fn run(self, service: &WeatherService) -> anyhow::Result<Output> {
        let output = match self {
            Query::Current { city } => {
                let current = service.current_weather(&city).await?;
                let units = preferred_units(service);
                Output::new(&current, || format_current(&city, &current, units))?
            }
            Query::Forecast { city } => {
                let forecast = service.forecast(&city).await?;
                let units = preferred_units(service);
                Output::new(&forecast, || format_forecast(&city, &forecast, units))?
            }
            Query::Prefs => {
                let prefs = service.preferences()?;
                Output::new(&prefs, || format_preferences(&prefs))?
            }
            Query::Add { cities } => {
                let prefs = service.add_cities(&cities)?;
                Output::new(&prefs, || format_preferences(&prefs))?
            }
            Query::Remove { cities } => {
                let remaining = service.delete_cities(&cities)?;
                Output::new(&remaining, || format_cities(&remaining))?
            }
            Query::Units { units } => {
                let update = service.update_units(&units)?;
                Output::new(&update, || format!("Units set to {}", update.units))?
            }
        };

        Ok(output)
    }
}

/// Result of a command in both renderings; `--json` picks one.
struct Output {
    json: Value,
    text: String,
}

impl Output {
    fn new<T: serde::Serialize>(value: &T, text: impl FnOnce() -> String) -> anyhow::Result<Self> {
        Ok(Self {
            json: serde_json::to_value(value).context("Failed to serialize output")?,
            text: text(),
        })
    }

    fn print(self, json: bool) -> anyhow::Result<()> {
        if json {
            let pretty = serde_json::to_string_pretty(&self.json).context("Failed to format JSON")?;
            println!("{pretty}");
        } else {
            println!("{}", self.text);
        }
        Ok(())
    }
}

fn configure(mut config: Config, path: Option<&std::path::Path>) -> anyhow::Result<()> {
    config.endpoints.geocode = Text::new("Geocode URL template:")
        .with_default(&config.endpoints.geocode)
        .with_help_message("Must contain {city}")
        .prompt()?;
    config.endpoints.current_weather = Text::new("Current weather URL template:")
        .with_default(&config.endpoints.current_weather)
        .with_help_message("Must contain {latitude} and {longitude}")
        .prompt()?;
    config.endpoints.forecast = Text::new("Forecast URL template:")
        .with_default(&config.endpoints.forecast)
        .with_help_message("Must contain {latitude} and {longitude}")
        .prompt()?;

    let prefs_path = config.preferences_path()?;
    let prefs_path = Text::new("Preferences file:")
        .with_default(&prefs_path.to_string_lossy())
        .prompt()?;
    config.storage.preferences_path = Some(PathBuf::from(prefs_path));

    let level = Select::new("Log level:", vec!["error", "warn", "info", "debug", "trace"])
        .with_starting_cursor(1)
        .prompt()?;
    config.log_level = Some(level.to_string());

    config.validate()?;

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("Configuration saved.");
    Ok(())
}

/// Units used to label weather values. Templates are expected to request
/// matching units from the service (e.g. open-meteo's
/// `temperature_unit=fahrenheit&windspeed_unit=mph` for imperial).
fn preferred_units(service: &WeatherService) -> Units {
    service
        .preferences()
        .map(|prefs| prefs.units)
        .inspect_err(|e| tracing::warn!(error = %e, "Falling back to metric labels"))
        .unwrap_or_default()
}

fn format_current(city: &str, current: &CurrentWeather, units: Units) -> String {
    format!(
        "{city}: {:.1}{}, wind {:.1} {}",
        current.temperature,
        units.temperature_symbol(),
        current.wind_speed,
        units.wind_speed_symbol()
    )
}

fn format_forecast(city: &str, forecast: &Forecast, units: Units) -> String {
    let deg = units.temperature_symbol();
    let mut out = format!("Forecast for {city}:");

    for (date, max, min) in forecast.days() {
        let label = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.format("%a %d %b").to_string())
            .unwrap_or_else(|_| date.to_string());
        out.push_str(&format!("\n  {label:<10}  {min:>5.1}{deg} .. {max:>5.1}{deg}"));
    }

    out
}

fn format_preferences(prefs: &Preferences) -> String {
    format!("{}\nUnits: {}", format_cities(&prefs.cities), prefs.units)
}

fn format_cities(cities: &[String]) -> String {
    if cities.is_empty() {
        "No tracked cities.".to_string()
    } else {
        format!("Tracked cities: {}", cities.join(", "))
    }
}
