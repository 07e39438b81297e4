use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::fetch::{LATITUDE_PLACEHOLDER, LONGITUDE_PLACEHOLDER};
use crate::geocode::CITY_PLACEHOLDER;

pub const DEFAULT_GEOCODE_URL: &str =
    "https://geocoding-api.open-meteo.com/v1/search?name={city}&count=1&language=en&format=json";
pub const DEFAULT_CURRENT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast?latitude={latitude}&longitude={longitude}&current_weather=true";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast?latitude={latitude}&longitude={longitude}&daily=temperature_2m_max,temperature_2m_min&timezone=auto";

const PREFERENCES_FILE: &str = "userdata.json";

/// URL templates for the upstream services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Must contain `{city}`.
    pub geocode: String,
    /// Must contain `{latitude}` and `{longitude}`.
    pub current_weather: String,
    /// Must contain `{latitude}` and `{longitude}`.
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: DEFAULT_GEOCODE_URL.to_string(),
            current_weather: DEFAULT_CURRENT_WEATHER_URL.to_string(),
            forecast: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Where the preference document lives. Defaults to the platform data dir.
    pub preferences_path: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// log_level = "info"
///
/// [endpoints]
/// geocode = "https://geocoding-api.open-meteo.com/v1/search?name={city}"
///
/// [storage]
/// preferences_path = "/home/me/.weather/userdata.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter directive, e.g. "info" or "weather_core=debug".
    pub log_level: Option<String>,
    pub endpoints: Endpoints,
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from the platform config file, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults when the file is absent.
    /// Environment overrides are applied on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::read(path)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the platform config file, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Configured preferences file, or `userdata.json` in the platform data dir.
    pub fn preferences_path(&self) -> Result<PathBuf> {
        match &self.storage.preferences_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join(PREFERENCES_FILE)),
        }
    }

    /// Check that every URL template carries the placeholders it needs.
    pub fn validate(&self) -> Result<()> {
        let geocode = &self.endpoints.geocode;
        if !geocode.contains(CITY_PLACEHOLDER) {
            bail!(
                "Geocode URL must contain {CITY_PLACEHOLDER}{}: {geocode}",
                printf_hint(geocode)
            );
        }

        for (name, template) in [
            ("Current weather", &self.endpoints.current_weather),
            ("Forecast", &self.endpoints.forecast),
        ] {
            if !template.contains(LATITUDE_PLACEHOLDER) || !template.contains(LONGITUDE_PLACEHOLDER) {
                bail!(
                    "{name} URL must contain {LATITUDE_PLACEHOLDER} and {LONGITUDE_PLACEHOLDER}{}: {template}",
                    printf_hint(template)
                );
            }
        }

        Ok(())
    }

    /// Apply the deployment environment variables, looked up through `var`.
    ///
    /// Templates from older deployments use printf verbs (`%s` for the city,
    /// `%f` for latitude then longitude); those are rewritten to the named
    /// placeholders.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("GEOCODE_API_URL") {
            self.endpoints.geocode = named_placeholders(url, &[CITY_PLACEHOLDER]);
        }
        if let Some(url) = var("CURRENT_WEATHER_API_URL") {
            self.endpoints.current_weather =
                named_placeholders(url, &[LATITUDE_PLACEHOLDER, LONGITUDE_PLACEHOLDER]);
        }
        if let Some(url) = var("FORECAST_WEATHER_API_URL") {
            self.endpoints.forecast =
                named_placeholders(url, &[LATITUDE_PLACEHOLDER, LONGITUDE_PLACEHOLDER]);
        }
        if let Some(path) = var("DATABASE_URL") {
            self.storage.preferences_path = Some(PathBuf::from(path));
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = Some(level);
        }
    }
}

const PRINTF_VERBS: [&str; 3] = ["%s", "%f", "%v"];

/// Replace printf verbs in `template`, left to right, with `names`.
/// Templates that already use any named placeholder are left alone.
fn named_placeholders(template: String, names: &[&str]) -> String {
    if names.iter().any(|name| template.contains(name)) {
        return template;
    }

    let mut out = template;
    for name in names {
        let Some(pos) = PRINTF_VERBS.iter().filter_map(|verb| out.find(verb)).min() else {
            break;
        };
        out.replace_range(pos..pos + 2, name);
    }
    out
}

fn printf_hint(template: &str) -> &'static str {
    if PRINTF_VERBS.iter().any(|verb| template.contains(verb)) {
        " (printf-style %s/%f verbs are not supported, use the named placeholder)"
    } else {
        ""
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_open_meteo_and_validate() {
        let cfg = Config::default();

        assert!(cfg.endpoints.geocode.starts_with("https://geocoding-api.open-meteo.com"));
        cfg.validate().expect("defaults must be valid");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::read(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[endpoints]\ngeocode = \"https://geo.example.com/search?name={city}\"\n",
        )
        .expect("write");

        let cfg = Config::read(&path).expect("load");

        assert_eq!(cfg.endpoints.geocode, "https://geo.example.com/search?name={city}");
        assert_eq!(cfg.endpoints.forecast, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.storage.preferences_path, None);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            log_level: Some("debug".into()),
            storage: StorageConfig {
                preferences_path: Some(dir.path().join("prefs.json")),
            },
            ..Config::default()
        };

        cfg.save_to(&path).expect("save");
        assert_eq!(Config::read(&path).expect("load"), cfg);
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GEOCODE_API_URL", "https://geo.example.com/?q={city}"),
            ("DATABASE_URL", "/tmp/prefs.json"),
            ("LOG_LEVEL", "debug"),
        ]);
        let mut cfg = Config::default();

        cfg.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.endpoints.geocode, "https://geo.example.com/?q={city}");
        assert_eq!(cfg.endpoints.current_weather, DEFAULT_CURRENT_WEATHER_URL);
        assert_eq!(
            cfg.preferences_path().expect("path"),
            PathBuf::from("/tmp/prefs.json")
        );
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn printf_style_overrides_become_named_placeholders() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GEOCODE_API_URL", "https://geo.example.com/search?name=%s&count=1"),
            (
                "CURRENT_WEATHER_API_URL",
                "https://wx.example.com/v1?latitude=%f&longitude=%f&current_weather=true",
            ),
            (
                "FORECAST_WEATHER_API_URL",
                "https://wx.example.com/v1?latitude={latitude}&longitude={longitude}&q=%s",
            ),
        ]);
        let mut cfg = Config::default();

        cfg.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            cfg.endpoints.geocode,
            "https://geo.example.com/search?name={city}&count=1"
        );
        assert_eq!(
            cfg.endpoints.current_weather,
            "https://wx.example.com/v1?latitude={latitude}&longitude={longitude}&current_weather=true"
        );
        assert_eq!(
            cfg.endpoints.forecast,
            "https://wx.example.com/v1?latitude={latitude}&longitude={longitude}&q=%s"
        );
        cfg.validate().expect("rewritten templates are valid");
    }

    #[test]
    fn validate_points_printf_templates_at_named_placeholders() {
        let mut cfg = Config::default();
        cfg.endpoints.geocode = "https://geo.example.com/search?name=%s".into();

        let msg = cfg.validate().unwrap_err().to_string();

        assert!(msg.contains("{city}"));
        assert!(msg.contains("printf-style"));
    }

    #[test]
    fn malformed_file_is_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoints = 3").expect("write");

        let err = Config::read(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn validate_rejects_missing_placeholders() {
        let mut cfg = Config::default();
        cfg.endpoints.geocode = "https://geo.example.com/search".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("{city}"));

        let mut cfg = Config::default();
        cfg.endpoints.forecast = "https://wx.example.com/?latitude={latitude}".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Forecast URL"));
    }
}
