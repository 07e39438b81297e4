//! Durable load/save of the preference document.

use std::{
    fmt::Debug,
    fs::{self, File},
    io::{BufReader, ErrorKind, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::model::Preferences;

/// Backend holding the single preference document.
///
/// `load` creates the default document when none exists yet; `save`
/// replaces whatever was stored.
pub trait PreferenceStore: Send + Sync + Debug {
    fn load(&self) -> Result<Preferences>;
    fn save(&self, prefs: &Preferences) -> Result<()>;
}

/// Stores the document as a JSON file.
///
/// Saves go to a temporary file in the same directory which is then renamed
/// over the target, so readers see either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        let write_err = |source: std::io::Error| Error::StorageWrite {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(write_err)?;
                parent
            }
            None => Path::new("."),
        };

        let json = serde_json::to_vec_pretty(prefs).map_err(|e| write_err(e.into()))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self) -> Result<Preferences> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Creating default preferences file");
                let prefs = Preferences::default();
                self.write(&prefs)?;
                return Ok(prefs);
            }
            Err(source) => {
                tracing::error!(path = %self.path.display(), error = %source, "Failed to open preferences file");
                return Err(Error::StorageOpen {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "Failed to decode preferences file");
            Error::StorageDecode {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        self.write(prefs).inspect_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to save preferences");
        })
    }
}

/// Keeps the document in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    prefs: Mutex<Option<Preferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(prefs: Preferences) -> Self {
        Self {
            prefs: Mutex::new(Some(prefs)),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Preferences> {
        Ok(self.prefs.lock().get_or_insert_with(Preferences::default).clone())
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        *self.prefs.lock() = Some(prefs.clone());
        Ok(())
    }
}
