//! JSON file credential storage (feature-gated).

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use plugin_session_core::{CredentialStore, StoreError};

const APP_DIR: &str = "plugin-session";
const FILE_NAME: &str = "credentials.json";

/// Credential store persisted as a flat JSON object.
///
/// Every write rewrites the whole file through a temporary sibling, so a
/// crash never leaves a truncated file behind. The in-memory view only
/// changes once the file has been written.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Credential store opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Open the store in the user's configuration directory.
    ///
    /// # Errors
    /// Returns error if there is no configuration directory or the file
    /// cannot be read.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()?)
    }

    /// `<config dir>/plugin-session/credentials.json`.
    ///
    /// # Errors
    /// Returns error if the platform has no configuration directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
            .ok_or_else(|| StoreError::Internal("No configuration directory".to_string()))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        let mut staged = entries.clone();
        staged.insert(key.to_string(), value.to_string());
        self.persist(&staged)?;

        *entries = staged;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut staged = entries.clone();
        staged.remove(key);
        self.persist(&staged)?;

        *entries = staged;
        Ok(())
    }
}
