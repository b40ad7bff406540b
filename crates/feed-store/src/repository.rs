//! Storage backends for [`StoreState`].
//!
//! The JSON file backend writes the whole state as one pretty-printed
//! document. Saves go through a temporary file and a rename so a crash never
//! leaves a half-written store behind.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use feed_model::StoreState;

use crate::error::{Result, StoreError};

/// Loads and saves the complete store state.
pub trait StateRepository {
    fn load(&self) -> Result<StoreState>;
    fn save(&self, state: &StoreState) -> Result<()>;
}

/// Store kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateRepository for JsonFileRepository {
    /// A missing file is an empty store.
    fn load(&self) -> Result<StoreState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file missing, starting empty");
            return Ok(StoreState::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            operation: "read",
            path: self.path.clone(),
            source,
        })?;
        let state: StoreState =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), shops = state.shops.len(), "loaded store");
        Ok(state)
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create directory for",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|source| StoreError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
            operation: "replace",
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), shops = state.shops.len(), "saved store");
        Ok(())
    }
}

/// Store held in memory, for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RefCell<StoreState>,
}

impl MemoryRepository {
    pub fn new(state: StoreState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    /// Copy of the last saved state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }
}

impl StateRepository for MemoryRepository {
    fn load(&self) -> Result<StoreState> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        *self.state.borrow_mut() = state.clone();
        Ok(())
    }
}

impl<R: StateRepository + ?Sized> StateRepository for &R {
    fn load(&self) -> Result<StoreState> {
        (**self).load()
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        (**self).save(state)
    }
}
