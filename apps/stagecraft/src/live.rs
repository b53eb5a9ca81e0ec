//! # Live Session
//!
//! The host-owned live state. The engine reads it through a snapshot
//! accessor and replaces it through a single replacer; both close over the
//! same shared cell.

use crate::config::StagecraftConfig;
use chrono::Utc;
use stagecraft_core::{RedbStore, SessionEngine, SessionError, SessionState};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{info, warn};

/// Where the live state came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOrigin {
    StateFile,
    Backup,
    Defaults,
}

impl StateOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StateOrigin::StateFile => "state file",
            StateOrigin::Backup => "backup",
            StateOrigin::Defaults => "defaults",
        }
    }
}

/// Shared live state plus the engine bound to it.
#[derive(Debug)]
pub struct LiveSession {
    state: Rc<RefCell<SessionState>>,
    engine: SessionEngine,
    origin: StateOrigin,
}

impl LiveSession {
    /// Wrap `state` and build an engine around it.
    pub fn new(state: SessionState, app_version: &str) -> Result<Self, SessionError> {
        let state = Rc::new(RefCell::new(state));
        let reader = Rc::clone(&state);
        let writer = Rc::clone(&state);

        let engine = SessionEngine::builder()
            .app_version(app_version)
            .state_accessor(move || Some(reader.borrow().clone()))
            .state_replacer(move |next| *writer.borrow_mut() = next)
            .initial_state(SessionState::new)
            .build()?;

        Ok(Self {
            state,
            engine,
            origin: StateOrigin::Defaults,
        })
    }

    /// Load the live state: state file, else backup slot, else defaults.
    ///
    /// A state file that exists but cannot be read is an error. A backup that
    /// cannot be used is logged and skipped.
    pub fn load(config: &StagecraftConfig) -> Result<Self, SessionError> {
        if config.state_path.exists() {
            let state = read_state_file(&config.state_path)?;
            let mut session = Self::new(state, &config.app_version)?;
            session.origin = StateOrigin::StateFile;
            return Ok(session);
        }

        let mut session = Self::new(SessionState::new(), &config.app_version)?;
        if config.store_path.exists() {
            match session.restore_from(&config.store_path, &config.backup_key) {
                Ok(true) => session.origin = StateOrigin::Backup,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "backup unusable, starting from defaults"),
            }
        }
        Ok(session)
    }

    #[must_use]
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    #[must_use]
    pub fn origin(&self) -> StateOrigin {
        self.origin
    }

    /// A copy of the current live state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Hydrate the backup slot `key` from the redb store at `store_path`.
    ///
    /// `Ok(false)` means there was no usable backup; state is untouched.
    pub fn restore_from(&self, store_path: &Path, key: &str) -> Result<bool, SessionError> {
        let store = RedbStore::open(store_path)?;
        Ok(self.engine.restore_into_state(&store, Some(key))?.is_some())
    }

    /// Write the current state to the backup slot `key`.
    pub fn backup_to(&self, store_path: &Path, key: &str) -> Result<(), SessionError> {
        let mut store = RedbStore::open(store_path)?;
        self.engine.backup(&mut store, Some(key))?;
        Ok(())
    }

    /// Stamp `lastSaved` and write the state file.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        self.state.borrow_mut().last_saved = Some(Utc::now());
        let text = serde_json::to_string_pretty(&*self.state.borrow())
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| SessionError::IoError(format!("Write state file: {}", e)))?;
        info!(path = %path.display(), "saved live state");
        Ok(())
    }
}

fn read_state_file(path: &Path) -> Result<SessionState, SessionError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SessionError::IoError(format!("Read state file: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| {
        SessionError::SerializationError(format!(
            "Could not parse state file '{}': {}",
            path.display(),
            e
        ))
    })
}
