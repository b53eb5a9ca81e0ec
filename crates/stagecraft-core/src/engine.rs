//! # Session Engine
//!
//! Facade the UI layer talks to. Owns the envelope contract and the three
//! state callables, and wires them into the serializer, hydrator and backup
//! adapter.
//!
//! The callables are supplied once through [`SessionEngineBuilder`];
//! a missing one is a configuration error at `build()` time rather than a
//! surprise at the first export or import.

use crate::SessionError;
use crate::backup;
use crate::envelope::{Envelope, EnvelopeContract, StandardEnvelope, ValidationReport};
use crate::hydrator::SessionHydrator;
use crate::serializer::SessionSerializer;
use crate::storage::KeyValueStore;
use crate::types::SessionState;
use serde_json::Value;
use std::fmt;
use tracing::info;

type StateAccessor = Box<dyn Fn() -> Option<SessionState>>;
type StateReplacer = Box<dyn Fn(SessionState)>;
type InitialStateFactory = Box<dyn Fn() -> SessionState>;

// =============================================================================
// BUILDER
// =============================================================================

/// Collects the engine's collaborators.
#[derive(Default)]
pub struct SessionEngineBuilder {
    contract: Option<Box<dyn EnvelopeContract>>,
    app_version: Option<String>,
    state_accessor: Option<StateAccessor>,
    state_replacer: Option<StateReplacer>,
    initial_state: Option<InitialStateFactory>,
}

impl SessionEngineBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific envelope contract instead of [`StandardEnvelope`].
    #[must_use]
    pub fn contract(mut self, contract: impl EnvelopeContract + 'static) -> Self {
        self.contract = Some(Box::new(contract));
        self
    }

    /// Version string written into every exported envelope.
    #[must_use]
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn state_accessor(mut self, f: impl Fn() -> Option<SessionState> + 'static) -> Self {
        self.state_accessor = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn state_replacer(mut self, f: impl Fn(SessionState) + 'static) -> Self {
        self.state_replacer = Some(Box::new(f));
        self
    }

    /// Factory for fresh defaults. Called once per import.
    #[must_use]
    pub fn initial_state(mut self, f: impl Fn() -> SessionState + 'static) -> Self {
        self.initial_state = Some(Box::new(f));
        self
    }

    /// Assemble the engine, naming the first missing collaborator on failure.
    pub fn build(self) -> Result<SessionEngine, SessionError> {
        let app_version = self
            .app_version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SessionError::Configuration("app version is required".into()))?;
        let state_accessor = self
            .state_accessor
            .ok_or_else(|| SessionError::Configuration("state accessor is required".into()))?;
        let state_replacer = self
            .state_replacer
            .ok_or_else(|| SessionError::Configuration("state replacer is required".into()))?;

        Ok(SessionEngine {
            contract: self
                .contract
                .unwrap_or_else(|| Box::new(StandardEnvelope::new())),
            app_version,
            state_accessor,
            state_replacer,
            initial_state: self
                .initial_state
                .unwrap_or_else(|| Box::new(SessionState::default)),
        })
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Export, import and backup bound to one live state.
pub struct SessionEngine {
    contract: Box<dyn EnvelopeContract>,
    app_version: String,
    state_accessor: StateAccessor,
    state_replacer: StateReplacer,
    initial_state: InitialStateFactory,
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("app_version", &self.app_version)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    /// Shorthand for [`SessionEngineBuilder::new`].
    #[must_use]
    pub fn builder() -> SessionEngineBuilder {
        SessionEngineBuilder::new()
    }

    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    fn serializer(&self) -> SessionSerializer<&dyn EnvelopeContract> {
        SessionSerializer::new(self.contract.as_ref())
    }

    fn hydrator(&self) -> SessionHydrator<&dyn EnvelopeContract> {
        SessionHydrator::new(self.contract.as_ref())
    }

    /// Serialize the current live state into an envelope.
    pub fn export_document(&self) -> Result<Envelope, SessionError> {
        let envelope = self
            .serializer()
            .serialize(|| (self.state_accessor)(), &self.app_version)?;
        info!(app_version = %self.app_version, "exported session document");
        Ok(envelope)
    }

    /// Serialize the current live state as pretty-printed document text.
    pub fn export_text(&self) -> Result<String, SessionError> {
        self.export_document()?.to_json_pretty()
    }

    /// Validate a document without touching state.
    #[must_use]
    pub fn validate(&self, document: &Value) -> ValidationReport {
        self.hydrator().validate(document)
    }

    /// Validate, reconcile and replace the live state with `document`.
    pub fn import_document(&self, document: &Value) -> Result<SessionState, SessionError> {
        self.hydrator().hydrate(
            document,
            |state| (self.state_replacer)(state),
            || (self.initial_state)(),
        )
    }

    /// Write the current live state to the backup slot.
    pub fn backup<S>(&self, store: &mut S, key: Option<&str>) -> Result<Envelope, SessionError>
    where
        S: KeyValueStore + ?Sized,
    {
        backup::backup(
            store,
            &self.serializer(),
            || (self.state_accessor)(),
            &self.app_version,
            key,
        )
    }

    /// Read the backup slot as an unvalidated document; `None` when absent
    /// or unreadable.
    pub fn restore<S>(&self, store: &S, key: Option<&str>) -> Option<Value>
    where
        S: KeyValueStore + ?Sized,
    {
        backup::restore(store, key)
    }

    /// Restore the backup slot and hydrate it into the live state.
    ///
    /// `Ok(None)` means the slot was empty or unreadable; state is untouched.
    /// A readable slot that fails validation is an `InvalidDocument` error.
    pub fn restore_into_state<S>(
        &self,
        store: &S,
        key: Option<&str>,
    ) -> Result<Option<SessionState>, SessionError>
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(document) = self.restore(store, key) else {
            return Ok(None);
        };
        self.import_document(&document).map(Some)
    }
}

// =============================================================================
// TESTS
// =============================================================================
