//! # Session Serializer
//!
//! Live state snapshot -> organized payload -> envelope. No side effects;
//! the caller decides whether the envelope is downloaded or backed up.

use crate::SessionError;
use crate::envelope::{Envelope, EnvelopeContract};
use crate::payload::build;
use crate::types::SessionState;
use tracing::debug;

/// Produces portable documents from live state.
#[derive(Debug, Clone)]
pub struct SessionSerializer<C> {
    contract: C,
}

impl<C: EnvelopeContract> SessionSerializer<C> {
    /// Create a serializer around an envelope contract.
    pub fn new(contract: C) -> Self {
        Self { contract }
    }

    /// Serialize whatever the accessor currently yields.
    ///
    /// Returns `SessionError::StateUnavailable` when the accessor yields `None`.
    pub fn serialize<F>(&self, state_accessor: F, app_version: &str) -> Result<Envelope, SessionError>
    where
        F: FnOnce() -> Option<SessionState>,
    {
        let state = state_accessor().ok_or(SessionError::StateUnavailable)?;
        let payload = build(&state);
        let data = serde_json::to_value(&payload)
            .map_err(|e| SessionError::SerializationError(format!("Payload: {}", e)))?;

        debug!(app_version, "serialized session payload");
        Ok(self.contract.create_envelope(app_version, data))
    }
}
