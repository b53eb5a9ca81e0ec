//! # Session Hydrator
//!
//! Imported document -> validated envelope -> reconciled state -> one call to
//! the caller's state replacer. Validation failures never reach the replacer.
//!
//! ## Legacy Shapes
//!
//! An earlier export path wrapped the envelope inside another one. Two
//! variants exist in the wild and both are unwrapped here:
//! - the outer object is not a valid envelope but its `data` is one
//! - the envelope is valid but its `data` holds nothing but a nested `data`

use crate::SessionError;
use crate::envelope::{EnvelopeContract, ValidationReport};
use crate::reconcile::reconcile;
use crate::types::{STATE_SECTIONS, SessionState};
use serde_json::Value;
use tracing::{debug, info};

/// Maximum number of nested `data` layers peeled off a payload.
const MAX_PAYLOAD_NESTING: usize = 3;

/// Turns imported documents into live state.
#[derive(Debug, Clone)]
pub struct SessionHydrator<C> {
    contract: C,
}

impl<C: EnvelopeContract> SessionHydrator<C> {
    /// Create a hydrator around an envelope contract.
    pub fn new(contract: C) -> Self {
        Self { contract }
    }

    /// Validate, reconcile against fresh defaults, and replace state once.
    ///
    /// `initial_state` is invoked on every call so no two hydrations share a
    /// defaults object. Returns the merged state that was handed to
    /// `replace_state`.
    pub fn hydrate<R, I>(
        &self,
        document: &Value,
        replace_state: R,
        initial_state: I,
    ) -> Result<SessionState, SessionError>
    where
        R: FnOnce(SessionState),
        I: FnOnce() -> SessionState,
    {
        let report = self.validate(document);
        if !report.valid {
            debug!(errors = report.errors.len(), "rejected session document");
            return Err(SessionError::InvalidDocument(report.errors));
        }
        let document = self.unwrap_envelope(document);

        let merged = reconcile(&initial_state(), payload_of(document));
        replace_state(merged.clone());

        let format_version = document
            .get("formatVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        info!(format_version, "hydrated session document");
        Ok(merged)
    }

    /// Validate `document` exactly as `hydrate` would, without reconciling.
    #[must_use]
    pub fn validate(&self, document: &Value) -> ValidationReport {
        self.contract.validate_envelope(self.unwrap_envelope(document))
    }

    /// The envelope to validate: the document itself, or its `data` when only
    /// the inner layer is a valid envelope.
    fn unwrap_envelope<'a>(&self, document: &'a Value) -> &'a Value {
        if self.contract.validate_envelope(document).valid {
            return document;
        }
        match document.get("data") {
            Some(inner) if self.contract.validate_envelope(inner).valid => {
                debug!("unwrapped nested session envelope");
                inner
            }
            _ => document,
        }
    }
}

/// The state payload of a validated envelope, peeling redundant `data` layers.
fn payload_of(envelope: &Value) -> &Value {
    let mut payload = &envelope["data"];
    for _ in 0..MAX_PAYLOAD_NESTING {
        let Some(object) = payload.as_object() else {
            break;
        };
        let has_sections = STATE_SECTIONS.iter().any(|key| object.contains_key(*key));
        match object.get("data") {
            Some(inner) if inner.is_object() && !has_sections => payload = inner,
            _ => break,
        }
    }
    payload
}
