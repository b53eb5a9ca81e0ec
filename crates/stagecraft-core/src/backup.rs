//! # Backup / Restore
//!
//! Emergency copy of the live state in a keyed store slot.
//!
//! A corrupted or unreadable backup must never block startup, so `restore`
//! logs and reports "no backup" instead of returning an error. Any slot that
//! parses as JSON is returned untyped: backups written by older releases use
//! older envelope shapes, and deciding whether they are usable is the
//! envelope contract's job at import time. `backup` does
//! propagate failures: the caller asked for a write and needs to know it
//! did not happen.

use crate::SessionError;
use crate::envelope::{Envelope, EnvelopeContract};
use crate::serializer::SessionSerializer;
use crate::storage::KeyValueStore;
use crate::types::SessionState;
use serde_json::Value;
use tracing::{info, warn};

/// Slot used when the caller does not name one.
pub const DEFAULT_BACKUP_KEY: &str = "stagecraft_session_backup";

// =============================================================================
// ERROR LOGGING HELPERS
// =============================================================================

/// Log a restore failure and convert the Result to Option.
///
/// Restore errors are storage errors, not user errors; they surface as a
/// warning in the log and as "no backup" to the caller.
#[inline]
fn log_and_discard<T>(result: Result<T, SessionError>, key: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable session backup");
            None
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Serialize the current state and write it to `key` (or the default slot).
pub fn backup<S, C, F>(
    store: &mut S,
    serializer: &SessionSerializer<C>,
    state_accessor: F,
    app_version: &str,
    key: Option<&str>,
) -> Result<Envelope, SessionError>
where
    S: KeyValueStore + ?Sized,
    C: EnvelopeContract,
    F: FnOnce() -> Option<SessionState>,
{
    let key = key.unwrap_or(DEFAULT_BACKUP_KEY);
    let envelope = serializer.serialize(state_accessor, app_version)?;
    let text = serde_json::to_string(&envelope)
        .map_err(|e| SessionError::SerializationError(e.to_string()))?;

    store.write(key, &text)?;
    info!(key, bytes = text.len(), "session backup written");
    Ok(envelope)
}

/// Read the document stored under `key` (or the default slot).
///
/// Returns `None` when the slot is empty, unreadable, or not JSON.
pub fn restore<S>(store: &S, key: Option<&str>) -> Option<Value>
where
    S: KeyValueStore + ?Sized,
{
    let key = key.unwrap_or(DEFAULT_BACKUP_KEY);
    let text = log_and_discard(store.read(key), key).flatten()?;
    log_and_discard(
        serde_json::from_str::<Value>(&text)
            .map_err(|e| SessionError::SerializationError(e.to_string())),
        key,
    )
}

/// Remove the backup under `key` (or the default slot).
pub fn clear<S>(store: &mut S, key: Option<&str>) -> Result<bool, SessionError>
where
    S: KeyValueStore + ?Sized,
{
    store.remove(key.unwrap_or(DEFAULT_BACKUP_KEY))
}

// =============================================================================
// TESTS
// =============================================================================
