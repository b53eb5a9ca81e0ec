//! # stagecraft-core
//!
//! Session state serialization and reconciliation for the Stagecraft
//! planning tool.
//!
//! The engine turns the live in-memory state of a planning session into a
//! versioned, self-describing portable document, and turns such documents
//! (including ones written by older releases) back into a complete state.
//!
//! ## Pipeline
//!
//! - Export: state -> `payload::build` -> `EnvelopeContract::create_envelope`
//! - Import: document -> `EnvelopeContract::validate_envelope` ->
//!   `reconcile::reconcile` against fresh defaults -> one state replacement
//! - Backup: export written to a [`KeyValueStore`] slot; restore is lenient
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never mutates state except through the caller's replacer, once per import
//! - Shape mismatches inside a valid document degrade to defaults, never fail

// =============================================================================
// MODULES
// =============================================================================

pub mod backup;
pub mod engine;
pub mod envelope;
pub mod hydrator;
pub mod payload;
pub mod reconcile;
pub mod serializer;
pub mod storage;
pub mod types;
pub mod vocabulary;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Alternative, FieldMap, NavigationProgress, PartCompletion, PositioningData, STATE_SECTIONS,
    SessionError, SessionState, StageId, ValueProposition, View, parse_timestamp,
};

// =============================================================================
// RE-EXPORTS: Document Pipeline
// =============================================================================

pub use envelope::{
    Envelope, EnvelopeContract, FORMAT_VERSION, SUPPORTED_FORMAT_VERSIONS, StandardEnvelope,
    ValidationReport,
};
pub use hydrator::SessionHydrator;
pub use payload::{CategorizedSegments, OrganizedPayload, build, categorize, flatten_segments};
pub use reconcile::{AlternativeRecord, normalize_alternatives, reconcile};
pub use serializer::SessionSerializer;
pub use vocabulary::SegmentGroup;

// =============================================================================
// RE-EXPORTS: Backup & Engine
// =============================================================================

pub use backup::DEFAULT_BACKUP_KEY;
pub use engine::{SessionEngine, SessionEngineBuilder};
pub use storage::{KeyValueStore, MemoryStore, RedbStore};
