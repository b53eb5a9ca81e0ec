//! # Stagecraft Library
//!
//! Library interface for the Stagecraft CLI host.
//!
//! Exposes the pieces the binary is assembled from so integration tests can
//! drive them without spawning a process:
//! - `cli` - clap definitions and command implementations
//! - `config` - layered configuration
//! - `live` - the live session state owned by this host
//! - `transfer` - document download and pick-and-parse

pub mod cli;
pub mod config;
pub mod live;
pub mod transfer;

pub use config::StagecraftConfig;
pub use live::LiveSession;
pub use transfer::{PickedDocument, pick_file, suggested_filename, trigger_download};
