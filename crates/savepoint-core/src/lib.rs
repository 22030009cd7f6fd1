//! Zip save-point codec
//!
//! A save point is a zip archive carrying the canonical session state
//! (`state.json`), a rendered copy of the progress report, and every
//! uploaded attachment as its own entry. Restoring reproduces the session
//! exactly: identical record fields and byte-identical attachment payloads.

pub mod codec;
pub mod error;

pub use codec::{read_save_point, write_save_point, REPORT_ENTRY, STATE_ENTRY};
pub use error::SavePointError;
