//! Shared data model for the budget binder
//!
//! This crate provides the types every other crate works against: expense
//! records and attachment slots, the in-memory session aggregate, the
//! versioned save-state wire schema, and the display helpers for composed
//! expense names and money amounts.

pub mod money;
pub mod name;
pub mod session;
pub mod state;
pub mod types;

pub use money::format_usd;
pub use name::{compose_name, decompose_name, NameFacets, FACET_SEPARATOR};
pub use session::{ExpenseSession, SessionError};
pub use state::{AttachmentManifestEntry, SaveState, SlotManifest, SAVE_KIND, SCHEMA_VERSION};
pub use types::{AttachmentSlot, ExpenseRecord, FileRef, TemplateVersion};
