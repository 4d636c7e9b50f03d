//! Share and upload history
//!
//! Two bounded lists (`text_history`, `file_history`) record what was
//! shared from the administrator's tooling so it can be reviewed, copied
//! and deleted later. Lists are newest-first and trimmed on insert.

pub mod entity;
pub mod service;

pub use entity::{HistoryEntry, HistoryKind, NewHistoryEntry, RESERVED_FIELDS};
pub use service::{DEFAULT_MAX_ENTRIES, HistoryStore};
