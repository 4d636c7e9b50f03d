//! History actions

use super::{ActionOutcome, non_blank};
use crate::context::SeeContext;
use crate::domain::history::{HistoryEntry, HistoryKind};
use crate::error::Error;

/// Entries of one history, newest first
pub async fn list_history(ctx: &SeeContext, kind: HistoryKind) -> ActionOutcome<Vec<HistoryEntry>> {
    ActionOutcome::from_result(ctx.history().list(kind).await, "History loaded.")
}

/// Remove one entry from a history
///
/// Only the local record goes away; the short link, text or file stays on
/// S.EE. Removing an id that is not there is not an error.
pub async fn remove_history_entry(ctx: &SeeContext, kind: HistoryKind, id: &str) -> ActionOutcome<bool> {
    let Some(id) = non_blank(Some(id)) else {
        return ActionOutcome::failure_with(
            &Error::InvalidInput("Invalid history ID.".to_string()),
            "Invalid entry.",
        );
    };

    match ctx.history().remove(kind, id).await {
        Ok(removed) => ActionOutcome::success("History entry removed.", removed),
        Err(e) => ActionOutcome::failure(&e),
    }
}
