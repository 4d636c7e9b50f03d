//! Deactivate and uninstall cleanup

use tracing::{info, warn};

use super::ActionOutcome;
use crate::context::SeeContext;
use crate::error::Result;
use crate::storage::keys;

/// Drop the cached domain lists; settings and history stay
pub async fn deactivate(ctx: &SeeContext) -> ActionOutcome<()> {
    ActionOutcome::from_result(clear_transients(ctx).await, "Domain caches cleared.")
}

/// Remove every option and transient this integration owns
///
/// Deletion continues past individual failures; the first error is
/// reported.
pub async fn uninstall(ctx: &SeeContext) -> ActionOutcome<()> {
    let mut first_error = None;
    for name in keys::ALL_OPTIONS {
        if let Err(e) = ctx.options().delete(name).await {
            warn!(option = name, error = %e, "Failed to delete option");
            first_error.get_or_insert(e);
        }
    }
    if let Err(e) = clear_transients(ctx).await {
        first_error.get_or_insert(e);
    }
    ctx.client_cell().reset();

    match first_error {
        None => {
            info!("Removed all stored data");
            ActionOutcome::success("All S.EE data removed.", ())
        }
        Some(e) => ActionOutcome::failure(&e),
    }
}

async fn clear_transients(ctx: &SeeContext) -> Result<()> {
    let mut first_error = None;
    for name in keys::ALL_TRANSIENTS {
        if let Err(e) = ctx.transients().delete(name).await {
            warn!(transient = name, error = %e, "Failed to delete transient");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
