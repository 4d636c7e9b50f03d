//! Hosted file actions

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{ActionOutcome, non_blank};
use crate::context::SeeContext;
use crate::domain::history::{HistoryKind, NewHistoryEntry};
use crate::error::{Error, Result};

/// Input for uploading a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    /// Name to upload under; defaults to the file's own name
    pub filename: Option<String>,
    /// Record the upload in the file history
    pub standalone: bool,
}

impl UploadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            filename: None,
            standalone: true,
        }
    }
}

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUploaded {
    pub file_url: String,
    pub delete_key: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
}

/// Reduce a user-supplied name to a safe file name
///
/// Directory components are dropped, whitespace becomes `-` and anything
/// other than letters, digits, `.`, `_` and `-` is removed.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if !(c.is_alphanumeric() || matches!(c, '.' | '_' | '-')) {
            continue;
        }
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches(|c| matches!(c, '.' | '-' | '_'));
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

pub async fn upload_file(ctx: &SeeContext, request: &UploadFile) -> ActionOutcome<FileUploaded> {
    ActionOutcome::from_result(
        try_upload(ctx, request).await,
        "File uploaded to S.EE successfully!",
    )
}

async fn try_upload(ctx: &SeeContext, request: &UploadFile) -> Result<FileUploaded> {
    let is_file = tokio::fs::metadata(&request.path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(Error::InvalidInput(format!(
            "File not found: {}",
            request.path.display()
        )));
    }

    let filename = match non_blank(request.filename.as_deref()) {
        Some(name) => sanitize_filename(name),
        None => sanitize_filename(&request.path.to_string_lossy()),
    };

    let client = ctx.client().await?;
    let uploaded = client.upload_file(&request.path, &filename).await?;
    info!(%filename, url = %uploaded.url, "Uploaded file");

    let history_id = if request.standalone && !uploaded.url.is_empty() {
        let entry = NewHistoryEntry::new(uploaded.url.clone())
            .delete_key(uploaded.delete_key.clone())
            .field("filename", filename.clone());
        match ctx.history().add(HistoryKind::File, entry).await {
            Ok(entry) => Some(entry.id),
            Err(e) => {
                warn!(error = %e, "Failed to record upload in history");
                None
            }
        }
    } else {
        None
    };

    Ok(FileUploaded {
        file_url: uploaded.url,
        delete_key: uploaded.delete_key,
        filename,
        history_id,
    })
}

/// Delete a hosted file by delete key or delete URL
pub async fn delete_file(ctx: &SeeContext, delete_key: &str) -> ActionOutcome<()> {
    ActionOutcome::from_result(
        try_delete(ctx, delete_key).await,
        "File deleted from S.EE successfully!",
    )
}

async fn try_delete(ctx: &SeeContext, delete_key: &str) -> Result<()> {
    let Some(delete_key) = non_blank(Some(delete_key)) else {
        return Err(Error::InvalidInput("Missing delete key.".to_string()));
    };

    let client = ctx.client().await?;
    client.delete_file(delete_key).await?;
    info!("Deleted hosted file");
    Ok(())
}

/// Delete a hosted file without waiting on the outcome
///
/// Used when the local record is removed regardless of what the remote
/// says. Failures are logged so orphaned files can be found later; the
/// return value only reports whether the remote call succeeded.
pub async fn delete_file_best_effort(ctx: &SeeContext, delete_key: Option<&str>) -> bool {
    let Some(delete_key) = non_blank(delete_key) else {
        return false;
    };

    let client = match ctx.client().await {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Skipped remote file delete, remote file may be orphaned");
            return false;
        }
    };

    match client.delete_file(delete_key).await {
        Ok(()) => {
            debug!("Best-effort file delete succeeded");
            true
        }
        Err(e) => {
            warn!(error = %e, "Best-effort file delete failed, remote file may be orphaned");
            false
        }
    }
}

/// Whether new media should be uploaded automatically
pub fn should_auto_upload(enabled: bool, existing_url: Option<&str>) -> bool {
    enabled && non_blank(existing_url).is_none()
}

/// Upload new media when auto-upload is on and it is not uploaded yet
pub async fn maybe_auto_upload(
    ctx: &SeeContext,
    existing_url: Option<&str>,
    path: &Path,
) -> Option<ActionOutcome<FileUploaded>> {
    let enabled = ctx.settings().auto_upload().await;
    if !should_auto_upload(enabled, existing_url) {
        return None;
    }

    let request = UploadFile {
        standalone: false,
        ..UploadFile::new(path)
    };
    Some(upload_file(ctx, &request).await)
}
