//! User-facing actions
//!
//! Each action validates its input, performs the remote call through the
//! context's client and converts every failure into an
//! [`ActionOutcome::Failure`] carrying the error code and a message. No
//! action returns a bare error, so one failed operation never takes down
//! the request that ran it.
//!
//! # Actions
//!
//! - `short_url`: create/delete short URLs, auto-shorten on publish
//! - `text`: share/delete text snippets
//! - `file`: upload/delete hosted files, auto-upload of new media
//! - `connection`: test a key, refresh domain lists
//! - `settings`: save the API key and the other settings
//! - `history`: remove history entries
//! - `lifecycle`: deactivate and uninstall cleanup
//! - `format`: link formats for copying

pub mod connection;
pub mod file;
pub mod format;
pub mod history;
pub mod lifecycle;
pub mod settings;
pub mod short_url;
pub mod text;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;

/// Structured result of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome<T> {
    Success { message: String, data: T },
    Failure { code: String, message: String },
}

impl<T> ActionOutcome<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::Success {
            message: message.into(),
            data,
        }
    }

    /// Failure from an error, logged according to its kind
    pub fn failure(error: &Error) -> Self {
        if error.is_transport() {
            warn!(code = error.code(), error = %error, "Action failed");
        } else {
            debug!(code = error.code(), error = %error, "Action rejected");
        }
        Self::Failure {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Failure with a message that differs from the error's own
    pub fn failure_with(error: &Error, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(code = error.code(), %message, "Action failed");
        Self::Failure {
            code: error.code().to_string(),
            message,
        }
    }

    pub fn from_result(result: crate::Result<T>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::success(message, data),
            Err(e) => Self::failure(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// Error code of a failure
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { code, .. } => Some(code),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

/// Trim an optional input, treating blank as absent
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
