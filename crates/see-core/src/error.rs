//! Error types for the S.EE integration

use thiserror::Error;

/// Result type alias using the crate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// S.EE error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (E001-E099)
    #[error("S.EE API key is not configured. Set it with `see key set <key>` or the SEE_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection and the API base URL.")]
    NetworkError(#[from] reqwest::Error),

    #[error("S.EE API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: the S.EE API rejected the API key.")]
    Unauthorized,

    #[error("Invalid response from S.EE API: {0}")]
    InvalidResponse(String),

    // Domain errors (E200-E299)
    #[error("No domain available. Please configure a default domain.")]
    NoDomainAvailable,

    // Crypto errors (E300-E399)
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // Storage errors (E400-E499)
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Input errors (E800-E899)
    #[error("{0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E001",
            Self::ConfigError(_) => "E002",
            Self::NetworkError(_) => "E100",
            Self::ApiError { .. } => "E101",
            Self::Unauthorized => "E102",
            Self::InvalidResponse(_) => "E103",
            Self::NoDomainAvailable => "E200",
            Self::EncryptionFailed(_) => "E300",
            Self::StorageError(_) => "E400",
            Self::Serialization(_) => "E401",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingApiKey => Some("see key set <api-key>".to_string()),
            Self::NetworkError(_) => Some("see connection test".to_string()),
            Self::Unauthorized => Some("see key set <api-key>".to_string()),
            Self::NoDomainAvailable => Some("see domains refresh".to_string()),
            Self::ConfigError(_) => Some("see config list".to_string()),
            _ => None,
        }
    }

    /// Whether this error came from talking to the remote service
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_)
                | Self::ApiError { .. }
                | Self::Unauthorized
                | Self::InvalidResponse(_)
        )
    }
}
