//! Security domain module
//!
//! Provides encrypted API key storage with AES-256-GCM encryption at rest.
//!
//! # Architecture
//!
//! - **Entities**: `DerivedKey`, `EncryptedSecret`, `SecretValue`
//! - **Services**: `SecretStore` for get/save/clear of the API key
//!
//! # Security Features
//!
//! - AES-256-GCM authenticated encryption
//! - Key derived with SHA-256 from the installation's master secret
//! - Unique IV per encryption operation
//! - Secure memory handling with zeroize-on-drop
//! - Host-pinned key takes priority and is never stored
//!
//! # Example
//!
//! ```ignore
//! use see_core::context::SeeContext;
//!
//! let ctx = SeeContext::in_memory();
//! let secrets = ctx.secrets();
//!
//! secrets.save_key("sk-xxx").await?;
//! let api_key = secrets.get_key().await;
//! // api_key is a SecretValue that will be zeroized when dropped
//! ```

pub mod entity;
pub mod service;

pub use entity::{DerivedKey, EncryptedSecret, IV_MARKER, IV_SIZE, SecretValue};
pub use service::SecretStore;
