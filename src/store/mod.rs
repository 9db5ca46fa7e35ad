//! Credential storage layer.
//!
//! The store is the source of truth for session credentials; the HTTP
//! client re-reads it before every use.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;

/// Key names as constants.
pub mod keys {
    /// Bearer access token
    pub const TOKEN: &str = "token";
    /// Refresh token exchanged for a new access token
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// JSON-encoded profile of the logged-in user
    pub const USER: &str = "user";
}

/// Persistent string key-value store for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn retrieve(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn store(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every value.
    async fn clear(&self) -> Result<()>;
}
