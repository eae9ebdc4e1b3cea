//! Error types for the registries.

use thiserror::Error;

/// Registry operation result type.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No entry under the given key
    #[error("Not found: {repo}#{number}")]
    NotFound { repo: String, number: u64 },

    /// The owning task has stopped
    #[error("Registry unavailable: {0} task is not running")]
    ActorUnavailable(&'static str),
}

impl RegistryError {
    /// Create a not found error.
    pub fn not_found(repo: impl Into<String>, number: u64) -> Self {
        Self::NotFound {
            repo: repo.into(),
            number,
        }
    }
}
