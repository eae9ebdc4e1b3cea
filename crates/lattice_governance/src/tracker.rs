//! Issue tracker capability.
//!
//! Lattice never talks to GitHub (or anything else) directly. Whoever
//! embeds it supplies an [`IssueTracker`]; the governance bridge only
//! needs these six calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An issue (or pull request) that hosts governance comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRef {
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    pub fn new(repo: impl Into<String>, number: u64) -> Self {
        Self {
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRef {
    pub issue: IssueRef,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_comment(&self, issue: &IssueRef, body: &str)
        -> Result<CommentRef, TrackerError>;

    async fn update_comment(&self, comment: &CommentRef, body: &str) -> Result<(), TrackerError>;

    async fn fetch_comment(&self, comment: &CommentRef) -> Result<String, TrackerError>;

    async fn apply_label(&self, issue: &IssueRef, label: &str) -> Result<(), TrackerError>;

    async fn remove_label(&self, issue: &IssueRef, label: &str) -> Result<(), TrackerError>;

    async fn list_labels(&self, issue: &IssueRef) -> Result<Vec<String>, TrackerError>;
}
