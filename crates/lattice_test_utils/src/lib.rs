//! Lattice Test Utilities
//!
//! Shared fixtures for the workspace's integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lattice_test_utils::{wait_for, MemoryIssueTracker, DEFAULT_WAIT};
//!
//! #[tokio::test]
//! async fn test_auto_registration() {
//!     let pr = wait_for(DEFAULT_WAIT, || {
//!         let tracker = tracker.clone();
//!         async move { tracker.get("org/repo", 7).await.ok().flatten() }
//!     })
//!     .await
//!     .expect("PR should be registered");
//! }
//! ```

pub mod fixtures;
pub mod issues;
pub mod wait;

pub use fixtures::{intent_at, question_intent, test_intent};
pub use issues::{MemoryIssueTracker, PostedComment};
pub use wait::{wait_for, DEFAULT_WAIT};
