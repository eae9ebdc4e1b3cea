//! In-memory issue tracker.

use async_trait::async_trait;
use lattice_governance::{CommentRef, IssueRef, IssueTracker, TrackerError};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

/// A comment as stored by [`MemoryIssueTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub comment: CommentRef,
    pub body: String,
}

#[derive(Default)]
struct State {
    next_comment_id: u64,
    comments: Vec<PostedComment>,
    labels: HashMap<IssueRef, BTreeSet<String>>,
    label_ops: Vec<String>,
}

/// Records everything the bridge does to issues. Labels come back sorted.
#[derive(Default)]
pub struct MemoryIssueTracker {
    state: Mutex<State>,
}

impl MemoryIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed labels as if a human had applied them.
    pub async fn set_labels(&self, issue: &IssueRef, labels: &[&str]) {
        let mut state = self.state.lock().await;
        state.labels.insert(
            issue.clone(),
            labels.iter().map(|label| label.to_string()).collect(),
        );
    }

    pub async fn labels(&self, issue: &IssueRef) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .labels
            .get(issue)
            .map(|labels| labels.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn comments(&self, issue: &IssueRef) -> Vec<PostedComment> {
        let state = self.state.lock().await;
        state
            .comments
            .iter()
            .filter(|posted| &posted.comment.issue == issue)
            .cloned()
            .collect()
    }

    /// Label edits in call order, as `+label` / `-label`.
    pub async fn label_ops(&self) -> Vec<String> {
        self.state.lock().await.label_ops.clone()
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<CommentRef, TrackerError> {
        let mut state = self.state.lock().await;
        state.next_comment_id += 1;
        let comment = CommentRef {
            issue: issue.clone(),
            id: state.next_comment_id,
        };
        state.comments.push(PostedComment {
            comment: comment.clone(),
            body: body.to_string(),
        });
        Ok(comment)
    }

    async fn update_comment(&self, comment: &CommentRef, body: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock().await;
        let posted = state
            .comments
            .iter_mut()
            .find(|posted| &posted.comment == comment)
            .ok_or_else(|| TrackerError::NotFound(format!("comment {}", comment.id)))?;
        posted.body = body.to_string();
        Ok(())
    }

    async fn fetch_comment(&self, comment: &CommentRef) -> Result<String, TrackerError> {
        let state = self.state.lock().await;
        state
            .comments
            .iter()
            .find(|posted| &posted.comment == comment)
            .map(|posted| posted.body.clone())
            .ok_or_else(|| TrackerError::NotFound(format!("comment {}", comment.id)))
    }

    async fn apply_label(&self, issue: &IssueRef, label: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock().await;
        state
            .labels
            .entry(issue.clone())
            .or_default()
            .insert(label.to_string());
        state.label_ops.push(format!("+{}", label));
        Ok(())
    }

    async fn remove_label(&self, issue: &IssueRef, label: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock().await;
        if let Some(labels) = state.labels.get_mut(issue) {
            labels.remove(label);
        }
        state.label_ops.push(format!("-{}", label));
        Ok(())
    }

    async fn list_labels(&self, issue: &IssueRef) -> Result<Vec<String>, TrackerError> {
        Ok(self.labels(issue).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_comments_round_trip() {
        let tracker = MemoryIssueTracker::new();
        let issue = IssueRef::new("org/repo", 1);

        let first = tracker.create_comment(&issue, "one").await.unwrap();
        let second = tracker.create_comment(&issue, "two").await.unwrap();
        assert_ne!(first.id, second.id);

        tracker.update_comment(&first, "uno").await.unwrap();
        assert_eq!(tracker.fetch_comment(&first).await.unwrap(), "uno");
        assert_eq!(tracker.comments(&issue).await.len(), 2);

        let missing = CommentRef {
            issue: issue.clone(),
            id: 99,
        };
        assert!(tracker.fetch_comment(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_labels() {
        let tracker = MemoryIssueTracker::new();
        let issue = IssueRef::new("org/repo", 2);
        tracker.set_labels(&issue, &["bug"]).await;

        tracker.apply_label(&issue, "intent-approved").await.unwrap();
        tracker.remove_label(&issue, "bug").await.unwrap();

        assert_eq!(tracker.list_labels(&issue).await.unwrap(), vec!["intent-approved"]);
        assert_eq!(tracker.label_ops().await, vec!["+intent-approved", "-bug"]);
    }
}
