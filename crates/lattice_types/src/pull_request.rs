//! Tracked pull requests and field-level change sets.

use chrono::{DateTime, Utc};
use lattice_ids::IntentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Registry key: `(repo, number)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrKey {
    pub repo: String,
    pub number: u64,
}

impl PrKey {
    pub fn new(repo: impl Into<String>, number: u64) -> Self {
        Self {
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    #[default]
    Open,
    Merged,
    Closed,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Merged => "merged",
            PrState::Closed => "closed",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PrState::Open),
            "merged" => Ok(PrState::Merged),
            "closed" => Ok(PrState::Closed),
            _ => Err(format!(
                "Invalid PR state: '{}'. Expected: open, merged, or closed",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    Pending,
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Pending => "pending",
            ReviewState::Approved => "approved",
            ReviewState::ChangesRequested => "changes_requested",
            ReviewState::Commented => "commented",
            ReviewState::Dismissed => "dismissed",
        }
    }

    /// A human asked for something and is waiting on the author.
    pub fn needs_attention(&self) -> bool {
        matches!(self, ReviewState::ChangesRequested)
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Webhooks send upper-case review states ("CHANGES_REQUESTED").
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewState::Pending),
            "approved" => Ok(ReviewState::Approved),
            "changes_requested" => Ok(ReviewState::ChangesRequested),
            "commented" => Ok(ReviewState::Commented),
            "dismissed" => Ok(ReviewState::Dismissed),
            _ => Err(format!("Invalid review state: '{}'", s)),
        }
    }
}

/// A pull request tracked by the PR registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repo: String,
    pub number: u64,
    pub intent_id: Option<IntentId>,
    pub title: String,
    pub state: PrState,
    pub review_state: ReviewState,
    pub mergeable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    /// A freshly opened PR awaiting review.
    pub fn new(repo: impl Into<String>, number: u64, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            repo: repo.into(),
            number,
            intent_id: None,
            title: title.into(),
            state: PrState::Open,
            review_state: ReviewState::Pending,
            mergeable: None,
            url: None,
            inserted_at: now,
            updated_at: now,
        }
    }

    pub fn with_intent(mut self, intent_id: IntentId) -> Self {
        self.intent_id = Some(intent_id);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn key(&self) -> PrKey {
        PrKey::new(self.repo.clone(), self.number)
    }

    /// Apply `changes`, returning only the fields whose value actually
    /// changed. `updated_at` moves only when something changed.
    pub fn apply(&mut self, changes: &PrChanges) -> Vec<FieldChange> {
        let mut delta = Vec::new();

        if let Some(title) = &changes.title {
            if *title != self.title {
                delta.push(FieldChange::new(PrField::Title, &self.title, title));
                self.title = title.clone();
            }
        }
        if let Some(state) = changes.state {
            if state != self.state {
                delta.push(FieldChange::new(PrField::State, &self.state, &state));
                self.state = state;
            }
        }
        if let Some(review_state) = changes.review_state {
            if review_state != self.review_state {
                delta.push(FieldChange::new(
                    PrField::ReviewState,
                    &self.review_state,
                    &review_state,
                ));
                self.review_state = review_state;
            }
        }
        if let Some(mergeable) = changes.mergeable {
            if mergeable != self.mergeable {
                delta.push(FieldChange::new(PrField::Mergeable, &self.mergeable, &mergeable));
                self.mergeable = mergeable;
            }
        }
        if let Some(intent_id) = &changes.intent_id {
            if self.intent_id.as_ref() != Some(intent_id) {
                delta.push(FieldChange::new(
                    PrField::IntentId,
                    &self.intent_id,
                    &Some(intent_id),
                ));
                self.intent_id = Some(intent_id.clone());
            }
        }
        if let Some(url) = &changes.url {
            if self.url.as_ref() != Some(url) {
                delta.push(FieldChange::new(PrField::Url, &self.url, &Some(url)));
                self.url = Some(url.clone());
            }
        }

        if !delta.is_empty() {
            self.updated_at = Utc::now();
        }
        delta
    }
}

/// Proposed field values for an update. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrChanges {
    pub title: Option<String>,
    pub state: Option<PrState>,
    pub review_state: Option<ReviewState>,
    /// `Some(None)` resets mergeability to unknown.
    pub mergeable: Option<Option<bool>>,
    pub intent_id: Option<IntentId>,
    pub url: Option<String>,
}

impl PrChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn state(mut self, state: PrState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn review_state(mut self, review_state: ReviewState) -> Self {
        self.review_state = Some(review_state);
        self
    }

    pub fn mergeable(mut self, mergeable: Option<bool>) -> Self {
        self.mergeable = Some(mergeable);
        self
    }

    pub fn intent_id(mut self, intent_id: IntentId) -> Self {
        self.intent_id = Some(intent_id);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrField {
    Title,
    State,
    ReviewState,
    Mergeable,
    IntentId,
    Url,
}

impl fmt::Display for PrField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrField::Title => "title",
            PrField::State => "state",
            PrField::ReviewState => "review_state",
            PrField::Mergeable => "mergeable",
            PrField::IntentId => "intent_id",
            PrField::Url => "url",
        };
        write!(f, "{}", s)
    }
}

/// One `{field, old, new}` triple of an update delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: PrField,
    pub old: Value,
    pub new: Value,
}

impl FieldChange {
    fn new<O: Serialize + ?Sized, N: Serialize + ?Sized>(field: PrField, old: &O, new: &N) -> Self {
        Self {
            field,
            old: serde_json::to_value(old).unwrap_or(Value::Null),
            new: serde_json::to_value(new).unwrap_or(Value::Null),
        }
    }
}
