//! Artifact links: "this intent produced (or consumed) that thing".

use chrono::{DateTime, Utc};
use lattice_ids::{IntentId, LinkId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of external artifact a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    PullRequest,
    Issue,
    Commit,
    Branch,
    Document,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::PullRequest => "pull_request",
            ArtifactKind::Issue => "issue",
            ArtifactKind::Commit => "commit",
            ArtifactKind::Branch => "branch",
            ArtifactKind::Document => "document",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pull_request" => Ok(ArtifactKind::PullRequest),
            "issue" => Ok(ArtifactKind::Issue),
            "commit" => Ok(ArtifactKind::Commit),
            "branch" => Ok(ArtifactKind::Branch),
            "document" => Ok(ArtifactKind::Document),
            _ => Err(format!("Invalid artifact kind: '{}'", s)),
        }
    }
}

/// How the intent relates to the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// The intent read it
    Input,
    /// The intent produced it
    Output,
    /// Mentioned for context only
    Reference,
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactRole::Input => "input",
            ArtifactRole::Output => "output",
            ArtifactRole::Reference => "reference",
        };
        write!(f, "{}", s)
    }
}

/// A recorded link between an intent and an external artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactLink {
    pub id: LinkId,
    pub intent_id: IntentId,
    pub kind: ArtifactKind,
    /// Artifact reference within its system (PR number, commit sha, ...)
    #[serde(rename = "ref")]
    pub reference: String,
    pub role: ArtifactRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Repository the artifact lives in, as `owner/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

impl ArtifactLink {
    pub fn new(
        intent_id: IntentId,
        kind: ArtifactKind,
        reference: impl Into<String>,
        role: ArtifactRole,
    ) -> Self {
        Self {
            id: LinkId::new(),
            intent_id,
            kind,
            reference: reference.into(),
            role,
            url: None,
            repo: None,
            inserted_at: Utc::now(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Resolve `(repo, number)` for a pull request link.
    ///
    /// The explicit `repo`/`ref` fields win; the URL
    /// (`https://host/<owner>/<repo>/pull/<n>`) fills whatever is missing.
    /// Returns `None` for non-PR links or when either half is unknown.
    pub fn pull_request_key(&self) -> Option<(String, u64)> {
        if self.kind != ArtifactKind::PullRequest {
            return None;
        }

        let from_url = self.url.as_deref().and_then(parse_pull_url);
        let number = self
            .reference
            .trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .ok()
            .or_else(|| from_url.as_ref().map(|(_, n)| *n))?;
        let repo = self
            .repo
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| from_url.map(|(r, _)| r))?;

        Some((repo, number))
    }
}

fn parse_pull_url(raw: &str) -> Option<(String, u64)> {
    let parsed = url::Url::parse(raw).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let idx = segments
        .iter()
        .position(|s| *s == "pull" || *s == "pulls" || *s == "merge_requests")?;
    if idx < 2 {
        return None;
    }
    let number = segments.get(idx + 1)?.parse::<u64>().ok()?;
    Some((format!("{}/{}", segments[idx - 2], segments[idx - 1]), number))
}
