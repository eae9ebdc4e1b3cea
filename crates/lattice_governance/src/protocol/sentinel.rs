//! Sentinel lines.
//!
//! Every comment Lattice posts carries one machine-readable HTML comment:
//!
//! ```text
//! <!-- lattice:question intent_id=int_0d3f... version=2 -->
//! ```
//!
//! Markdown renderers hide it, and it survives humans quoting or editing
//! the rest of the comment.

use super::ProtocolError;
use lattice_ids::IntentId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub(crate) static SENTINEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--\s*lattice:([^\s>]*)(.*?)-->").expect("sentinel pattern is valid")
});

const INTENT_ID_ATTR: &str = "intent_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentinelKind {
    Question,
    Plan,
    Summary,
    Status,
}

impl SentinelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentinelKind::Question => "question",
            SentinelKind::Plan => "plan",
            SentinelKind::Summary => "summary",
            SentinelKind::Status => "status",
        }
    }
}

impl fmt::Display for SentinelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentinelKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(SentinelKind::Question),
            "plan" => Ok(SentinelKind::Plan),
            "summary" => Ok(SentinelKind::Summary),
            "status" => Ok(SentinelKind::Status),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// A decoded sentinel. `attrs` holds everything except `intent_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    pub kind: SentinelKind,
    pub intent_id: IntentId,
    pub attrs: BTreeMap<String, String>,
}

impl Sentinel {
    pub fn new(kind: SentinelKind, intent_id: IntentId) -> Self {
        Self {
            kind,
            intent_id,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.attrs.get("version").map(String::as_str)
    }

    /// Render the sentinel line. Attribute values must not contain
    /// whitespace.
    pub fn render(&self) -> String {
        let mut line = format!(
            "<!-- lattice:{} {}={}",
            self.kind, INTENT_ID_ATTR, self.intent_id
        );
        for (key, value) in &self.attrs {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line.push_str(" -->");
        line
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Decode the first sentinel in `body`.
pub fn extract_sentinel(body: &str) -> Result<Sentinel, ProtocolError> {
    let caps = SENTINEL_RE.captures(body).ok_or(ProtocolError::NotFound)?;
    let kind: SentinelKind = caps[1].parse()?;

    let mut intent_id = None;
    let mut attrs = BTreeMap::new();
    for token in caps[2].split_whitespace() {
        let (key, value) = split_attr(token)?;
        if key == INTENT_ID_ATTR {
            let id = IntentId::parse(value)
                .map_err(|_| ProtocolError::MalformedAttribute(token.to_string()))?;
            intent_id = Some(id);
        } else {
            attrs.insert(key.to_string(), value.to_string());
        }
    }

    Ok(Sentinel {
        kind,
        intent_id: intent_id.ok_or(ProtocolError::MissingIntentId)?,
        attrs,
    })
}

fn split_attr(token: &str) -> Result<(&str, &str), ProtocolError> {
    let malformed = || ProtocolError::MalformedAttribute(token.to_string());
    let (key, value) = token.split_once('=').ok_or_else(malformed)?;
    let value = value.trim_matches('"');

    let key_ok = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !key_ok || value.is_empty() {
        return Err(malformed());
    }
    Ok((key, value))
}
