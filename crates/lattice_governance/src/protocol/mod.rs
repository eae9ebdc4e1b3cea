//! Comment protocol.
//!
//! Lattice talks to humans through issue comments. Outgoing comments are
//! plain markdown with a hidden [sentinel](sentinel) line; replies come back
//! as whatever the human typed, usually a copy of the comment with some
//! boxes ticked and a sentence or two added. Decoding has to survive
//! quoting, re-indentation and partial edits.

mod compose;
mod response;
mod sentinel;

pub use compose::{compose_plan, compose_question, compose_status, compose_summary};
pub use response::{parse_response, Response};
pub use sentinel::{extract_sentinel, Sentinel, SentinelKind};

use lattice_ids::IntentId;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Every composed comment starts with a line carrying this prefix.
pub const HEADER_PREFIX: &str = "### Lattice";

/// Instruction line under a checklist.
pub const INSTRUCTIONS: &str = "_Reply with this comment quoted or copied, tick the boxes you agree with, and add any notes below._";

/// Attribution line closing every composed comment.
pub const FOOTER_PREFIX: &str = "<sub>Posted by Lattice";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("no lattice sentinel found")]
    NotFound,

    #[error("unknown sentinel type: '{0}'")]
    UnknownType(String),

    #[error("malformed sentinel attribute: '{0}'")]
    MalformedAttribute(String),

    #[error("sentinel has no intent_id")]
    MissingIntentId,

    #[error("comment was not written by lattice")]
    NotALatticeComment,

    #[error("comment carries no checked items and no text")]
    NotAResponse,
}

/// A reply decoded against the sentinel it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComment {
    pub kind: SentinelKind,
    pub intent_id: IntentId,
    pub version: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub checked: Vec<u32>,
    pub freeform: String,
}

/// Decode a human reply.
///
/// Any sentinel problem surfaces as [`ProtocolError::NotALatticeComment`];
/// the caller only needs to know the comment is not ours.
pub fn parse_comment(body: &str) -> Result<ParsedComment, ProtocolError> {
    let sentinel = extract_sentinel(body).map_err(|err| {
        debug!(error = %err, "comment has no usable sentinel");
        ProtocolError::NotALatticeComment
    })?;
    let response = parse_response(body)?;

    Ok(ParsedComment {
        kind: sentinel.kind,
        version: sentinel.version().map(str::to_string),
        intent_id: sentinel.intent_id,
        attrs: sentinel.attrs,
        checked: response.checked,
        freeform: response.freeform,
    })
}
