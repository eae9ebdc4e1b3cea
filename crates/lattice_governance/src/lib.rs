//! Lattice governance.
//!
//! Everything needed to put an intent in front of a human and act on the
//! answer:
//!
//! - [`labels`]: the three issue labels that mirror the approval gate
//! - [`protocol`]: composing Lattice comments and decoding replies
//! - [`decision`]: turning a reply or a label into approve/reject/clarify
//! - [`GovernanceBridge`]: drives all of the above against an
//!   [`IssueTracker`]

pub mod bridge;
pub mod decision;
pub mod error;
pub mod labels;
pub mod protocol;
pub mod tracker;

pub use bridge::{GovernanceBridge, Resolution};
pub use decision::{decision_from_label, ApprovalOptions, Decision};
pub use error::{GovernanceError, Result};
pub use labels::{GovernanceLabel, LabelError, LabelPlan};
pub use protocol::{parse_comment, ParsedComment, ProtocolError, SentinelKind};
pub use tracker::{CommentRef, IssueRef, IssueTracker, TrackerError};
