use crate::labels::LabelError;
use crate::protocol::{ProtocolError, SentinelKind};
use crate::tracker::TrackerError;
use lattice_ids::IntentId;
use lattice_intent::LifecycleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GovernanceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("issue tracker: {0}")]
    Tracker(#[from] TrackerError),

    #[error("reply is for intent {found}, expected {expected}")]
    IntentMismatch { expected: IntentId, found: IntentId },

    #[error("a {0} comment cannot decide an approval")]
    UnexpectedComment(SentinelKind),
}
