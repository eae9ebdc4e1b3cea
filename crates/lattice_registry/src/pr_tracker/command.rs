//! Command types for PR tracker message passing
//!
//! Commands are sent from [`PrTrackerHandle`](super::PrTrackerHandle) to the
//! tracker task. Each command includes a Responder channel for returning
//! results.

use super::PrUpdate;
use crate::{Responder, Result};
use lattice_ids::IntentId;
use lattice_types::{PrChanges, PrKey, PrState, PullRequest};

/// Commands sent to the PR tracker task
#[derive(Debug)]
pub(crate) enum TrackerCommand {
    // ========================================================================
    // Mutations
    // ========================================================================
    /// Insert unless the key is already tracked; answers with the stored value
    Register {
        pr: PullRequest,
        respond: Responder<PullRequest>,
    },

    /// Apply field changes to a tracked PR
    Update {
        key: PrKey,
        changes: PrChanges,
        respond: Responder<Result<PrUpdate>>,
    },

    // ========================================================================
    // Queries
    // ========================================================================
    Get {
        key: PrKey,
        respond: Responder<Option<PullRequest>>,
    },

    ForIntent {
        intent_id: IntentId,
        respond: Responder<Vec<PullRequest>>,
    },

    ByState {
        state: PrState,
        respond: Responder<Vec<PullRequest>>,
    },

    /// PRs whose review state asks something of the author
    NeedsAttention {
        respond: Responder<Vec<PullRequest>>,
    },

    List {
        respond: Responder<Vec<PullRequest>>,
    },

    // ========================================================================
    // Control Commands
    // ========================================================================
    /// Request graceful shutdown
    Shutdown,
}
