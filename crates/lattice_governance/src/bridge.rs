//! Governance bridge.
//!
//! Ties the lifecycle, the labels and the comment protocol to an issue
//! tracker. The bridge holds no intent state of its own: callers pass the
//! current intent in and store the one that comes back.

use crate::decision::{decision_from_label, ApprovalOptions, Decision};
use crate::error::{GovernanceError, Result};
use crate::labels::{self, LabelPlan};
use crate::protocol::{compose_question, parse_comment, SentinelKind};
use crate::tracker::{CommentRef, IssueRef, IssueTracker};
use lattice_events::{Event, EventBus};
use lattice_intent::{transition, Intent, IntentState};
use tracing::{debug, info};

/// Outcome of a human decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: Intent,
    pub decision: Decision,
}

impl Resolution {
    /// Whether the gate was left (approved or rejected).
    pub fn is_settled(&self) -> bool {
        self.decision.target_state().is_some()
    }
}

pub struct GovernanceBridge<T> {
    tracker: T,
    options: ApprovalOptions,
    bus: Option<EventBus>,
}

impl<T: IssueTracker> GovernanceBridge<T> {
    pub fn new(tracker: T, options: ApprovalOptions) -> Self {
        Self {
            tracker,
            options,
            bus: None,
        }
    }

    /// Publish `IntentTransitioned` for every transition the bridge makes.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn options(&self) -> &ApprovalOptions {
        &self.options
    }

    /// Move the intent to the approval gate, post the question and label
    /// the issue.
    pub async fn request_approval(
        &self,
        intent: &Intent,
        issue: &IssueRef,
        actor: Option<&str>,
    ) -> Result<(Intent, CommentRef)> {
        let next = transition(
            intent,
            IntentState::AwaitingApproval,
            actor,
            Some("approval requested"),
        )?;

        let body = compose_question(&next, &self.options.items());
        let comment = self.tracker.create_comment(issue, &body).await?;
        self.sync_labels(issue, next.state).await?;

        info!(intent_id = %next.id, issue = %issue, comment = comment.id, "approval requested");
        self.announce(intent, &next, actor);
        Ok((next, comment))
    }

    /// Apply a human reply to the approval question.
    ///
    /// A reply that decides nothing leaves the intent at the gate and comes
    /// back as [`Decision::Clarify`].
    pub async fn apply_reply(
        &self,
        intent: &Intent,
        issue: &IssueRef,
        body: &str,
        actor: Option<&str>,
    ) -> Result<Resolution> {
        let parsed = parse_comment(body)?;
        if parsed.kind != SentinelKind::Question {
            return Err(GovernanceError::UnexpectedComment(parsed.kind));
        }
        if parsed.intent_id != intent.id {
            return Err(GovernanceError::IntentMismatch {
                expected: intent.id.clone(),
                found: parsed.intent_id,
            });
        }

        let decision = self.options.decide_comment(&parsed);
        let reason = if parsed.freeform.is_empty() {
            None
        } else {
            Some(parsed.freeform.as_str())
        };
        self.resolve(intent, issue, decision, actor, reason).await
    }

    /// Apply a decision a human expressed by labelling the issue.
    pub async fn apply_label_decision(
        &self,
        intent: &Intent,
        issue: &IssueRef,
        label: &str,
        actor: Option<&str>,
    ) -> Result<Resolution> {
        let decision = decision_from_label(label)?;
        let reason = format!("label {}", label);
        self.resolve(intent, issue, decision, actor, Some(&reason))
            .await
    }

    /// Bring the issue's governance labels in line with `state`.
    pub async fn sync_labels(&self, issue: &IssueRef, state: IntentState) -> Result<LabelPlan> {
        let current = self.tracker.list_labels(issue).await?;
        let plan = labels::reconcile(&current, state);
        for label in &plan.add {
            self.tracker.apply_label(issue, label.as_str()).await?;
        }
        for label in &plan.remove {
            self.tracker.remove_label(issue, label.as_str()).await?;
        }
        if !plan.is_empty() {
            debug!(issue = %issue, add = ?plan.add, remove = ?plan.remove, "labels reconciled");
        }
        Ok(plan)
    }

    async fn resolve(
        &self,
        intent: &Intent,
        issue: &IssueRef,
        decision: Decision,
        actor: Option<&str>,
        reason: Option<&str>,
    ) -> Result<Resolution> {
        let Some(to) = decision.target_state() else {
            debug!(intent_id = %intent.id, "reply left the approval open");
            return Ok(Resolution {
                intent: intent.clone(),
                decision,
            });
        };

        let next = transition(intent, to, actor, reason)?;
        self.sync_labels(issue, next.state).await?;

        info!(intent_id = %next.id, state = %next.state, "approval decided");
        self.announce(intent, &next, actor);
        Ok(Resolution {
            intent: next,
            decision,
        })
    }

    fn announce(&self, before: &Intent, after: &Intent, actor: Option<&str>) {
        if let Some(bus) = &self.bus {
            bus.publish(Event::IntentTransitioned {
                intent_id: after.id.clone(),
                from: before.state,
                to: after.state,
                actor: actor.map(str::to_string),
            });
        }
    }
}
