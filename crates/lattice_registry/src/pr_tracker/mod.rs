//! PR Tracker
//!
//! Registry of pull requests keyed by `(repo, number)`, owned by a single
//! task. Registration is first-writer-wins: a later `register` for a known
//! key hands back the stored value and discards its argument, so replays
//! cannot clobber review state observed since. Updates publish only real
//! deltas, which keeps redundant webhook deliveries and polls quiet.
//!
//! The tracker also listens on the artifacts topic and registers a minimal
//! PR for every `pull_request` link it hears about. That path is
//! asynchronous: a caller that just registered a link must wait for the
//! `PrRegistered` event (or poll) before expecting `get` to see it.

mod command;

use command::TrackerCommand;

use crate::{RegistryError, Responder, Result};
use lattice_events::{Event, EventBus, Subscription, Topic};
use lattice_ids::IntentId;
use lattice_types::{
    ArtifactKind, ArtifactLink, FieldChange, PrChanges, PrKey, PrState, PullRequest,
};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const ACTOR_NAME: &str = "pr tracker";

/// Result of an update: the stored value afterwards and what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PrUpdate {
    pub pr: PullRequest,
    pub changes: Vec<FieldChange>,
}

impl PrUpdate {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Handle for interacting with the PR tracker from other tasks.
///
/// Can be cloned and shared. All operations send a command to the tracker
/// and wait for its answer.
#[derive(Clone)]
pub struct PrTrackerHandle {
    cmd_tx: mpsc::Sender<TrackerCommand>,
}

impl PrTrackerHandle {
    /// Send a command and wait for response
    async fn send_and_wait<T>(
        &self,
        make_cmd: impl FnOnce(Responder<T>) -> TrackerCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make_cmd(tx))
            .await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))?;
        rx.await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))
    }

    /// Register a PR; returns the stored value, which is the existing one
    /// when the key was already tracked.
    pub async fn register(&self, pr: PullRequest) -> Result<PullRequest> {
        self.send_and_wait(|respond| TrackerCommand::Register { pr, respond })
            .await
    }

    /// Apply `changes` to a tracked PR.
    pub async fn update_pr(
        &self,
        repo: &str,
        number: u64,
        changes: PrChanges,
    ) -> Result<PrUpdate> {
        let key = PrKey::new(repo, number);
        self.send_and_wait(|respond| TrackerCommand::Update {
            key,
            changes,
            respond,
        })
        .await?
    }

    /// Current value, or `None` when the key is not tracked.
    pub async fn get(&self, repo: &str, number: u64) -> Result<Option<PullRequest>> {
        let key = PrKey::new(repo, number);
        self.send_and_wait(|respond| TrackerCommand::Get { key, respond })
            .await
    }

    pub async fn for_intent(&self, intent_id: &IntentId) -> Result<Vec<PullRequest>> {
        let intent_id = intent_id.clone();
        self.send_and_wait(|respond| TrackerCommand::ForIntent { intent_id, respond })
            .await
    }

    pub async fn by_state(&self, state: PrState) -> Result<Vec<PullRequest>> {
        self.send_and_wait(|respond| TrackerCommand::ByState { state, respond })
            .await
    }

    pub async fn needs_attention(&self) -> Result<Vec<PullRequest>> {
        self.send_and_wait(|respond| TrackerCommand::NeedsAttention { respond })
            .await
    }

    pub async fn list(&self) -> Result<Vec<PullRequest>> {
        self.send_and_wait(|respond| TrackerCommand::List { respond })
            .await
    }

    /// Request shutdown
    pub async fn shutdown(&self) -> Result<()> {
        self.cmd_tx
            .send(TrackerCommand::Shutdown)
            .await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))
    }
}

impl std::fmt::Debug for PrTrackerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrTrackerHandle")
            .field("cmd_tx", &"<Sender>")
            .finish()
    }
}

enum Step {
    Command(Option<TrackerCommand>),
    Artifact(Option<Event>),
}

/// The task that owns every tracked pull request.
pub struct PrTracker {
    // Owned state (no Arc, no Mutex)
    prs: HashMap<PrKey, PullRequest>,

    commands: mpsc::Receiver<TrackerCommand>,
    artifacts: Option<Subscription>,
    bus: EventBus,
}

impl PrTracker {
    /// Create the tracker and its handle. The artifacts subscription is
    /// taken here, so links registered after this call are never missed.
    pub fn new(bus: EventBus, buffer: usize) -> (Self, PrTrackerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(buffer.max(1));
        let artifacts = bus.subscribe(Topic::Artifacts);
        let tracker = Self {
            prs: HashMap::new(),
            commands: cmd_rx,
            artifacts: Some(artifacts),
            bus,
        };
        (tracker, PrTrackerHandle { cmd_tx })
    }

    /// Run the tracker loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("PR tracker started");

        loop {
            let step = tokio::select! {
                cmd = self.commands.recv() => Step::Command(cmd),
                event = next_event(&mut self.artifacts) => Step::Artifact(event),
            };

            match step {
                Step::Command(Some(TrackerCommand::Shutdown)) => {
                    info!("PR tracker received shutdown command");
                    break;
                }
                Step::Command(Some(cmd)) => self.handle_command(cmd),
                Step::Command(None) => {
                    info!("PR tracker command channel closed");
                    break;
                }
                Step::Artifact(Some(event)) => self.handle_event(event),
                Step::Artifact(None) => {
                    debug!("artifact subscription ended; auto-registration disabled");
                    self.artifacts = None;
                }
            }
        }

        info!(tracked = self.prs.len(), "PR tracker stopped");
    }

    fn handle_command(&mut self, cmd: TrackerCommand) {
        match cmd {
            TrackerCommand::Register { pr, respond } => {
                let stored = self.register(pr);
                let _ = respond.send(stored);
            }

            TrackerCommand::Update {
                key,
                changes,
                respond,
            } => {
                let result = self.update(key, &changes);
                let _ = respond.send(result);
            }

            TrackerCommand::Get { key, respond } => {
                let _ = respond.send(self.prs.get(&key).cloned());
            }

            TrackerCommand::ForIntent { intent_id, respond } => {
                let prs = self.select(|pr| pr.intent_id.as_ref() == Some(&intent_id));
                let _ = respond.send(prs);
            }

            TrackerCommand::ByState { state, respond } => {
                let _ = respond.send(self.select(|pr| pr.state == state));
            }

            TrackerCommand::NeedsAttention { respond } => {
                let _ = respond.send(self.select(|pr| pr.review_state.needs_attention()));
            }

            TrackerCommand::List { respond } => {
                let _ = respond.send(self.select(|_| true));
            }

            TrackerCommand::Shutdown => {
                // Handled in main loop
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::ArtifactLinked { link } = event {
            if link.kind == ArtifactKind::PullRequest {
                self.auto_register(&link);
            }
        }
    }

    fn auto_register(&mut self, link: &ArtifactLink) {
        let Some((repo, number)) = link.pull_request_key() else {
            warn!(
                intent_id = %link.intent_id,
                reference = %link.reference,
                "pull_request link without a resolvable repo/number; not tracked"
            );
            return;
        };

        let mut pr = PullRequest::new(repo, number, "").with_intent(link.intent_id.clone());
        pr.url = link.url.clone();
        self.register(pr);
    }

    fn register(&mut self, pr: PullRequest) -> PullRequest {
        let key = pr.key();
        if let Some(existing) = self.prs.get(&key) {
            debug!(pr = %key, "PR already tracked; keeping first registration");
            return existing.clone();
        }

        info!(pr = %key, intent_id = ?pr.intent_id, "PR registered");
        self.prs.insert(key, pr.clone());
        self.bus.publish(Event::PrRegistered { pr: pr.clone() });
        pr
    }

    fn update(&mut self, key: PrKey, changes: &PrChanges) -> Result<PrUpdate> {
        let Some(pr) = self.prs.get_mut(&key) else {
            return Err(RegistryError::not_found(key.repo, key.number));
        };

        let delta = pr.apply(changes);
        let update = PrUpdate {
            pr: pr.clone(),
            changes: delta,
        };

        if update.is_noop() {
            debug!(pr = %key, "PR update carried no changes");
        } else {
            info!(pr = %key, fields = update.changes.len(), "PR updated");
            self.bus.publish(Event::PrUpdated {
                pr: update.pr.clone(),
                changes: update.changes.clone(),
            });
        }
        Ok(update)
    }

    fn select(&self, predicate: impl Fn(&PullRequest) -> bool) -> Vec<PullRequest> {
        self.prs
            .values()
            .filter(|pr| predicate(pr))
            .cloned()
            .collect()
    }
}

async fn next_event(subscription: &mut Option<Subscription>) -> Option<Event> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

/// Spawn the PR tracker on the current tokio runtime.
pub fn spawn_pr_tracker(bus: &EventBus, buffer: usize) -> (PrTrackerHandle, JoinHandle<()>) {
    let (tracker, handle) = PrTracker::new(bus.clone(), buffer);
    let task = tokio::spawn(tracker.run());
    (handle, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{PrField, ReviewState};
    use std::time::Duration;

    fn intent(id: &str) -> IntentId {
        IntentId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_get() {
        let bus = EventBus::new(16);
        let (tracker, _task) = spawn_pr_tracker(&bus, 8);

        let pr = PullRequest::new("org/repo", 1, "First").with_intent(intent("int_1"));
        let stored = tracker.register(pr.clone()).await.unwrap();
        assert_eq!(stored, pr);

        assert_eq!(tracker.get("org/repo", 1).await.unwrap(), Some(pr));
        assert_eq!(tracker.get("org/repo", 2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_unknown_key_is_not_found() {
        let bus = EventBus::new(16);
        let (tracker, _task) = spawn_pr_tracker(&bus, 8);

        let err = tracker
            .update_pr("org/repo", 9, PrChanges::new().state(PrState::Merged))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::not_found("org/repo", 9));
    }

    #[tokio::test]
    async fn test_queries() {
        let bus = EventBus::new(16);
        let (tracker, _task) = spawn_pr_tracker(&bus, 8);

        tracker
            .register(PullRequest::new("org/a", 1, "a1").with_intent(intent("int_1")))
            .await
            .unwrap();
        tracker
            .register(PullRequest::new("org/a", 2, "a2").with_intent(intent("int_2")))
            .await
            .unwrap();
        tracker
            .register(PullRequest::new("org/b", 1, "b1").with_intent(intent("int_1")))
            .await
            .unwrap();

        tracker
            .update_pr("org/a", 2, PrChanges::new().state(PrState::Merged))
            .await
            .unwrap();
        tracker
            .update_pr(
                "org/b",
                1,
                PrChanges::new().review_state(ReviewState::ChangesRequested),
            )
            .await
            .unwrap();

        let mut for_one = tracker.for_intent(&intent("int_1")).await.unwrap();
        for_one.sort_by_key(|pr| pr.key());
        assert_eq!(
            for_one.iter().map(|pr| pr.key().to_string()).collect::<Vec<_>>(),
            vec!["org/a#1", "org/b#1"]
        );

        let merged = tracker.by_state(PrState::Merged).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "a2");

        let attention = tracker.needs_attention().await.unwrap();
        assert_eq!(attention.len(), 1);
        assert_eq!(attention[0].key(), PrKey::new("org/b", 1));

        assert_eq!(tracker.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_delta_triples() {
        let bus = EventBus::new(16);
        let (tracker, _task) = spawn_pr_tracker(&bus, 8);
        tracker
            .register(PullRequest::new("org/repo", 5, "t"))
            .await
            .unwrap();

        let update = tracker
            .update_pr(
                "org/repo",
                5,
                PrChanges::new()
                    .title("t")
                    .mergeable(Some(true))
                    .review_state(ReviewState::Approved),
            )
            .await
            .unwrap();

        let fields: Vec<PrField> = update.changes.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![PrField::ReviewState, PrField::Mergeable]);
        assert_eq!(update.pr.mergeable, Some(true));
    }

    #[tokio::test]
    async fn test_non_pr_links_are_ignored() {
        let bus = EventBus::new(16);
        let (tracker, _task) = spawn_pr_tracker(&bus, 8);

        let link = ArtifactLink::new(
            intent("int_1"),
            ArtifactKind::Commit,
            "42",
            lattice_types::ArtifactRole::Output,
        )
        .with_repo("org/repo");
        bus.publish(Event::ArtifactLinked { link });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tracker.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_task() {
        let bus = EventBus::new(4);
        let (tracker, task) = spawn_pr_tracker(&bus, 4);
        drop(tracker);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("tracker should stop once its handles are gone")
            .unwrap();
    }
}
