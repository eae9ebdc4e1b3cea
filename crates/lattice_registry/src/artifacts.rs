//! Artifact Registry
//!
//! Records links between intents and the artifacts they produced or
//! consumed. Duplicate links are kept: several intents may legitimately
//! point at the same artifact, and the registry does not second-guess
//! retries either.

use crate::{RegistryError, Responder, Result};
use lattice_events::{Event, EventBus};
use lattice_ids::IntentId;
use lattice_types::ArtifactLink;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const ACTOR_NAME: &str = "artifact registry";

/// Commands sent to the artifact registry task
#[derive(Debug)]
enum ArtifactCommand {
    /// Record a link and announce it
    Register {
        link: ArtifactLink,
        respond: Responder<ArtifactLink>,
    },

    /// All links recorded for an intent, oldest first
    ForIntent {
        intent_id: IntentId,
        respond: Responder<Vec<ArtifactLink>>,
    },

    /// Every recorded link, oldest first
    List {
        respond: Responder<Vec<ArtifactLink>>,
    },

    /// Request graceful shutdown
    Shutdown,
}

/// Handle for talking to the artifact registry task.
///
/// Can be cloned and shared. The task stops when every handle is dropped
/// or on [`ArtifactRegistryHandle::shutdown`].
#[derive(Clone)]
pub struct ArtifactRegistryHandle {
    cmd_tx: mpsc::Sender<ArtifactCommand>,
}

impl ArtifactRegistryHandle {
    async fn send_and_wait<T>(
        &self,
        make_cmd: impl FnOnce(Responder<T>) -> ArtifactCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make_cmd(tx))
            .await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))?;
        rx.await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))
    }

    /// Record `link` and publish [`Event::ArtifactLinked`]. Returns the
    /// stored link.
    pub async fn register(&self, link: ArtifactLink) -> Result<ArtifactLink> {
        self.send_and_wait(|respond| ArtifactCommand::Register { link, respond })
            .await
    }

    pub async fn for_intent(&self, intent_id: &IntentId) -> Result<Vec<ArtifactLink>> {
        let intent_id = intent_id.clone();
        self.send_and_wait(|respond| ArtifactCommand::ForIntent { intent_id, respond })
            .await
    }

    pub async fn list(&self) -> Result<Vec<ArtifactLink>> {
        self.send_and_wait(|respond| ArtifactCommand::List { respond })
            .await
    }

    /// Request shutdown
    pub async fn shutdown(&self) -> Result<()> {
        self.cmd_tx
            .send(ArtifactCommand::Shutdown)
            .await
            .map_err(|_| RegistryError::ActorUnavailable(ACTOR_NAME))
    }
}

impl std::fmt::Debug for ArtifactRegistryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactRegistryHandle")
            .field("cmd_tx", &"<Sender>")
            .finish()
    }
}

/// The task that owns every recorded artifact link.
pub struct ArtifactRegistry {
    // Owned state (no Arc, no Mutex)
    links: Vec<ArtifactLink>,

    commands: mpsc::Receiver<ArtifactCommand>,
    bus: EventBus,
}

impl ArtifactRegistry {
    /// Create the registry and its handle. Drive it with [`ArtifactRegistry::run`].
    pub fn new(bus: EventBus, buffer: usize) -> (Self, ArtifactRegistryHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(buffer.max(1));
        let registry = Self {
            links: Vec::new(),
            commands: cmd_rx,
            bus,
        };
        (registry, ArtifactRegistryHandle { cmd_tx })
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Artifact registry started");

        while let Some(cmd) = self.commands.recv().await {
            if matches!(cmd, ArtifactCommand::Shutdown) {
                info!("Artifact registry received shutdown command");
                break;
            }
            self.handle_command(cmd);
        }

        info!(links = self.links.len(), "Artifact registry stopped");
    }

    fn handle_command(&mut self, cmd: ArtifactCommand) {
        match cmd {
            ArtifactCommand::Register { link, respond } => {
                info!(
                    intent_id = %link.intent_id,
                    kind = %link.kind,
                    reference = %link.reference,
                    role = %link.role,
                    "artifact linked"
                );
                self.links.push(link.clone());
                let receivers = self.bus.publish(Event::ArtifactLinked { link: link.clone() });
                debug!(receivers, "artifact link announced");
                let _ = respond.send(link);
            }

            ArtifactCommand::ForIntent { intent_id, respond } => {
                let links = self
                    .links
                    .iter()
                    .filter(|link| link.intent_id == intent_id)
                    .cloned()
                    .collect();
                let _ = respond.send(links);
            }

            ArtifactCommand::List { respond } => {
                let _ = respond.send(self.links.clone());
            }

            ArtifactCommand::Shutdown => {
                // Handled in run loop
            }
        }
    }
}

/// Spawn the artifact registry on the current tokio runtime.
pub fn spawn_artifact_registry(
    bus: &EventBus,
    buffer: usize,
) -> (ArtifactRegistryHandle, JoinHandle<()>) {
    let (registry, handle) = ArtifactRegistry::new(bus.clone(), buffer);
    let task = tokio::spawn(registry.run());
    (handle, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_events::Topic;
    use lattice_types::{ArtifactKind, ArtifactRole};

    fn link(intent: &str, kind: ArtifactKind, reference: &str) -> ArtifactLink {
        ArtifactLink::new(
            IntentId::parse(intent).unwrap(),
            kind,
            reference,
            ArtifactRole::Output,
        )
    }

    #[tokio::test]
    async fn test_register_publishes_link() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe(Topic::Artifacts);
        let (registry, _task) = spawn_artifact_registry(&bus, 8);

        let stored = registry
            .register(link("int_a", ArtifactKind::Commit, "abc123"))
            .await
            .unwrap();

        match sub.recv().await.unwrap() {
            Event::ArtifactLinked { link } => assert_eq!(link, stored),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let bus = EventBus::new(16);
        let (registry, _task) = spawn_artifact_registry(&bus, 8);

        registry
            .register(link("int_a", ArtifactKind::Branch, "feature/x"))
            .await
            .unwrap();
        registry
            .register(link("int_a", ArtifactKind::Branch, "feature/x"))
            .await
            .unwrap();
        registry
            .register(link("int_b", ArtifactKind::Branch, "feature/x"))
            .await
            .unwrap();

        assert_eq!(registry.list().await.unwrap().len(), 3);
        let for_a = registry
            .for_intent(&IntentId::parse("int_a").unwrap())
            .await
            .unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|l| l.reference == "feature/x"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let bus = EventBus::new(4);
        let (registry, task) = spawn_artifact_registry(&bus, 4);
        registry.shutdown().await.unwrap();
        task.await.unwrap();

        let err = registry.list().await.unwrap_err();
        assert_eq!(err, RegistryError::ActorUnavailable("artifact registry"));
    }
}
