//! Runtime wiring.

use crate::config::LatticeConfig;
use lattice_events::EventBus;
use lattice_governance::{ApprovalOptions, GovernanceBridge, IssueTracker};
use lattice_registry::{
    spawn_artifact_registry, spawn_pr_tracker, ArtifactRegistryHandle, PrTrackerHandle,
    RegistryError,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A running Lattice: the event bus plus both registry actors.
pub struct Lattice {
    bus: EventBus,
    artifacts: ArtifactRegistryHandle,
    prs: PrTrackerHandle,
    approval_options: ApprovalOptions,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Lattice {
    /// Build the bus and spawn the registries on the current runtime.
    ///
    /// The PR tracker subscribes to artifact events before the artifact
    /// registry exists, so no link can be announced unseen.
    pub fn start(config: &LatticeConfig) -> Self {
        let bus = EventBus::new(config.bus.capacity);
        let buffer = config.registry.command_buffer;

        let (prs, pr_task) = spawn_pr_tracker(&bus, buffer);
        let (artifacts, artifact_task) = spawn_artifact_registry(&bus, buffer);

        info!(
            bus_capacity = config.bus.capacity,
            command_buffer = buffer,
            "lattice runtime started"
        );

        Self {
            bus,
            artifacts,
            prs,
            approval_options: config.governance.approval_options(),
            tasks: vec![("pr tracker", pr_task), ("artifact registry", artifact_task)],
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn artifacts(&self) -> &ArtifactRegistryHandle {
        &self.artifacts
    }

    pub fn prs(&self) -> &PrTrackerHandle {
        &self.prs
    }

    /// A governance bridge over `tracker` that publishes on this bus.
    pub fn governance<T: IssueTracker>(&self, tracker: T) -> GovernanceBridge<T> {
        GovernanceBridge::new(tracker, self.approval_options.clone()).with_bus(self.bus.clone())
    }

    /// Stop both registries and wait for their tasks.
    pub async fn shutdown(self) {
        for result in [self.artifacts.shutdown().await, self.prs.shutdown().await] {
            if let Err(RegistryError::ActorUnavailable(actor)) = result {
                warn!(actor, "registry already stopped");
            }
        }
        for (name, task) in self.tasks {
            if let Err(err) = task.await {
                warn!(task = name, error = %err, "registry task ended abnormally");
            }
        }
        info!("lattice runtime stopped");
    }
}
