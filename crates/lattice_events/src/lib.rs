//! Event Bus
//!
//! Process-wide publish/subscribe between producers of state changes
//! (artifact registry, PR tracker, governance bridge) and whoever cares.
//! Producers never know their consumers.
//!
//! # Delivery
//!
//! Every subscription owns an unbounded queue. Publishing never blocks and
//! never drops: each subscriber that exists at publish time receives the
//! event, in publish order, however far behind it is. A subscriber whose
//! backlog passes the bus capacity is reported with a warning so a stuck
//! consumer shows up in the logs before it shows up in memory.

mod event;

pub use event::{Event, Topic};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Default backlog per subscriber before the bus warns about it.
pub const DEFAULT_CAPACITY: usize = 256;

struct Subscriber {
    sender: mpsc::UnboundedSender<Event>,
    backlog: Arc<AtomicUsize>,
}

struct Topics {
    capacity: usize,
    subscribers: Mutex<HashMap<Topic, Vec<Subscriber>>>,
}

/// Handle to the event bus. Cheap to clone; all clones share the topics.
#[derive(Clone)]
pub struct EventBus {
    topics: Arc<Topics>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Topics {
                capacity: capacity.max(1),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Publish `event` on its topic. Fire-and-forget: returns how many
    /// subscribers were handed the event (zero is not an error).
    /// Subscriptions that have been dropped are pruned here.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let mut subscribers = self
            .topics
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = subscribers.get_mut(&topic) else {
            trace!(%topic, event = event.name(), "event published with no subscribers");
            return 0;
        };

        let capacity = self.topics.capacity;
        queue.retain(|sub| {
            if sub.sender.send(event.clone()).is_err() {
                return false;
            }
            let backlog = sub.backlog.fetch_add(1, Ordering::Relaxed) + 1;
            if backlog == capacity + 1 {
                warn!(%topic, backlog, "subscriber is falling behind");
            }
            true
        });

        trace!(%topic, event = event.name(), receivers = queue.len(), "event published");
        queue.len()
    }

    /// Register interest in `topic`. Only events published after this call
    /// are delivered.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let backlog = Arc::new(AtomicUsize::new(0));
        self.topics
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_default()
            .push(Subscriber {
                sender,
                backlog: Arc::clone(&backlog),
            });
        Subscription {
            topic,
            receiver,
            backlog,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.topics.capacity)
            .finish()
    }
}

/// A subscriber's view of one topic.
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<Event>,
    backlog: Arc<AtomicUsize>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Next event, or `None` once every bus handle is gone and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<Event> {
        let event = self.receiver.recv().await?;
        self.backlog.fetch_sub(1, Ordering::Relaxed);
        Some(event)
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<Event> {
        let event = self.receiver.try_recv().ok()?;
        self.backlog.fetch_sub(1, Ordering::Relaxed);
        Some(event)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("backlog", &self.backlog.load(Ordering::Relaxed))
            .finish()
    }
}
