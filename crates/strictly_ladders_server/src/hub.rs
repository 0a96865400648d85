//! Best-effort fan-out of game snapshots to live subscribers.
//!
//! Each subscriber owns a bounded queue. Broadcasting never waits: when a
//! queue is full the update is dropped for that subscriber only, and it will
//! catch up with whatever snapshot is published next. Because every snapshot
//! is complete, a dropped update loses nothing a later one doesn't carry.

use crate::sync::lock;
use futures::Stream;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use strictly_ladders::GameSnapshot;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, instrument, trace};

/// Queue capacity used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Identifier of one subscription within a hub.
pub type SubscriberId = u64;

// ─────────────────────────────────────────────────────────────
//  Updates
// ─────────────────────────────────────────────────────────────

/// An encoded snapshot ready for delivery.
///
/// The payload is encoded once per broadcast and shared by every queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    version: u64,
    payload: Arc<str>,
}

impl Update {
    /// Encodes `snapshot` as JSON.
    pub fn encode(snapshot: &GameSnapshot) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_string(snapshot)?;
        Ok(Self {
            version: snapshot.version,
            payload: payload.into(),
        })
    }

    /// Session version the snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// JSON text of the snapshot.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decodes the payload back into a snapshot.
    pub fn snapshot(&self) -> Result<GameSnapshot, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// What happened to one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Queues that accepted the update.
    pub delivered: usize,
    /// Queues that were full; the update was skipped for them.
    pub dropped: usize,
    /// Subscribers that already had this version or a later one.
    pub stale: usize,
    /// Subscribers whose receiving side was gone; they were removed.
    pub closed: usize,
}

// ─────────────────────────────────────────────────────────────
//  Hub
// ─────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slot {
    sender: mpsc::Sender<Update>,
    last_version: u64,
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: SubscriberId,
    slots: HashMap<SubscriberId, Slot>,
}

/// Registry of live subscriptions for one session.
#[derive(Debug)]
pub struct SubscriberHub {
    capacity: NonZeroUsize,
    inner: Mutex<HubInner>,
}

impl SubscriberHub {
    /// Creates an empty hub whose queues hold `capacity` updates each.
    #[instrument]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(HubInner::default()),
        }
    }

    /// Per-subscriber queue capacity.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.inner, "hub").slots.len()
    }

    /// Whether no subscription is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a subscriber whose queue starts with `initial`.
    ///
    /// Callers pass the current snapshot so the subscriber never has to wait
    /// for the next mutation to learn the state.
    #[instrument(skip(self, initial), fields(version = initial.version))]
    pub fn register(self: &Arc<Self>, initial: Update) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity.get());
        let last_version = initial.version;
        // Fresh channel with capacity >= 1 always has room.
        let queued = sender.try_send(initial);
        debug_assert!(queued.is_ok(), "fresh subscriber queue refused its initial update");

        let mut inner = lock(&self.inner, "hub");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.slots.insert(
            id,
            Slot {
                sender,
                last_version,
            },
        );
        debug!(subscriber = id, live = inner.slots.len(), "Subscriber registered");

        Subscription {
            id,
            receiver,
            hub: Arc::clone(self),
        }
    }

    /// Offers `update` to every subscriber without waiting on any of them.
    ///
    /// Subscribers that already hold this version or a later one are skipped,
    /// so each subscriber sees strictly increasing versions.
    #[instrument(skip(self, update), fields(version = update.version))]
    pub fn broadcast(&self, update: &Update) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut inner = lock(&self.inner, "hub");

        inner.slots.retain(|id, slot| {
            if slot.last_version >= update.version {
                report.stale += 1;
                return true;
            }
            match slot.sender.try_send(update.clone()) {
                Ok(()) => {
                    slot.last_version = update.version;
                    report.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    trace!(subscriber = id, "Queue full, update dropped");
                    report.dropped += 1;
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber = id, "Receiver gone, removing subscriber");
                    report.closed += 1;
                    false
                }
            }
        });

        debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            stale = report.stale,
            closed = report.closed,
            "Broadcast complete"
        );
        report
    }

    #[instrument(skip(self))]
    fn deregister(&self, id: SubscriberId) {
        let mut inner = lock(&self.inner, "hub");
        if inner.slots.remove(&id).is_some() {
            debug!(live = inner.slots.len(), "Subscriber deregistered");
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Subscription
// ─────────────────────────────────────────────────────────────

/// Why a delivery loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEnd {
    /// The cancellation future completed.
    Cancelled,
    /// The sink asked to stop.
    SinkClosed,
    /// The hub side of the queue went away.
    Disconnected,
}

/// Receiving end of one subscriber queue.
///
/// Dropping a subscription removes it from its hub.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Update>,
    hub: Arc<SubscriberHub>,
}

impl Subscription {
    /// Identifier within the owning hub.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next update.
    ///
    /// Returns `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Update> {
        self.receiver.recv().await
    }

    /// Takes the next queued update without waiting.
    pub fn try_recv(&mut self) -> Option<Update> {
        self.receiver.try_recv().ok()
    }

    /// Forwards updates to `sink` until `cancel` completes, the sink breaks,
    /// or the queue disconnects. The subscription is deregistered on return.
    #[instrument(skip(self, cancel, sink), fields(subscriber = self.id))]
    pub async fn deliver<C, F>(mut self, cancel: C, mut sink: F) -> DeliveryEnd
    where
        C: Future<Output = ()>,
        F: FnMut(Update) -> ControlFlow<()>,
    {
        let mut cancel = std::pin::pin!(cancel);
        let end = loop {
            tokio::select! {
                biased;
                _ = &mut cancel => break DeliveryEnd::Cancelled,
                update = self.receiver.recv() => match update {
                    Some(update) => {
                        if sink(update).is_break() {
                            break DeliveryEnd::SinkClosed;
                        }
                    }
                    None => break DeliveryEnd::Disconnected,
                },
            }
        };
        debug!(?end, "Delivery loop finished");
        end
    }

    /// Turns the subscription into a stream of updates.
    ///
    /// Dropping the stream deregisters the subscriber.
    pub fn into_stream(self) -> impl Stream<Item = Update> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let update = subscription.recv().await?;
            Some((update, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.deregister(self.id);
    }
}
