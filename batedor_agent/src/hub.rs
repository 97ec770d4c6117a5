//! Subscriber registry and fan-out.
//!
//! The subscriber set lives inside the hub task and nothing else touches it. Other
//! components talk to the hub through a [`HubHandle`], which only enqueues commands.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Serialized message shared by every subscriber of one broadcast round.
pub type Outbound = Arc<str>;

/// Messages a subscriber may have queued before it counts as too slow and is dropped.
pub const SUBSCRIBER_QUEUE: usize = 16;
const MAILBOX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Subscriber {
    id: SubscriberId,
    outbound: mpsc::Sender<Outbound>,
}

impl Subscriber {
    pub fn new(id: SubscriberId, outbound: mpsc::Sender<Outbound>) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

enum HubCommand {
    Register(Subscriber),
    Unregister(SubscriberId),
    Broadcast(Outbound),
    Count(oneshot::Sender<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Idle,
    Active,
}

pub struct BroadcastHub {
    subscribers: BTreeMap<SubscriberId, Subscriber>,
    mailbox: mpsc::Receiver<HubCommand>,
    cancel: CancellationToken,
}

impl BroadcastHub {
    pub fn new(cancel: CancellationToken) -> (Self, HubHandle) {
        let (tx, mailbox) = mpsc::channel(MAILBOX);
        let hub = Self {
            subscribers: BTreeMap::new(),
            mailbox,
            cancel,
        };
        let handle = HubHandle {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (hub, handle)
    }

    pub fn state(&self) -> HubState {
        if self.subscribers.is_empty() {
            HubState::Idle
        } else {
            HubState::Active
        }
    }

    /// Control loop. Returns on cancellation or once every handle is gone; remaining
    /// subscribers are dropped, which closes their connections.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                cmd = self.mailbox.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
            }
        }
        debug!(remaining = self.subscribers.len(), "broadcast hub stopped");
        self.subscribers.clear();
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register(sub) => self.register(sub),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast(msg) => self.broadcast(&msg),
            HubCommand::Count(reply) => {
                let _ = reply.send(self.subscribers.len());
            }
        }
    }

    fn register(&mut self, sub: Subscriber) {
        if self.subscribers.contains_key(&sub.id) {
            return;
        }
        let was = self.state();
        debug!(id = %sub.id, "subscriber registered");
        self.subscribers.insert(sub.id, sub);
        if was == HubState::Idle {
            debug!("broadcast hub active");
        }
    }

    fn unregister(&mut self, id: SubscriberId) {
        if self.subscribers.remove(&id).is_some() {
            debug!(%id, "subscriber unregistered");
            if self.state() == HubState::Idle {
                debug!("broadcast hub idle");
            }
        }
    }

    fn broadcast(&mut self, msg: &Outbound) {
        let mut failed = Vec::new();
        for (id, sub) in &self.subscribers {
            match sub.outbound.try_send(Arc::clone(msg)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(%id, "subscriber queue full, dropping it");
                    failed.push(*id);
                }
                Err(TrySendError::Closed(_)) => failed.push(*id),
            }
        }
        for id in failed {
            self.unregister(id);
        }
    }
}

/// Cheap, clonable front door to a running hub.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    pub fn next_id(&self) -> SubscriberId {
        SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate an id and queue, register them, and return the receiving end.
    pub async fn subscribe(&self) -> Option<(SubscriberId, mpsc::Receiver<Outbound>)> {
        let id = self.next_id();
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE);
        self.register(Subscriber::new(id, tx)).await.then_some((id, rx))
    }

    /// False when the hub has already stopped.
    pub async fn register(&self, sub: Subscriber) -> bool {
        self.tx.send(HubCommand::Register(sub)).await.is_ok()
    }

    pub async fn unregister(&self, id: SubscriberId) {
        let _ = self.tx.send(HubCommand::Unregister(id)).await;
    }

    /// Never waits: a full mailbox or stopped hub drops the message and returns false.
    pub fn broadcast(&self, msg: Outbound) -> bool {
        match self.tx.try_send(HubCommand::Broadcast(msg)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("broadcast hub mailbox full, skipping this tick");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub async fn subscriber_count(&self) -> Option<usize> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubCommand::Count(reply)).await.ok()?;
        rx.await.ok()
    }
}
