//! Broadcast hub: registration, fan-out and eviction.
use std::sync::Arc;
use std::time::Duration;

use batedor_agent::hub::{BroadcastHub, Outbound, Subscriber, SUBSCRIBER_QUEUE};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

fn msg(s: &str) -> Outbound {
    Arc::from(s)
}

async fn recv(rx: &mut mpsc::Receiver<Outbound>) -> Option<Outbound> {
    timeout(Duration::from_secs(2), rx.recv()).await.ok().flatten()
}

#[tokio::test]
async fn failed_subscriber_is_dropped_and_others_keep_receiving() {
    let cancel = CancellationToken::new();
    let (hub, handle) = BroadcastHub::new(cancel.clone());
    let task = tokio::spawn(hub.run());

    let (id1, mut rx1) = handle.subscribe().await.expect("hub running");
    let (id2, rx2) = handle.subscribe().await.expect("hub running");
    let (id3, mut rx3) = handle.subscribe().await.expect("hub running");
    assert_ne!(id1, id2);
    assert_ne!(id2, id3);
    assert_eq!(handle.subscriber_count().await, Some(3));

    // subscriber 2 goes away without unregistering
    drop(rx2);
    assert!(handle.broadcast(msg("M")));
    assert_eq!(recv(&mut rx1).await.as_deref(), Some("M"));
    assert_eq!(recv(&mut rx3).await.as_deref(), Some("M"));
    assert_eq!(handle.subscriber_count().await, Some(2));

    assert!(handle.broadcast(msg("N")));
    assert_eq!(recv(&mut rx1).await.as_deref(), Some("N"));
    assert_eq!(recv(&mut rx3).await.as_deref(), Some("N"));

    // repeated unregister of the evicted id is a no-op
    handle.unregister(id2).await;
    handle.unregister(id2).await;
    assert_eq!(handle.subscriber_count().await, Some(2));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn register_is_idempotent() {
    let cancel = CancellationToken::new();
    let (hub, handle) = BroadcastHub::new(cancel.clone());
    let task = tokio::spawn(hub.run());

    let id = handle.next_id();
    let (tx, mut rx) = mpsc::channel(SUBSCRIBER_QUEUE);
    assert!(handle.register(Subscriber::new(id, tx.clone())).await);
    assert!(handle.register(Subscriber::new(id, tx)).await);
    assert_eq!(handle.subscriber_count().await, Some(1));

    handle.broadcast(msg("once"));
    assert_eq!(recv(&mut rx).await.as_deref(), Some("once"));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn slow_subscriber_is_evicted_when_its_queue_fills() {
    let cancel = CancellationToken::new();
    let (hub, handle) = BroadcastHub::new(cancel.clone());
    let task = tokio::spawn(hub.run());

    let (_id, mut slow) = handle.subscribe().await.unwrap();
    for i in 0..=SUBSCRIBER_QUEUE {
        assert!(handle.broadcast(msg(&i.to_string())));
    }
    assert_eq!(handle.subscriber_count().await, Some(0));

    // what was queued before the eviction is still readable, then the channel closes
    let mut got = 0;
    while let Some(_m) = recv(&mut slow).await {
        got += 1;
    }
    assert_eq!(got, SUBSCRIBER_QUEUE);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn stopped_hub_refuses_work() {
    let cancel = CancellationToken::new();
    let (hub, handle) = BroadcastHub::new(cancel.clone());
    let task = tokio::spawn(hub.run());
    let (_id, mut rx) = handle.subscribe().await.unwrap();

    cancel.cancel();
    task.await.unwrap();

    // subscriber senders were dropped with the hub
    assert!(recv(&mut rx).await.is_none());
    assert!(handle.subscribe().await.is_none());
    assert!(!handle.broadcast(msg("late")));
    assert_eq!(handle.subscriber_count().await, None);
}
