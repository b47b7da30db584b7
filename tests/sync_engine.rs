use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use tokio::sync::watch;
use trailcam::{
    CameraId, Connectivity, DeferReason, DrainStatus, MemoryOutbox, OutboxStore, ScriptedTransport,
    SendOutcome, SyncConfig, SyncEngine,
};

const PHONE: &str = "+491701234567";
const CAPTURE: &str = "$03*1#1$";

struct Harness {
    engine: Arc<SyncEngine>,
    outbox: Arc<MemoryOutbox>,
    transport: Arc<ScriptedTransport>,
    connectivity: watch::Sender<Connectivity>,
}

fn harness(transport: ScriptedTransport, state: Connectivity, config: SyncConfig) -> Harness {
    let outbox = Arc::new(MemoryOutbox::new());
    let transport = Arc::new(transport);
    let (connectivity, receiver) = watch::channel(state);
    let engine = SyncEngine::builder()
        .outbox(outbox.clone())
        .transport(transport.clone())
        .connectivity(receiver)
        .config(config)
        .build();
    Harness {
        engine: Arc::new(engine),
        outbox,
        transport,
        connectivity,
    }
}

fn scripted(script: &str) -> ScriptedTransport {
    ScriptedTransport::new(script.parse().expect("script should parse"))
}

fn camera(number: u32) -> CameraId {
    CameraId::from(format!("cam-{number}").as_str())
}

#[tokio::test(start_paused = true)]
async fn overlapping_drains_deliver_each_message_at_most_once() {
    let harness = harness(
        ScriptedTransport::always_ok().with_delay(Duration::from_millis(200)),
        Connectivity::Offline,
        SyncConfig::default(),
    );
    for number in 1..=3 {
        harness
            .engine
            .send_now(&camera(number), PHONE, CAPTURE)
            .await
            .expect("offline sends queue");
    }
    harness
        .connectivity
        .send(Connectivity::Online)
        .expect("engine keeps a receiver");

    let (first, second) = tokio::join!(harness.engine.drain_queue(), harness.engine.drain_queue());
    let first = first.expect("first drain");
    let second = second.expect("second drain");

    assert_eq!(DrainStatus::Completed, first.status);
    assert_eq!(3, first.delivered);
    assert_eq!(DrainStatus::Coalesced, second.status);
    assert_eq!(3, harness.transport.call_count());
    assert!(harness.outbox.list_pending().await.expect("list").is_empty());
}

#[tokio::test]
async fn offline_sends_are_listed_once_and_never_attempted() {
    let harness = harness(
        ScriptedTransport::always_ok(),
        Connectivity::Offline,
        SyncConfig::default(),
    );

    let outcome = harness
        .engine
        .send_now(&camera(1), PHONE, CAPTURE)
        .await
        .expect("offline send queues");
    let message_id = assert_matches!(
        outcome,
        SendOutcome::Deferred { message_id, reason: DeferReason::Offline } => message_id
    );

    let report = harness.engine.drain_queue().await.expect("drain");
    assert_eq!(DrainStatus::Offline, report.status);

    let pending = harness.engine.pending().await.expect("pending");
    assert_eq!(1, pending.len());
    assert_eq!(message_id, pending[0].id());
    assert_eq!(0, pending[0].attempts());
    assert_eq!(0, harness.transport.call_count());
}

#[tokio::test]
async fn exhausted_messages_are_excluded_from_later_drains() {
    let harness = harness(
        scripted("fail"),
        Connectivity::Online,
        SyncConfig::builder().max_attempts(2).build(),
    );
    harness
        .engine
        .send_now(&camera(1), PHONE, CAPTURE)
        .await
        .expect("failed send queues");

    let first = harness.engine.drain_queue().await.expect("first drain");
    assert_eq!(1, first.failed);
    let second = harness.engine.drain_queue().await.expect("second drain");
    assert_eq!(1, second.dead_lettered);
    assert_eq!(3, harness.transport.call_count());

    let third = harness.engine.drain_queue().await.expect("third drain");
    assert_eq!(1, third.dead_lettered);
    assert_eq!(0, third.failed);
    assert_eq!(3, harness.transport.call_count());

    let dead = harness.engine.dead_letters().await.expect("dead letters");
    assert_eq!(1, dead.len());
    assert_eq!(2, dead[0].attempts());

    let retried = harness
        .engine
        .retry_message(dead[0].id())
        .await
        .expect("retry");
    assert_eq!(0, retried.attempts());
    assert!(harness.engine.dead_letters().await.expect("dead letters").is_empty());
}

#[tokio::test(start_paused = true)]
async fn stalled_handoffs_time_out_and_queue() {
    let harness = harness(
        scripted("timeout,ok"),
        Connectivity::Online,
        SyncConfig::builder()
            .send_timeout(Duration::from_secs(1))
            .build(),
    );

    let outcome = harness
        .engine
        .send_now(&camera(1), PHONE, CAPTURE)
        .await
        .expect("timed out send queues");
    let reason = assert_matches!(outcome, SendOutcome::Deferred { reason, .. } => reason);
    assert_eq!(
        DeferReason::TransportFailed("no handoff within 1s".to_string()),
        reason
    );

    let report = harness.engine.drain_queue().await.expect("drain");
    assert_eq!(1, report.delivered);
    assert_eq!(2, harness.transport.call_count());
}

#[tokio::test]
async fn tentative_handoffs_count_as_delivered() {
    let harness = harness(
        scripted("tentative"),
        Connectivity::Online,
        SyncConfig::default(),
    );

    let outcome = harness
        .engine
        .send_now(&camera(1), PHONE, CAPTURE)
        .await
        .expect("send");
    assert_matches!(outcome, SendOutcome::Delivered { .. });
    assert!(harness.engine.pending().await.expect("pending").is_empty());
}
