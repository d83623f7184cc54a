//! Tick driver over the loopback transport.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use ovrbridge_core::message::payload::User;
use ovrbridge_core::MessageType;
use ovrbridge_runtime::config::PollSection;
use ovrbridge_runtime::driver;
use ovrbridge_runtime::native::{LoopbackTransport, NativeMessage, NativePayload, NativeTransport};
use ovrbridge_runtime::{Dispatcher, Request};

fn poll_section(max_messages_per_tick: usize) -> PollSection {
    PollSection {
        tick_interval_ms: 1,
        max_messages_per_tick,
    }
}

#[tokio::test]
async fn awaited_request_resolves_on_a_tick() {
    let transport = Arc::new(LoopbackTransport::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>));
    let (stop_tx, stop_rx) = watch::channel(false);

    let drive = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { driver::run_ticks(dispatcher, &poll_section(0), stop_rx).await }
    });

    let (req, rx) = Request::with_channel(21);
    dispatcher.register_request(req).unwrap();
    transport.push(NativeMessage::success(
        MessageType::USER_GET_LOGGED_IN_USER,
        21,
        NativePayload::User(User {
            id: 5,
            oculus_id: "me".into(),
            display_name: String::new(),
            image_url: String::new(),
            presence_status: Default::default(),
        }),
    ));

    let msg = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("timed out")
        .expect("request discarded");
    assert_eq!(msg.data::<User>().map(|u| u.id), Some(5));

    stop_tx.send(true).unwrap();
    let report = drive.await.unwrap();
    assert_eq!(report.requests_discarded, 0);
}

#[tokio::test]
async fn shutdown_signal_discards_pending_requests() {
    let transport = Arc::new(LoopbackTransport::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>));
    let (stop_tx, stop_rx) = watch::channel(false);

    let (req, rx) = Request::with_channel(30);
    dispatcher.register_request(req).unwrap();

    let drive = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { driver::run_ticks(dispatcher, &poll_section(1), stop_rx).await }
    });

    drop(stop_tx);
    let report = drive.await.unwrap();
    assert_eq!(report.requests_discarded, 1);
    assert!(rx.await.is_err());
}

#[tokio::test]
async fn per_tick_limit_spreads_work_across_ticks() {
    let transport = Arc::new(LoopbackTransport::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>));
    for _ in 0..4 {
        transport.push(NativeMessage::bare(MessageType::GROUP_PRESENCE_SET, 0));
    }
    let (stop_tx, stop_rx) = watch::channel(false);

    let drive = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { driver::run_ticks(dispatcher, &poll_section(1), stop_rx).await }
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        while transport.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("queue never drained");

    stop_tx.send(true).unwrap();
    drive.await.unwrap();
    assert_eq!(dispatcher.stats().popped, 4);
    assert_eq!(transport.freed_count(), 4);
}
