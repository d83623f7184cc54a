//! Scripted dispatch vectors replayed through a loopback transport.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use ovrbridge_core::{Message, RequestId};
use ovrbridge_runtime::native::NativeTransport;
use ovrbridge_runtime::{Dispatcher, Request};

use vector_loader::Delivery;

fn record(sink: &Arc<Mutex<Vec<Delivery>>>, via: &str, msg: &Message) {
    sink.lock().unwrap().push(Delivery {
        via: via.to_string(),
        message_type: msg.message_type().0,
        request_id: msg.request_id().0,
        is_error: msg.is_error(),
    });
}

#[test]
fn dispatch_vectors() {
    let files = [
        "correlate_basic.json",
        "join_intent_buffer.json",
        "unknown_and_empty.json",
        "duplicate_delivery.json",
    ];

    for f in files {
        let v = vector_loader::load(f);
        let transport = Arc::new(v.script.to_transport());
        let dispatcher = Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>);
        let seen = Arc::new(Mutex::new(Vec::new()));

        for id in &v.script.track_requests {
            let sink = Arc::clone(&seen);
            dispatcher
                .register_request(Request::new(*id).on_complete(move |m| record(&sink, "request", &m)))
                .unwrap();
        }
        for ty in &v.script.notifications {
            let sink = Arc::clone(&seen);
            dispatcher
                .on_notification(*ty, move |m| record(&sink, "notification", &m))
                .unwrap();
        }

        let processed = dispatcher.run_callbacks().unwrap();
        assert_eq!(processed, v.script.messages.len(), "vector={}", v.description);

        // every popped handle freed exactly once
        assert_eq!(transport.live_handles(), 0, "vector={}", v.description);
        assert_eq!(transport.freed_count(), processed as u64, "vector={}", v.description);
        assert_eq!(transport.double_free_count(), 0, "vector={}", v.description);

        v.expect.stats.assert_matches(&dispatcher.stats(), &v.description);
        assert_eq!(*seen.lock().unwrap(), v.expect.deliveries, "vector={}", v.description);
        assert_eq!(
            dispatcher.has_pending_join_intent(),
            v.expect.pending_join_intent,
            "vector={}",
            v.description
        );

        assert_eq!(
            dispatcher.pending_requests(),
            v.expect.remaining_requests.len(),
            "vector={}",
            v.description
        );
        for id in &v.expect.remaining_requests {
            assert!(dispatcher.has_pending_request(RequestId(*id)), "vector={}", v.description);
        }
    }
}
