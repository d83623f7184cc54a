#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ovrbridge::runtime::native::{LoopbackTransport, NativeMessage, NativeTransport};
use ovrbridge::{Dispatcher, MessageType, Request, RequestId};

#[test]
fn facade_exposes_a_working_dispatcher() {
    let transport = Arc::new(LoopbackTransport::new());
    let dispatcher = Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>);
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);

    let handle = dispatcher
        .register_request(Request::new(3).on_complete(move |m| {
            assert_eq!(m.request_id(), RequestId(3));
            flag.store(true, Ordering::SeqCst);
        }))
        .unwrap();

    transport.push(NativeMessage::bare(MessageType::IAP_CONSUME_PURCHASE, 3));
    assert_eq!(dispatcher.run_callbacks().unwrap(), 1);
    assert!(done.load(Ordering::SeqCst));
    assert!(handle.is_completed());
}
