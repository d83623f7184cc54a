//! Log events emitted on the dispatcher's failure paths.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io;
use std::sync::{Arc, Mutex};

use ovrbridge_core::{MessageType, RequestId};
use ovrbridge_runtime::native::{LoopbackTransport, NativeMessage, NativeTransport};
use ovrbridge_runtime::{Dispatcher, Request};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let r = tracing::subscriber::with_default(subscriber, f);
    (r, out.text())
}

fn setup() -> (Arc<LoopbackTransport>, Dispatcher) {
    let transport = Arc::new(LoopbackTransport::new());
    let dispatcher = Dispatcher::new(Arc::clone(&transport) as Arc<dyn NativeTransport>);
    (transport, dispatcher)
}

#[test]
fn unassigned_request_logs_an_error() {
    let (_transport, dispatcher) = setup();

    let (res, logs) = with_captured_logs(|| dispatcher.register_request(Request::new(0)));

    assert!(res.is_err());
    assert!(logs.contains("ERROR"), "logs: {logs}");
    assert!(logs.contains("request will not be tracked"), "logs: {logs}");
}

#[test]
fn unrecognized_tag_logs_a_warning() {
    let (transport, dispatcher) = setup();
    dispatcher.register_request(Request::new(3)).unwrap();
    transport.push(NativeMessage::bare(MessageType(0x0BAD_F00D), 3));

    let (res, logs) = with_captured_logs(|| dispatcher.run_callbacks());

    assert_eq!(res.unwrap(), 1);
    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(logs.contains("unrecognized message type dropped"), "logs: {logs}");
    assert!(dispatcher.has_pending_request(RequestId(3)));
}

#[test]
fn duplicate_request_logs_a_warning() {
    let (_transport, dispatcher) = setup();
    dispatcher.register_request(Request::new(5)).unwrap();

    let (res, logs) = with_captured_logs(|| dispatcher.register_request(Request::new(5)));

    assert_eq!(res.unwrap_err().code().as_str(), "DUPLICATE_REQUEST");
    assert!(logs.contains("request id reused while still pending"), "logs: {logs}");
}
