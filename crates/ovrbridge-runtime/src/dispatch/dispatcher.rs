use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ovrbridge_core::error::{BridgeError, Result};
use ovrbridge_core::{Message, MessageType, RequestId};

use super::notifications::{NotificationCallback, NotificationOutcome, NotificationRegistry};
use super::requests::{Request, RequestHandle, RequestRegistry, Resolution};
use crate::classify::{Classification, Classifier};
use crate::native::{NativeTransport, OwnedMessage};
use crate::obs::{DispatchStats, StatsSnapshot};

/// What [`Dispatcher::shutdown`] threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub requests_discarded: usize,
    pub notifications_removed: usize,
    pub join_intent_discarded: bool,
}

/// Drains the native queue and routes each message to its pending request or
/// notification handler.
///
/// Polling is cooperative: callbacks run synchronously on the polling thread,
/// and only one poll may be in flight at a time. Registration may happen from
/// any thread, including from inside a callback.
pub struct Dispatcher {
    transport: Arc<dyn NativeTransport>,
    classifier: Classifier,
    requests: RequestRegistry,
    notifications: NotificationRegistry,
    stats: DispatchStats,
    polling: AtomicBool,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn NativeTransport>) -> Self {
        Self::with_classifier(transport, Classifier::new())
    }

    pub fn with_classifier(transport: Arc<dyn NativeTransport>, classifier: Classifier) -> Self {
        Self {
            transport,
            classifier,
            requests: RequestRegistry::new(),
            notifications: NotificationRegistry::new(),
            stats: DispatchStats::default(),
            polling: AtomicBool::new(false),
        }
    }

    /// Track a request issued against the native layer.
    pub fn register_request(&self, request: Request) -> Result<RequestHandle> {
        self.requests.register(request)
    }

    /// Register the persistent handler for `message_type`.
    pub fn on_notification<F>(&self, message_type: MessageType, callback: F) -> Result<()>
    where
        F: Fn(Message) + Send + Sync + 'static,
    {
        self.notifications
            .set_callback(message_type, Some(Arc::new(callback)))
    }

    /// Register a handler that may be absent; `None` is rejected.
    pub fn set_notification_callback(
        &self,
        message_type: MessageType,
        callback: Option<NotificationCallback>,
    ) -> Result<()> {
        self.notifications.set_callback(message_type, callback)
    }

    pub fn has_pending_request(&self, id: RequestId) -> bool {
        self.requests.contains(id)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn has_notification_callback(&self, message_type: MessageType) -> bool {
        self.notifications.has_callback(message_type)
    }

    pub fn has_pending_join_intent(&self) -> bool {
        self.notifications.has_pending_join_intent()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Process every queued native message. Returns how many were popped.
    pub fn run_callbacks(&self) -> Result<usize> {
        self.poll(None)
    }

    /// Process at most `limit` queued native messages.
    pub fn run_limited_callbacks(&self, limit: usize) -> Result<usize> {
        self.poll(Some(limit))
    }

    fn poll(&self, limit: Option<usize>) -> Result<usize> {
        let _guard = PollGuard::acquire(&self.polling)?;

        let mut processed = 0;
        while limit.map_or(true, |l| processed < l) {
            // The native handle is freed at the end of this match arm, before
            // any callback runs.
            let classified = match OwnedMessage::pop(self.transport.as_ref()) {
                Some(owned) => self.classifier.classify(&owned),
                None => break,
            };
            processed += 1;
            self.stats.inc_popped();

            match classified {
                Classification::Message(msg) => self.dispatch(msg),
                Classification::Empty => self.stats.inc_empty(),
                Classification::Unrecognized(_) => self.stats.inc_unrecognized(),
            }
        }

        if processed > 0 {
            tracing::trace!(processed, "poll tick done");
        }
        Ok(processed)
    }

    fn dispatch(&self, msg: Message) {
        tracing::trace!(
            message_type = %msg.message_type(),
            request_id = %msg.request_id(),
            is_error = msg.is_error(),
            "dispatching message"
        );
        let msg = match self.requests.resolve(msg) {
            Resolution::Handled => {
                self.stats.inc_correlated();
                return;
            }
            Resolution::Unmatched(msg) => msg,
        };
        match self.notifications.dispatch(msg) {
            NotificationOutcome::Delivered => self.stats.inc_notified(),
            NotificationOutcome::Buffered => self.stats.inc_buffered(),
            NotificationOutcome::Dropped => self.stats.inc_dropped(),
        }
    }

    /// Forget every pending request and notification handler.
    ///
    /// No callback fires for discarded requests; channel-backed requests see
    /// their sender dropped. The dispatcher can be reused afterwards.
    pub fn shutdown(&self) -> ShutdownReport {
        let requests_discarded = self.requests.clear();
        let (notifications_removed, join_intent_discarded) = self.notifications.clear();
        let report = ShutdownReport {
            requests_discarded,
            notifications_removed,
            join_intent_discarded,
        };
        tracing::info!(
            requests_discarded,
            notifications_removed,
            join_intent_discarded,
            "dispatcher shut down"
        );
        report
    }
}

/// Marks a poll in flight; released on drop, including during unwinding.
struct PollGuard<'a>(&'a AtomicBool);

impl<'a> PollGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!("poll requested while another poll is running");
            return Err(BridgeError::PollInProgress);
        }
        Ok(Self(flag))
    }
}

impl Drop for PollGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
