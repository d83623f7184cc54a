use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;

use ovrbridge_core::error::{BridgeError, Result};
use ovrbridge_core::{Message, RequestId};

/// Completion callback for one request. Runs at most once.
pub type RequestCallback = Box<dyn FnOnce(Message) + Send>;

/// One outstanding asynchronous call, keyed by the id the native call
/// returned. Hand it to [`RequestRegistry::register`] to track it.
pub struct Request {
    id: RequestId,
    callback: Option<RequestCallback>,
}

impl Request {
    pub fn new(id: u64) -> Self {
        Self {
            id: RequestId(id),
            callback: None,
        }
    }

    /// Attach the completion callback (replaces any previous one).
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Message) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Request whose completion is delivered through a channel, for async
    /// hosts. The receiver errors if the request is discarded by shutdown.
    pub fn with_channel(id: u64) -> (Self, oneshot::Receiver<Message>) {
        let (tx, rx) = oneshot::channel();
        let req = Self::new(id).on_complete(move |msg| {
            // Receiver may have been dropped; nothing to do then.
            let _ = tx.send(msg);
        });
        (req, rx)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Caller-side view of a registered request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: RequestId,
    completed: Arc<AtomicBool>,
}

impl RequestHandle {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}

struct PendingRequest {
    // Mutex only to make the map Sync; the callback itself need not be.
    callback: Mutex<Option<RequestCallback>>,
    completed: Arc<AtomicBool>,
}

/// Result of trying to correlate a message with a pending request.
#[must_use]
#[derive(Debug)]
pub enum Resolution {
    /// A pending request consumed the message.
    Handled,
    /// No pending request matched; the message is handed back.
    Unmatched(Message),
}

/// `request id -> pending request`.
#[derive(Default)]
pub struct RequestRegistry {
    pending: DashMap<RequestId, PendingRequest>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Track a request until its response arrives.
    ///
    /// An id of `0` means the native call failed before assigning one; such a
    /// request is never tracked. A live id is never replaced.
    pub fn register(&self, request: Request) -> Result<RequestHandle> {
        let id = request.id;
        if !id.is_assigned() {
            tracing::error!("native call returned no request id; request will not be tracked");
            return Err(BridgeError::UnassignedRequest);
        }

        let completed = Arc::new(AtomicBool::new(false));
        match self.pending.entry(id) {
            Entry::Occupied(_) => {
                tracing::warn!(request_id = %id, "request id reused while still pending");
                Err(BridgeError::DuplicateRequest(id.0))
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingRequest {
                    callback: Mutex::new(request.callback),
                    completed: Arc::clone(&completed),
                });
                tracing::trace!(request_id = %id, "request registered");
                Ok(RequestHandle { id, completed })
            }
        }
    }

    /// Deliver `message` to its pending request, if any.
    ///
    /// The entry is removed before the callback runs, so the request is
    /// single-use even when the callback panics.
    pub fn resolve(&self, message: Message) -> Resolution {
        let id = message.request_id();
        if !id.is_assigned() {
            return Resolution::Unmatched(message);
        }
        let Some((_, pending)) = self.pending.remove(&id) else {
            return Resolution::Unmatched(message);
        };

        pending.completed.store(true, Ordering::Release);
        tracing::trace!(request_id = %id, is_error = message.is_error(), "request resolved");
        let callback = pending
            .callback
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(callback) = callback {
            callback(message);
        }
        Resolution::Handled
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending request without invoking callbacks.
    /// Returns how many were discarded.
    pub fn clear(&self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}
