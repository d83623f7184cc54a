use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use ovrbridge_core::error::{BridgeError, Result};
use ovrbridge_core::{Message, MessageType};

/// Persistent handler for server-pushed messages of one type.
pub type NotificationCallback = Arc<dyn Fn(Message) + Send + Sync>;

/// The one notification type that may arrive before the host has had a
/// chance to register for it (app launched from a join intent).
pub const BUFFERED_TYPE: MessageType = MessageType::NOTIFICATION_GROUP_PRESENCE_JOIN_INTENT_RECEIVED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    /// Held in the single join-intent slot.
    Buffered,
    Dropped,
}

/// `message type -> handler`, plus the single-slot join-intent buffer.
#[derive(Default)]
pub struct NotificationRegistry {
    handlers: DashMap<MessageType, NotificationCallback>,
    pending_join_intent: Mutex<Option<Message>>,
    join_intent_registered: AtomicBool,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `message_type`.
    ///
    /// Registering the join-intent handler flushes the buffered join intent,
    /// if any, before returning.
    pub fn set_callback(
        &self,
        message_type: MessageType,
        callback: Option<NotificationCallback>,
    ) -> Result<()> {
        let Some(callback) = callback else {
            tracing::error!(%message_type, "notification callback must not be null");
            return Err(BridgeError::NullCallback(message_type.0));
        };
        if message_type.is_unknown() {
            return Err(BridgeError::InvalidMessageType(message_type.0));
        }

        if self.handlers.insert(message_type, Arc::clone(&callback)).is_some() {
            tracing::debug!(%message_type, "notification handler replaced");
        }

        if message_type == BUFFERED_TYPE {
            let pending = {
                let mut slot = self.lock_slot();
                self.join_intent_registered.store(true, Ordering::Release);
                slot.take()
            };
            if let Some(msg) = pending {
                tracing::debug!("flushing buffered join intent");
                callback(msg);
            }
        }
        Ok(())
    }

    pub fn has_callback(&self, message_type: MessageType) -> bool {
        self.handlers.contains_key(&message_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn has_pending_join_intent(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// Deliver a message not claimed by any request.
    pub fn dispatch(&self, message: Message) -> NotificationOutcome {
        let message_type = message.message_type();
        if let Some(handler) = self.handler(message_type) {
            handler(message);
            return NotificationOutcome::Delivered;
        }

        if message_type != BUFFERED_TYPE {
            tracing::trace!(%message_type, "no handler; message dropped");
            return NotificationOutcome::Dropped;
        }

        {
            let mut slot = self.lock_slot();
            if !self.join_intent_registered.load(Ordering::Acquire) {
                if slot.replace(message).is_some() {
                    tracing::debug!("buffered join intent replaced by a newer one");
                } else {
                    tracing::debug!("join intent buffered until a handler is registered");
                }
                return NotificationOutcome::Buffered;
            }
        }

        // Handler registered between the lookup above and the slot check.
        match self.handler(message_type) {
            Some(handler) => {
                handler(message);
                NotificationOutcome::Delivered
            }
            None => NotificationOutcome::Dropped,
        }
    }

    /// Remove all handlers and the buffered join intent.
    /// Returns `(handlers_removed, join_intent_discarded)`.
    pub fn clear(&self) -> (usize, bool) {
        let n = self.handlers.len();
        self.handlers.clear();
        let discarded = {
            let mut slot = self.lock_slot();
            self.join_intent_registered.store(false, Ordering::Release);
            slot.take().is_some()
        };
        (n, discarded)
    }

    fn handler(&self, message_type: MessageType) -> Option<NotificationCallback> {
        self.handlers.get(&message_type).map(|h| Arc::clone(h.value()))
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Message>> {
        self.pending_join_intent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use ovrbridge_core::message::payload::GroupPresenceJoinIntent;
    use ovrbridge_core::{Payload, RequestId};

    use super::*;

    fn join_intent(deeplink: &str) -> Message {
        Message::success(
            BUFFERED_TYPE,
            RequestId::NONE,
            Some(Payload::GroupPresenceJoinIntent(GroupPresenceJoinIntent {
                deeplink_message: deeplink.into(),
                destination_api_name: String::new(),
                lobby_session_id: String::new(),
                match_session_id: String::new(),
            })),
        )
    }

    fn recorder() -> (NotificationCallback, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: NotificationCallback = Arc::new(move |m: Message| sink.lock().unwrap().push(m));
        (cb, seen)
    }

    fn deeplink(m: &Message) -> &str {
        &m.data::<GroupPresenceJoinIntent>().unwrap().deeplink_message
    }

    #[test]
    fn null_callback_is_rejected_without_mutation() {
        let reg = NotificationRegistry::new();
        let err = reg.set_callback(MessageType::USER_GET, None).unwrap_err();
        assert_eq!(err.code().as_str(), "NULL_CALLBACK");
        assert!(reg.is_empty());
    }

    #[test]
    fn null_callback_leaves_existing_state_alone() {
        let reg = NotificationRegistry::new();
        let (cb, seen) = recorder();
        reg.set_callback(BUFFERED_TYPE, Some(Arc::clone(&cb))).unwrap();
        reg.set_callback(MessageType::NOTIFICATION_MARK_AS_READ, Some(cb))
            .unwrap();
        assert!(reg.set_callback(BUFFERED_TYPE, None).is_err());

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.dispatch(join_intent("kept")), NotificationOutcome::Delivered);
        assert_eq!(deeplink(&seen.lock().unwrap()[0]), "kept");
    }

    #[test]
    fn null_callback_does_not_flush_buffered_join_intent() {
        let reg = NotificationRegistry::new();
        assert_eq!(reg.dispatch(join_intent("held")), NotificationOutcome::Buffered);

        assert!(reg.set_callback(BUFFERED_TYPE, None).is_err());
        assert!(reg.has_pending_join_intent());
        assert!(!reg.has_callback(BUFFERED_TYPE));
        assert_eq!(reg.dispatch(join_intent("newer")), NotificationOutcome::Buffered);
    }

    #[test]
    fn null_tag_is_rejected() {
        let reg = NotificationRegistry::new();
        let (cb, _) = recorder();
        assert!(reg.set_callback(MessageType::UNKNOWN, Some(cb)).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn last_writer_wins() {
        let reg = NotificationRegistry::new();
        let (a, seen_a) = recorder();
        let (b, seen_b) = recorder();
        let ty = MessageType::NOTIFICATION_VOIP_STATE_CHANGE;
        reg.set_callback(ty, Some(a)).unwrap();
        reg.set_callback(ty, Some(b)).unwrap();

        let out = reg.dispatch(Message::success(ty, RequestId::NONE, None));
        assert_eq!(out, NotificationOutcome::Delivered);
        assert!(seen_a.lock().unwrap().is_empty());
        assert_eq!(seen_b.lock().unwrap().len(), 1);
    }

    #[test]
    fn join_intent_slot_keeps_latest_only() {
        let reg = NotificationRegistry::new();
        assert_eq!(reg.dispatch(join_intent("first")), NotificationOutcome::Buffered);
        assert_eq!(reg.dispatch(join_intent("second")), NotificationOutcome::Buffered);

        let (cb, seen) = recorder();
        reg.set_callback(BUFFERED_TYPE, Some(cb)).unwrap();
        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(deeplink(&seen[0]), "second");
        }
        assert!(!reg.has_pending_join_intent());

        assert_eq!(reg.dispatch(join_intent("third")), NotificationOutcome::Delivered);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn other_types_are_never_buffered() {
        let reg = NotificationRegistry::new();
        let ty = MessageType::NOTIFICATION_ASSET_FILE_DOWNLOAD_UPDATE;
        assert_eq!(
            reg.dispatch(Message::success(ty, RequestId::NONE, None)),
            NotificationOutcome::Dropped
        );
        let (cb, seen) = recorder();
        reg.set_callback(ty, Some(cb)).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn clear_discards_pending_and_resets_buffering() {
        let reg = NotificationRegistry::new();
        let (cb, seen) = recorder();
        reg.set_callback(BUFFERED_TYPE, Some(cb)).unwrap();
        assert_eq!(reg.clear(), (1, false));

        assert_eq!(reg.dispatch(join_intent("late")), NotificationOutcome::Buffered);
        assert_eq!(reg.clear(), (0, true));
        assert!(seen.lock().unwrap().is_empty());
    }
}
