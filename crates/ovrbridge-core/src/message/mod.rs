//! Parsed platform messages.
//!
//! A [`Message`] is what remains of one native event after classification:
//! its type tag, the request id it answers (if any), and either a structured
//! error or an optional typed payload. Error and payload are mutually
//! exclusive by construction.

pub mod payload;
pub mod types;

pub use payload::{ExtraPayload, FromPayload, PagedArray, Payload};
pub use types::{MessageType, RequestId};

use crate::error::PlatformError;

/// Error-or-data body of a message.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Error(PlatformError),
    /// `None` for bare messages (known tags that carry no payload).
    Data(Option<Payload>),
}

/// Parsed representation of one asynchronous event from the native layer.
#[derive(Debug, Clone)]
pub struct Message {
    message_type: MessageType,
    request_id: RequestId,
    body: MessageBody,
}

impl Message {
    /// Successful message, with or without a payload.
    pub fn success(
        message_type: MessageType,
        request_id: RequestId,
        payload: Option<Payload>,
    ) -> Self {
        Self {
            message_type,
            request_id,
            body: MessageBody::Data(payload),
        }
    }

    /// Failed message.
    pub fn failure(message_type: MessageType, request_id: RequestId, error: PlatformError) -> Self {
        Self {
            message_type,
            request_id,
            body: MessageBody::Error(error),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn into_body(self) -> MessageBody {
        self.body
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, MessageBody::Error(_))
    }

    pub fn error(&self) -> Option<&PlatformError> {
        match &self.body {
            MessageBody::Error(e) => Some(e),
            MessageBody::Data(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.body {
            MessageBody::Data(p) => p.as_ref(),
            MessageBody::Error(_) => None,
        }
    }

    /// Typed payload access, e.g. `msg.data::<User>()`.
    ///
    /// Returns `None` for error messages, bare messages, and payloads of a
    /// different type.
    pub fn data<T: FromPayload + ?Sized>(&self) -> Option<&T> {
        self.payload().and_then(T::from_payload)
    }

    /// Access a payload produced by an extension hook.
    pub fn extra<T: std::any::Any>(&self) -> Option<&T> {
        match self.payload()? {
            Payload::Extra(extra) => extra.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Convenience for string payloads.
    pub fn string(&self) -> Option<&str> {
        self.data::<String>().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::payload::{GroupPresenceJoinIntent, User};
    use super::*;

    fn user(id: u64) -> User {
        User {
            id,
            oculus_id: format!("user{id}"),
            display_name: String::new(),
            image_url: String::new(),
            presence_status: Default::default(),
        }
    }

    #[test]
    fn typed_access_matches_only_the_expected_type() {
        let msg = Message::success(
            MessageType::USER_GET,
            RequestId(3),
            Some(Payload::User(user(7))),
        );
        assert_eq!(msg.data::<User>().map(|u| u.id), Some(7));
        assert!(msg.data::<GroupPresenceJoinIntent>().is_none());
        assert!(msg.data::<bool>().is_none());
        assert!(!msg.is_error());
    }

    #[test]
    fn error_messages_have_no_payload() {
        let msg = Message::failure(
            MessageType::USER_GET,
            RequestId(3),
            PlatformError {
                code: 10,
                message: "nope".into(),
                http_code: 403,
            },
        );
        assert!(msg.is_error());
        assert!(msg.payload().is_none());
        assert!(msg.data::<User>().is_none());
        assert_eq!(msg.error().map(|e| e.http_code), Some(403));
    }

    #[test]
    fn extra_payloads_downcast() {
        #[derive(Debug, PartialEq)]
        struct Custom(u8);

        let msg = Message::success(
            MessageType(0x1234),
            RequestId::NONE,
            Some(Payload::Extra(ExtraPayload::new(Custom(9)))),
        );
        assert_eq!(msg.extra::<Custom>(), Some(&Custom(9)));
        assert!(msg.extra::<u32>().is_none());
        assert!(msg.string().is_none());
    }
}
