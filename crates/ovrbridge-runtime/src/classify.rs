//! Message classification: native handle -> typed [`Message`].
//!
//! Order of resolution for a popped message:
//! 1. null tag: nothing to report.
//! 2. core table ([`shape_of`]): build the envelope, reading the payload only
//!    when the native error flag is clear.
//! 3. extension hook ([`ExtraMessageTypes`]) for tags outside the table.
//! 4. otherwise log and drop.
//!
//! The caller owns the native handle; classification never frees it.

use ovrbridge_core::message::Payload;
use ovrbridge_core::{Message, MessageType, PlatformError};

use crate::native::OwnedMessage;

/// Payload shape behind a known message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Known tag with no payload.
    None,
    Str,
    Bool,
    User,
    UserArray,
    LeaderboardEntries,
    AchievementUpdate,
    AchievementProgress,
    AchievementDefinitions,
    Challenge,
    JoinIntent,
    Purchase,
    PurchaseArray,
    AssetFileDownloadUpdate,
    VoipStateChange,
}

/// Core type table. `None` for tags this crate does not model.
pub fn shape_of(message_type: MessageType) -> Option<PayloadShape> {
    let shape = match message_type {
        MessageType::ACHIEVEMENTS_ADD_COUNT
        | MessageType::ACHIEVEMENTS_ADD_FIELDS
        | MessageType::ACHIEVEMENTS_UNLOCK => PayloadShape::AchievementUpdate,
        MessageType::ACHIEVEMENTS_GET_ALL_PROGRESS
        | MessageType::ACHIEVEMENTS_GET_PROGRESS_BY_NAME => PayloadShape::AchievementProgress,
        MessageType::ACHIEVEMENTS_GET_ALL_DEFINITIONS => PayloadShape::AchievementDefinitions,

        MessageType::CHALLENGES_GET | MessageType::CHALLENGES_JOIN => PayloadShape::Challenge,

        MessageType::GROUP_PRESENCE_CLEAR
        | MessageType::GROUP_PRESENCE_SET
        | MessageType::IAP_CONSUME_PURCHASE
        | MessageType::NOTIFICATION_MARK_AS_READ
        | MessageType::PLATFORM_INITIALIZE_STANDALONE => PayloadShape::None,

        MessageType::IAP_GET_VIEWER_PURCHASES => PayloadShape::PurchaseArray,
        MessageType::IAP_LAUNCH_CHECKOUT_FLOW => PayloadShape::Purchase,

        MessageType::LEADERBOARD_GET_ENTRIES => PayloadShape::LeaderboardEntries,
        MessageType::LEADERBOARD_WRITE_ENTRY => PayloadShape::Bool,

        MessageType::USER_GET | MessageType::USER_GET_LOGGED_IN_USER => PayloadShape::User,
        MessageType::USER_GET_LOGGED_IN_USER_FRIENDS => PayloadShape::UserArray,

        MessageType::NOTIFICATION_ASSET_FILE_DOWNLOAD_UPDATE => {
            PayloadShape::AssetFileDownloadUpdate
        }
        MessageType::NOTIFICATION_GROUP_PRESENCE_JOIN_INTENT_RECEIVED => PayloadShape::JoinIntent,
        MessageType::NOTIFICATION_LAUNCH_INTENT_CHANGED => PayloadShape::Str,
        MessageType::NOTIFICATION_VOIP_STATE_CHANGE => PayloadShape::VoipStateChange,

        _ => return None,
    };
    Some(shape)
}

/// Extension point for message types outside the core table (platform
/// variants, newer SDK tags). Return `None` to decline.
pub trait ExtraMessageTypes: Send + Sync {
    fn parse(&self, msg: &OwnedMessage<'_>) -> Option<Message>;
}

impl<F> ExtraMessageTypes for F
where
    F: Fn(&OwnedMessage<'_>) -> Option<Message> + Send + Sync,
{
    fn parse(&self, msg: &OwnedMessage<'_>) -> Option<Message> {
        self(msg)
    }
}

/// Outcome of classifying one popped handle.
#[derive(Debug)]
pub enum Classification {
    Message(Message),
    /// Null type tag.
    Empty,
    /// Neither the core table nor the extension hook recognised the tag.
    Unrecognized(MessageType),
}

#[derive(Default)]
pub struct Classifier {
    extra: Option<Box<dyn ExtraMessageTypes>>,
}

impl Classifier {
    pub fn new() -> Self {
        Self { extra: None }
    }

    /// Install the fallback resolver for unknown tags.
    pub fn with_extra_types(mut self, hook: impl ExtraMessageTypes + 'static) -> Self {
        self.extra = Some(Box::new(hook));
        self
    }

    /// Closure form of [`Classifier::with_extra_types`].
    pub fn with_extra_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&OwnedMessage<'_>) -> Option<Message> + Send + Sync + 'static,
    {
        self.with_extra_types(hook)
    }

    pub fn classify(&self, msg: &OwnedMessage<'_>) -> Classification {
        let message_type = msg.message_type();
        if message_type.is_unknown() {
            return Classification::Empty;
        }

        let Some(shape) = shape_of(message_type) else {
            if let Some(parsed) = self.extra.as_ref().and_then(|hook| hook.parse(msg)) {
                return Classification::Message(parsed);
            }
            tracing::warn!(
                message_type = %message_type,
                request_id = %msg.request_id(),
                "unrecognized message type dropped"
            );
            return Classification::Unrecognized(message_type);
        };

        let request_id = msg.request_id();

        if msg.is_error() {
            let error = msg.error().unwrap_or_else(|| {
                tracing::warn!(%message_type, %request_id, "error flag set without error record");
                PlatformError::unknown()
            });
            return Classification::Message(Message::failure(message_type, request_id, error));
        }

        let payload = read_payload(msg, shape);
        if payload.is_none() && shape != PayloadShape::None {
            tracing::warn!(
                %message_type,
                %request_id,
                ?shape,
                "native payload missing; delivering bare message"
            );
        }
        Classification::Message(Message::success(message_type, request_id, payload))
    }
}

fn read_payload(msg: &OwnedMessage<'_>, shape: PayloadShape) -> Option<Payload> {
    match shape {
        PayloadShape::None => None,
        PayloadShape::Str => msg.read_string().map(Payload::Str),
        PayloadShape::Bool => msg.read_bool().map(Payload::Bool),
        PayloadShape::User => msg.read_user().map(Payload::User),
        PayloadShape::UserArray => msg.read_user_array().map(Payload::UserArray),
        PayloadShape::LeaderboardEntries => msg
            .read_leaderboard_entries()
            .map(Payload::LeaderboardEntryArray),
        PayloadShape::AchievementUpdate => {
            msg.read_achievement_update().map(Payload::AchievementUpdate)
        }
        PayloadShape::AchievementProgress => msg
            .read_achievement_progress()
            .map(Payload::AchievementProgressArray),
        PayloadShape::AchievementDefinitions => msg
            .read_achievement_definitions()
            .map(Payload::AchievementDefinitionArray),
        PayloadShape::Challenge => msg.read_challenge().map(Payload::Challenge),
        PayloadShape::JoinIntent => msg.read_join_intent().map(Payload::GroupPresenceJoinIntent),
        PayloadShape::Purchase => msg.read_purchase().map(Payload::Purchase),
        PayloadShape::PurchaseArray => msg.read_purchase_array().map(Payload::PurchaseArray),
        PayloadShape::AssetFileDownloadUpdate => msg
            .read_asset_file_download_update()
            .map(Payload::AssetFileDownloadUpdate),
        PayloadShape::VoipStateChange => msg.read_voip_state_change().map(Payload::VoipStateChange),
    }
}
