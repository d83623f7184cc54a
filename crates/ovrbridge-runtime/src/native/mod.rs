//! Seam to the native platform SDK.
//!
//! The native layer owns a message queue filled from its own I/O threads.
//! Everything here is consumed through [`NativeTransport`]; the real SDK
//! binding and the in-memory [`LoopbackTransport`] both implement it.
//!
//! Every popped handle must be freed exactly once. [`OwnedMessage`] is the
//! only way the runtime pops, and it frees in `Drop`.

pub mod loopback;

use std::num::NonZeroU64;

use ovrbridge_core::message::payload::{
    AchievementDefinitionArray, AchievementProgressArray, AchievementUpdate,
    AssetFileDownloadUpdate, Challenge, GroupPresenceJoinIntent, LeaderboardEntryArray, Purchase,
    PurchaseArray, User, UserArray, VoipStateChange,
};
use ovrbridge_core::{MessageType, PlatformError, RequestId};

pub use loopback::{LoopbackTransport, NativeMessage, NativePayload};

/// Raw handle as returned by the native pop call. `0` means the queue is empty.
pub type RawHandle = u64;

/// Non-null native message handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(NonZeroU64);

impl MessageHandle {
    pub fn new(raw: RawHandle) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> RawHandle {
        self.0.get()
    }
}

/// Accessors exposed by the native SDK.
///
/// Payload readers mirror the SDK's nested payload handles: they return
/// `None` when the native payload pointer is null or of another shape.
pub trait NativeTransport: Send + Sync {
    /// Pop the next queued message, or `0` when nothing is queued.
    fn pop_message(&self) -> RawHandle;
    /// Release a popped message.
    fn free_message(&self, handle: MessageHandle);

    fn message_type(&self, handle: MessageHandle) -> u32;
    fn is_error(&self, handle: MessageHandle) -> bool;
    fn request_id(&self, handle: MessageHandle) -> u64;
    fn error(&self, handle: MessageHandle) -> Option<PlatformError>;

    fn read_string(&self, handle: MessageHandle) -> Option<String>;
    fn read_bool(&self, handle: MessageHandle) -> Option<bool>;
    fn read_user(&self, handle: MessageHandle) -> Option<User>;
    fn read_user_array(&self, handle: MessageHandle) -> Option<UserArray>;
    fn read_leaderboard_entries(&self, handle: MessageHandle) -> Option<LeaderboardEntryArray>;
    fn read_achievement_update(&self, handle: MessageHandle) -> Option<AchievementUpdate>;
    fn read_achievement_progress(&self, handle: MessageHandle) -> Option<AchievementProgressArray>;
    fn read_achievement_definitions(
        &self,
        handle: MessageHandle,
    ) -> Option<AchievementDefinitionArray>;
    fn read_challenge(&self, handle: MessageHandle) -> Option<Challenge>;
    fn read_join_intent(&self, handle: MessageHandle) -> Option<GroupPresenceJoinIntent>;
    fn read_purchase(&self, handle: MessageHandle) -> Option<Purchase>;
    fn read_purchase_array(&self, handle: MessageHandle) -> Option<PurchaseArray>;
    fn read_asset_file_download_update(
        &self,
        handle: MessageHandle,
    ) -> Option<AssetFileDownloadUpdate>;
    fn read_voip_state_change(&self, handle: MessageHandle) -> Option<VoipStateChange>;
}

/// Handle-bound payload readers. Only reads are exposed, so nothing holding
/// an `OwnedMessage` can pop or free through it.
macro_rules! owned_readers {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<$ty> {
                self.transport.$name(self.handle)
            }
        )*
    };
}

/// A popped native message, freed when dropped.
///
/// The transport stays private, so an extension hook cannot free the handle:
///
/// ```compile_fail
/// use ovrbridge_runtime::native::OwnedMessage;
///
/// fn release(msg: &OwnedMessage<'_>) {
///     msg.transport().free_message(msg.handle());
/// }
/// ```
pub struct OwnedMessage<'t> {
    transport: &'t dyn NativeTransport,
    handle: MessageHandle,
}

impl<'t> OwnedMessage<'t> {
    /// Pop the next message. `None` when the native queue is empty.
    pub fn pop(transport: &'t dyn NativeTransport) -> Option<Self> {
        let handle = MessageHandle::new(transport.pop_message())?;
        Some(Self { transport, handle })
    }

    pub fn handle(&self) -> MessageHandle {
        self.handle
    }

    pub fn message_type(&self) -> MessageType {
        MessageType(self.transport.message_type(self.handle))
    }

    pub fn request_id(&self) -> RequestId {
        RequestId(self.transport.request_id(self.handle))
    }

    pub fn is_error(&self) -> bool {
        self.transport.is_error(self.handle)
    }

    pub fn error(&self) -> Option<PlatformError> {
        self.transport.error(self.handle)
    }

    owned_readers! {
        read_string -> String,
        read_bool -> bool,
        read_user -> User,
        read_user_array -> UserArray,
        read_leaderboard_entries -> LeaderboardEntryArray,
        read_achievement_update -> AchievementUpdate,
        read_achievement_progress -> AchievementProgressArray,
        read_achievement_definitions -> AchievementDefinitionArray,
        read_challenge -> Challenge,
        read_join_intent -> GroupPresenceJoinIntent,
        read_purchase -> Purchase,
        read_purchase_array -> PurchaseArray,
        read_asset_file_download_update -> AssetFileDownloadUpdate,
        read_voip_state_change -> VoipStateChange,
    }
}

impl Drop for OwnedMessage<'_> {
    fn drop(&mut self) {
        self.transport.free_message(self.handle);
    }
}
