//! In-memory native transport.
//!
//! Stands in for the native SDK in tests, the replay binary, and hosts that
//! run without the SDK. Messages are queued as [`NativeMessage`] records,
//! popped under increasing handles, and tracked until freed so handle
//! discipline can be asserted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use ovrbridge_core::message::payload::{
    AchievementDefinitionArray, AchievementProgressArray, AchievementUpdate,
    AssetFileDownloadUpdate, Challenge, GroupPresenceJoinIntent, LeaderboardEntryArray, Purchase,
    PurchaseArray, User, UserArray, VoipStateChange,
};
use ovrbridge_core::{MessageType, PlatformError};

use super::{MessageHandle, NativeTransport, RawHandle};

/// Payload as stored behind a native payload handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NativePayload {
    String(String),
    Bool(bool),
    User(User),
    UserArray(UserArray),
    LeaderboardEntries(LeaderboardEntryArray),
    AchievementUpdate(AchievementUpdate),
    AchievementProgress(AchievementProgressArray),
    AchievementDefinitions(AchievementDefinitionArray),
    Challenge(Challenge),
    JoinIntent(GroupPresenceJoinIntent),
    Purchase(Purchase),
    PurchaseArray(PurchaseArray),
    AssetFileDownloadUpdate(AssetFileDownloadUpdate),
    VoipStateChange(VoipStateChange),
}

/// One queued native message.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeMessage {
    /// Raw type tag (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub message_type: u32,
    #[serde(default)]
    pub request_id: u64,
    /// Error flag. Also implied by `error` being present.
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub error: Option<PlatformError>,
    #[serde(default)]
    pub payload: Option<NativePayload>,
}

impl NativeMessage {
    /// Successful message carrying `payload`.
    pub fn success(message_type: MessageType, request_id: u64, payload: NativePayload) -> Self {
        Self {
            message_type: message_type.0,
            request_id,
            is_error: false,
            error: None,
            payload: Some(payload),
        }
    }

    /// Successful message without a payload.
    pub fn bare(message_type: MessageType, request_id: u64) -> Self {
        Self {
            message_type: message_type.0,
            request_id,
            is_error: false,
            error: None,
            payload: None,
        }
    }

    /// Failed message.
    pub fn failure(message_type: MessageType, request_id: u64, error: PlatformError) -> Self {
        Self {
            message_type: message_type.0,
            request_id,
            is_error: true,
            error: Some(error),
            payload: None,
        }
    }

    fn flagged_error(&self) -> bool {
        self.is_error || self.error.is_some()
    }
}

#[derive(Default)]
struct LoopbackState {
    queue: VecDeque<NativeMessage>,
    live: HashMap<RawHandle, NativeMessage>,
    next_handle: RawHandle,
    freed: u64,
    double_frees: u64,
}

/// Queue-backed [`NativeTransport`].
#[derive(Default)]
pub struct LoopbackTransport {
    state: Mutex<LoopbackState>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message, as the native I/O threads would.
    pub fn push(&self, msg: NativeMessage) {
        self.lock().queue.push_back(msg);
    }

    pub fn push_all(&self, msgs: impl IntoIterator<Item = NativeMessage>) {
        self.lock().queue.extend(msgs);
    }

    /// Messages queued but not yet popped.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Handles popped but not yet freed.
    pub fn live_handles(&self) -> usize {
        self.lock().live.len()
    }

    pub fn freed_count(&self) -> u64 {
        self.lock().freed
    }

    /// Frees of handles that were not live (already freed or never popped).
    pub fn double_free_count(&self) -> u64 {
        self.lock().double_frees
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_live<T>(&self, handle: MessageHandle, f: impl FnOnce(&NativeMessage) -> Option<T>) -> Option<T> {
        let state = self.lock();
        state.live.get(&handle.get()).and_then(f)
    }

    fn with_payload<T>(
        &self,
        handle: MessageHandle,
        f: impl FnOnce(&NativePayload) -> Option<T>,
    ) -> Option<T> {
        self.with_live(handle, |m| m.payload.as_ref().and_then(f))
    }
}

impl NativeTransport for LoopbackTransport {
    fn pop_message(&self) -> RawHandle {
        let mut state = self.lock();
        let Some(msg) = state.queue.pop_front() else {
            return 0;
        };
        state.next_handle += 1;
        let handle = state.next_handle;
        state.live.insert(handle, msg);
        handle
    }

    fn free_message(&self, handle: MessageHandle) {
        let mut state = self.lock();
        if state.live.remove(&handle.get()).is_some() {
            state.freed += 1;
        } else {
            state.double_frees += 1;
            tracing::warn!(handle = handle.get(), "free of a handle that is not live");
        }
    }

    fn message_type(&self, handle: MessageHandle) -> u32 {
        self.with_live(handle, |m| Some(m.message_type)).unwrap_or(0)
    }

    fn is_error(&self, handle: MessageHandle) -> bool {
        self.with_live(handle, |m| Some(m.flagged_error())).unwrap_or(false)
    }

    fn request_id(&self, handle: MessageHandle) -> u64 {
        self.with_live(handle, |m| Some(m.request_id)).unwrap_or(0)
    }

    fn error(&self, handle: MessageHandle) -> Option<PlatformError> {
        self.with_live(handle, |m| m.error.clone())
    }

    fn read_string(&self, handle: MessageHandle) -> Option<String> {
        self.with_payload(handle, |p| match p {
            NativePayload::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    fn read_bool(&self, handle: MessageHandle) -> Option<bool> {
        self.with_payload(handle, |p| match p {
            NativePayload::Bool(b) => Some(*b),
            _ => None,
        })
    }

    fn read_user(&self, handle: MessageHandle) -> Option<User> {
        self.with_payload(handle, |p| match p {
            NativePayload::User(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_user_array(&self, handle: MessageHandle) -> Option<UserArray> {
        self.with_payload(handle, |p| match p {
            NativePayload::UserArray(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_leaderboard_entries(&self, handle: MessageHandle) -> Option<LeaderboardEntryArray> {
        self.with_payload(handle, |p| match p {
            NativePayload::LeaderboardEntries(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_achievement_update(&self, handle: MessageHandle) -> Option<AchievementUpdate> {
        self.with_payload(handle, |p| match p {
            NativePayload::AchievementUpdate(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_achievement_progress(&self, handle: MessageHandle) -> Option<AchievementProgressArray> {
        self.with_payload(handle, |p| match p {
            NativePayload::AchievementProgress(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_achievement_definitions(
        &self,
        handle: MessageHandle,
    ) -> Option<AchievementDefinitionArray> {
        self.with_payload(handle, |p| match p {
            NativePayload::AchievementDefinitions(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_challenge(&self, handle: MessageHandle) -> Option<Challenge> {
        self.with_payload(handle, |p| match p {
            NativePayload::Challenge(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_join_intent(&self, handle: MessageHandle) -> Option<GroupPresenceJoinIntent> {
        self.with_payload(handle, |p| match p {
            NativePayload::JoinIntent(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_purchase(&self, handle: MessageHandle) -> Option<Purchase> {
        self.with_payload(handle, |p| match p {
            NativePayload::Purchase(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_purchase_array(&self, handle: MessageHandle) -> Option<PurchaseArray> {
        self.with_payload(handle, |p| match p {
            NativePayload::PurchaseArray(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_asset_file_download_update(
        &self,
        handle: MessageHandle,
    ) -> Option<AssetFileDownloadUpdate> {
        self.with_payload(handle, |p| match p {
            NativePayload::AssetFileDownloadUpdate(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn read_voip_state_change(&self, handle: MessageHandle) -> Option<VoipStateChange> {
        self.with_payload(handle, |p| match p {
            NativePayload::VoipStateChange(v) => Some(v.clone()),
            _ => None,
        })
    }
}
