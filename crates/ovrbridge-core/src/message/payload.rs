//! Payload models read out of native messages.
//!
//! Only the shapes the dispatcher parses itself live here. Payloads for tags
//! handled by an extension hook travel as [`ExtraPayload`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub oculus_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub presence_status: PresenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    #[default]
    Unknown,
    OnlineIdle,
    Online,
    Offline,
}

/// A page of results with native pagination cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagedArray<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub previous_url: Option<String>,
    /// Total result count when the native layer reports one (leaderboards).
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl<T> PagedArray<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn has_previous_page(&self) -> bool {
        self.previous_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub type UserArray = PagedArray<User>;
pub type LeaderboardEntryArray = PagedArray<LeaderboardEntry>;
pub type AchievementProgressArray = PagedArray<AchievementProgress>;
pub type AchievementDefinitionArray = PagedArray<AchievementDefinition>;
pub type PurchaseArray = PagedArray<Purchase>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub score: i64,
    pub user: User,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub extra_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AchievementUpdate {
    pub name: String,
    pub just_unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AchievementProgress {
    pub name: String,
    #[serde(default)]
    pub bitfield: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub unlock_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    #[default]
    Unknown,
    Simple,
    Count,
    Bitfield,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AchievementDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: AchievementKind,
    #[serde(default)]
    pub target: u64,
    #[serde(default)]
    pub bitfield_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Challenge {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub leaderboard_api_name: String,
    #[serde(default)]
    pub start_date: u64,
    #[serde(default)]
    pub end_date: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupPresenceJoinIntent {
    #[serde(default)]
    pub deeplink_message: String,
    #[serde(default)]
    pub destination_api_name: String,
    #[serde(default)]
    pub lobby_session_id: String,
    #[serde(default)]
    pub match_session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Purchase {
    pub sku: String,
    #[serde(default)]
    pub purchase_id: String,
    #[serde(default)]
    pub grant_time: u64,
    #[serde(default)]
    pub expiration_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetFileDownloadUpdate {
    pub asset_id: u64,
    #[serde(default)]
    pub bytes_total: u64,
    #[serde(default)]
    pub bytes_transferred: i64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoipState {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoipStateChange {
    pub peer_id: u64,
    #[serde(default)]
    pub state: VoipState,
}

/// Payload produced by an extension hook for tags the core does not model.
#[derive(Clone)]
pub struct ExtraPayload {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ExtraPayload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ExtraPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraPayload")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Typed payload carried by a successful message.
#[derive(Debug, Clone)]
pub enum Payload {
    Str(String),
    Bool(bool),
    User(User),
    UserArray(UserArray),
    LeaderboardEntryArray(LeaderboardEntryArray),
    AchievementUpdate(AchievementUpdate),
    AchievementProgressArray(AchievementProgressArray),
    AchievementDefinitionArray(AchievementDefinitionArray),
    Challenge(Challenge),
    GroupPresenceJoinIntent(GroupPresenceJoinIntent),
    Purchase(Purchase),
    PurchaseArray(PurchaseArray),
    AssetFileDownloadUpdate(AssetFileDownloadUpdate),
    VoipStateChange(VoipStateChange),
    Extra(ExtraPayload),
}

impl Payload {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Str(_) => "string",
            Payload::Bool(_) => "bool",
            Payload::User(_) => "user",
            Payload::UserArray(_) => "user_array",
            Payload::LeaderboardEntryArray(_) => "leaderboard_entry_array",
            Payload::AchievementUpdate(_) => "achievement_update",
            Payload::AchievementProgressArray(_) => "achievement_progress_array",
            Payload::AchievementDefinitionArray(_) => "achievement_definition_array",
            Payload::Challenge(_) => "challenge",
            Payload::GroupPresenceJoinIntent(_) => "group_presence_join_intent",
            Payload::Purchase(_) => "purchase",
            Payload::PurchaseArray(_) => "purchase_array",
            Payload::AssetFileDownloadUpdate(_) => "asset_file_download_update",
            Payload::VoipStateChange(_) => "voip_state_change",
            Payload::Extra(e) => e.type_name(),
        }
    }
}

/// Typed view into a [`Payload`], keyed by the expected payload type.
pub trait FromPayload {
    fn from_payload(payload: &Payload) -> Option<&Self>;
}

macro_rules! impl_from_payload {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl FromPayload for $ty {
                fn from_payload(payload: &Payload) -> Option<&Self> {
                    match payload {
                        Payload::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_payload! {
    Str => String,
    Bool => bool,
    User => User,
    UserArray => UserArray,
    LeaderboardEntryArray => LeaderboardEntryArray,
    AchievementUpdate => AchievementUpdate,
    AchievementProgressArray => AchievementProgressArray,
    AchievementDefinitionArray => AchievementDefinitionArray,
    Challenge => Challenge,
    GroupPresenceJoinIntent => GroupPresenceJoinIntent,
    Purchase => Purchase,
    PurchaseArray => PurchaseArray,
    AssetFileDownloadUpdate => AssetFileDownloadUpdate,
    VoipStateChange => VoipStateChange,
}
