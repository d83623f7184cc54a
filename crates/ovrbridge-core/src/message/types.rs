//! Message type tags and request ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Native message type tag.
///
/// The tag space is open: the native SDK defines hundreds of values and new
/// SDK versions add more, so any `u32` is representable. The associated
/// constants name the tags this crate knows how to parse; everything else is
/// handed to the classifier's extension hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageType(pub u32);

impl MessageType {
    /// Null tag: the native layer had no message to report.
    pub const UNKNOWN: Self = Self(0);

    pub const ACHIEVEMENTS_ADD_COUNT: Self = Self(0x03E7_6231);
    pub const ACHIEVEMENTS_ADD_FIELDS: Self = Self(0x14AA_2129);
    pub const ACHIEVEMENTS_GET_ALL_DEFINITIONS: Self = Self(0x03D3_458D);
    pub const ACHIEVEMENTS_GET_ALL_PROGRESS: Self = Self(0x4F9F_DE1D);
    pub const ACHIEVEMENTS_GET_PROGRESS_BY_NAME: Self = Self(0x1526_63B1);
    pub const ACHIEVEMENTS_UNLOCK: Self = Self(0x593C_CBDD);

    pub const CHALLENGES_GET: Self = Self(0x7758_4EF3);
    pub const CHALLENGES_JOIN: Self = Self(0x2124_8069);

    pub const GROUP_PRESENCE_CLEAR: Self = Self(0x6DAE_B7F3);
    pub const GROUP_PRESENCE_SET: Self = Self(0x675F_5C24);

    pub const IAP_CONSUME_PURCHASE: Self = Self(0x1FBB_72D9);
    pub const IAP_GET_VIEWER_PURCHASES: Self = Self(0x3A0F_8419);
    pub const IAP_LAUNCH_CHECKOUT_FLOW: Self = Self(0x3F9B_0D0D);

    pub const LEADERBOARD_GET_ENTRIES: Self = Self(0x5DB3_474C);
    pub const LEADERBOARD_WRITE_ENTRY: Self = Self(0x117F_C8FE);

    pub const USER_GET: Self = Self(0x6BCF_9E47);
    pub const USER_GET_LOGGED_IN_USER: Self = Self(0x436F_345D);
    pub const USER_GET_LOGGED_IN_USER_FRIENDS: Self = Self(0x587C_2A8D);

    pub const NOTIFICATION_ASSET_FILE_DOWNLOAD_UPDATE: Self = Self(0x2FDD_0CCD);
    pub const NOTIFICATION_GROUP_PRESENCE_JOIN_INTENT_RECEIVED: Self = Self(0x7738_89F6);
    pub const NOTIFICATION_LAUNCH_INTENT_CHANGED: Self = Self(0x04B3_4CA3);
    pub const NOTIFICATION_MARK_AS_READ: Self = Self(0x7172_59E3);
    pub const NOTIFICATION_VOIP_STATE_CHANGE: Self = Self(0x34EF_A660);

    pub const PLATFORM_INITIALIZE_STANDALONE: Self = Self(0x51F8_CE0C);

    /// True for the null tag.
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Stable name for known tags.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::ACHIEVEMENTS_ADD_COUNT => "Achievements_AddCount",
            Self::ACHIEVEMENTS_ADD_FIELDS => "Achievements_AddFields",
            Self::ACHIEVEMENTS_GET_ALL_DEFINITIONS => "Achievements_GetAllDefinitions",
            Self::ACHIEVEMENTS_GET_ALL_PROGRESS => "Achievements_GetAllProgress",
            Self::ACHIEVEMENTS_GET_PROGRESS_BY_NAME => "Achievements_GetProgressByName",
            Self::ACHIEVEMENTS_UNLOCK => "Achievements_Unlock",
            Self::CHALLENGES_GET => "Challenges_Get",
            Self::CHALLENGES_JOIN => "Challenges_Join",
            Self::GROUP_PRESENCE_CLEAR => "GroupPresence_Clear",
            Self::GROUP_PRESENCE_SET => "GroupPresence_Set",
            Self::IAP_CONSUME_PURCHASE => "IAP_ConsumePurchase",
            Self::IAP_GET_VIEWER_PURCHASES => "IAP_GetViewerPurchases",
            Self::IAP_LAUNCH_CHECKOUT_FLOW => "IAP_LaunchCheckoutFlow",
            Self::LEADERBOARD_GET_ENTRIES => "Leaderboard_GetEntries",
            Self::LEADERBOARD_WRITE_ENTRY => "Leaderboard_WriteEntry",
            Self::USER_GET => "User_Get",
            Self::USER_GET_LOGGED_IN_USER => "User_GetLoggedInUser",
            Self::USER_GET_LOGGED_IN_USER_FRIENDS => "User_GetLoggedInUserFriends",
            Self::NOTIFICATION_ASSET_FILE_DOWNLOAD_UPDATE => "Notification_AssetFile_DownloadUpdate",
            Self::NOTIFICATION_GROUP_PRESENCE_JOIN_INTENT_RECEIVED => {
                "Notification_GroupPresence_JoinIntentReceived"
            }
            Self::NOTIFICATION_LAUNCH_INTENT_CHANGED => {
                "Notification_ApplicationLifecycle_LaunchIntentChanged"
            }
            Self::NOTIFICATION_MARK_AS_READ => "Notification_MarkAsRead",
            Self::NOTIFICATION_VOIP_STATE_CHANGE => "Notification_Voip_StateChange",
            Self::PLATFORM_INITIALIZE_STANDALONE => "Platform_InitializeStandaloneOculus",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#010x}", self.0),
        }
    }
}

impl From<u32> for MessageType {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Native-assigned request id. `0` means the native call failed before an id
/// was assigned, or the message is not tied to any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    pub const NONE: Self = Self(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_render_as_hex() {
        assert_eq!(MessageType(0xDEAD_BEEF).to_string(), "0xdeadbeef");
        assert_eq!(MessageType::USER_GET.to_string(), "User_Get");
        assert!(MessageType::UNKNOWN.is_unknown());
        assert!(MessageType(7).name().is_none());
    }

    #[test]
    fn request_id_zero_is_unassigned() {
        assert!(!RequestId::NONE.is_assigned());
        assert!(RequestId(42).is_assigned());
    }
}
