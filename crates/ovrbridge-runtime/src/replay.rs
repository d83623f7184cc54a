//! Replay scripts: a recorded sequence of native messages plus the requests
//! and notification types a host had registered.

use std::fs;

use serde::Deserialize;

use ovrbridge_core::error::{BridgeError, Result};
use ovrbridge_core::MessageType;

use crate::native::{LoopbackTransport, NativeMessage};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    #[serde(default)]
    pub description: String,
    /// Request ids issued before the messages arrive.
    #[serde(default)]
    pub track_requests: Vec<u64>,
    /// Notification types with a registered handler.
    #[serde(default)]
    pub notifications: Vec<MessageType>,
    pub messages: Vec<NativeMessage>,
}

impl ReplayScript {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| BridgeError::Io(format!("read script failed ({path}): {e}")))?;
        Self::load_from_str(&s)
    }

    pub fn load_from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BridgeError::Config(format!("invalid script: {e}")))
    }

    /// Loopback transport with every scripted message queued.
    pub fn to_transport(&self) -> LoopbackTransport {
        let transport = LoopbackTransport::new();
        transport.push_all(self.messages.iter().cloned());
        transport
    }
}
